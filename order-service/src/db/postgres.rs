//! PostgreSQL repository
//!
//! Table exclusivity rests on the partial unique index
//! `uq_orders_open_table`; assignment and status writes are single conditional
//! `UPDATE`s. A write that matches zero rows is reported as `Conflict`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use shared::models::{
    DiningTable, Dish, DishRef, EmployeeRef, Order, OrderItem, OrderSortField, OrderStatus,
    OrderView, SortOrder, TableRef,
};
use sqlx::PgPool;
use std::collections::HashMap;

use super::{
    DishRepository, NewOrder, OrderFilter, OrderRepository, OrderSort, StatusUpdate,
    TableRepository,
};
use crate::error::{RepoError, RepoResult};

const ORDER_COLUMNS: &str =
    "o.id, o.company_id, o.table_id, o.waiter_id, o.cook_id, o.status, o.created_at, o.updated_at";

const FILTER_WHERE: &str = r#"
    WHERE o.company_id = $1
        AND ($2::TEXT IS NULL OR o.status = $2)
        AND ($3::TIMESTAMPTZ IS NULL OR o.created_at >= $3)
        AND ($4::TIMESTAMPTZ IS NULL OR o.created_at <= $4)
        AND ($5::BIGINT IS NULL OR o.waiter_id = $5)
        AND ($6::BIGINT IS NULL OR o.cook_id = $6)
        AND ($7::BIGINT IS NULL OR o.table_id = $7)
        AND (NOT $8 OR o.cook_id IS NULL)
"#;

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: i64,
    company_id: i64,
    table_id: i64,
    waiter_id: i64,
    cook_id: Option<i64>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct OrderViewRow {
    #[sqlx(flatten)]
    order: OrderRow,
    waiter_name: String,
    cook_name: Option<String>,
    table_number: i32,
}

#[derive(sqlx::FromRow)]
struct ItemRow {
    order_id: i64,
    dish_id: i64,
    quantity: i32,
    unit_price: Decimal,
    notes: Option<String>,
    dish_name: String,
    category_id: Option<i64>,
    category_name: Option<String>,
}

impl ItemRow {
    fn item(&self) -> OrderItem {
        OrderItem {
            dish_id: self.dish_id,
            quantity: self.quantity,
            unit_price: self.unit_price,
            notes: self.notes.clone(),
        }
    }

    fn dish(&self) -> DishRef {
        DishRef {
            id: self.dish_id,
            name: self.dish_name.clone(),
            category_id: self.category_id,
            category_name: self.category_name.clone(),
        }
    }
}

fn parse_status(raw: &str) -> RepoResult<OrderStatus> {
    raw.parse()
        .map_err(|e: String| RepoError::Database(e.into()))
}

impl OrderRow {
    fn into_order(self, items: &[ItemRow]) -> RepoResult<Order> {
        Ok(Order {
            status: parse_status(&self.status)?,
            id: self.id,
            company_id: self.company_id,
            table_id: self.table_id,
            waiter_id: self.waiter_id,
            cook_id: self.cook_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
            order_items: items.iter().map(ItemRow::item).collect(),
        })
    }
}

impl OrderViewRow {
    fn into_view(self, items: &[ItemRow]) -> RepoResult<OrderView> {
        let waiter = EmployeeRef {
            id: self.order.waiter_id,
            name: self.waiter_name,
        };
        let cook = self.order.cook_id.map(|id| EmployeeRef {
            id,
            name: self.cook_name.unwrap_or_default(),
        });
        let table = TableRef {
            id: self.order.table_id,
            number: self.table_number,
        };
        Ok(OrderView {
            order: self.order.into_order(items)?,
            waiter,
            cook,
            table,
            dishes: items.iter().map(ItemRow::dish).collect(),
        })
    }
}

fn order_by(sort: OrderSort) -> String {
    let column = match sort.field {
        OrderSortField::CreatedAt => "o.created_at",
        OrderSortField::UpdatedAt => "o.updated_at",
        OrderSortField::Status => "o.status",
        OrderSortField::Id => "o.id",
    };
    let direction = match sort.direction {
        SortOrder::Asc => "ASC",
        SortOrder::Desc => "DESC",
    };
    if column == "o.id" {
        format!("ORDER BY o.id {direction}")
    } else {
        format!("ORDER BY {column} {direction}, o.id {direction}")
    }
}

/// PostgreSQL-backed repository
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Line items of `order_ids`, grouped per order in insertion order
    async fn load_items(&self, order_ids: &[i64]) -> RepoResult<HashMap<i64, Vec<ItemRow>>> {
        if order_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows: Vec<ItemRow> = sqlx::query_as(
            r#"
            SELECT i.order_id, i.dish_id, i.quantity, i.unit_price, i.notes,
                d.name AS dish_name, d.category_id, c.name AS category_name
            FROM order_items i
            JOIN dishes d ON d.id = i.dish_id
            LEFT JOIN categories c ON c.id = d.category_id
            WHERE i.order_id = ANY($1)
            ORDER BY i.order_id, i.position
            "#,
        )
        .bind(order_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut grouped: HashMap<i64, Vec<ItemRow>> = HashMap::new();
        for row in rows {
            grouped.entry(row.order_id).or_default().push(row);
        }
        Ok(grouped)
    }

    async fn with_items(&self, row: OrderRow) -> RepoResult<Order> {
        let items = self.load_items(&[row.id]).await?;
        let lines = items.get(&row.id).map(Vec::as_slice).unwrap_or_default();
        row.into_order(lines)
    }
}

#[async_trait]
impl OrderRepository for PgStore {
    async fn create(&self, new: NewOrder) -> RepoResult<Order> {
        let mut tx = self.pool.begin().await?;

        let table: Option<(i64,)> = sqlx::query_as(
            "SELECT id FROM dining_tables WHERE id = $1 AND company_id = $2 FOR UPDATE",
        )
        .bind(new.table_id)
        .bind(new.company_id)
        .fetch_optional(&mut *tx)
        .await?;
        if table.is_none() {
            return Err(RepoError::NotFound);
        }

        // uq_orders_open_table rejects a second open order on this table
        let row: OrderRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO orders AS o (company_id, table_id, waiter_id, status)
            VALUES ($1, $2, $3, 'PENDING')
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(new.company_id)
        .bind(new.table_id)
        .bind(new.waiter_id)
        .fetch_one(&mut *tx)
        .await?;

        for (position, item) in new.items.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO order_items (order_id, position, dish_id, quantity, unit_price, notes)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(row.id)
            .bind(position as i32)
            .bind(item.dish_id)
            .bind(item.quantity)
            .bind(item.unit_price)
            .bind(&item.notes)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query("UPDATE dining_tables SET active = FALSE WHERE id = $1 AND company_id = $2")
            .bind(new.table_id)
            .bind(new.company_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        let mut order = row.into_order(&[])?;
        order.order_items = new.items;
        Ok(order)
    }

    async fn find_by_id(&self, company_id: i64, order_id: i64) -> RepoResult<Option<Order>> {
        let row: Option<OrderRow> = sqlx::query_as(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders o WHERE o.id = $1 AND o.company_id = $2"
        ))
        .bind(order_id)
        .bind(company_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(self.with_items(row).await?)),
            None => Ok(None),
        }
    }

    async fn find_view(&self, company_id: i64, order_id: i64) -> RepoResult<Option<OrderView>> {
        let row: Option<OrderViewRow> = sqlx::query_as(&format!(
            r#"
            SELECT {ORDER_COLUMNS},
                w.name AS waiter_name, c.name AS cook_name, t.number AS table_number
            FROM orders o
            JOIN employees w ON w.id = o.waiter_id
            LEFT JOIN employees c ON c.id = o.cook_id
            JOIN dining_tables t ON t.id = o.table_id
            WHERE o.id = $1 AND o.company_id = $2
            "#
        ))
        .bind(order_id)
        .bind(company_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let items = self.load_items(&[row.order.id]).await?;
        let lines = items.get(&row.order.id).map(Vec::as_slice).unwrap_or_default();
        Ok(Some(row.into_view(lines)?))
    }

    async fn find_many(&self, filter: &OrderFilter) -> RepoResult<Vec<OrderView>> {
        let sql = format!(
            r#"
            SELECT {ORDER_COLUMNS},
                w.name AS waiter_name, c.name AS cook_name, t.number AS table_number
            FROM orders o
            JOIN employees w ON w.id = o.waiter_id
            LEFT JOIN employees c ON c.id = o.cook_id
            JOIN dining_tables t ON t.id = o.table_id
            {FILTER_WHERE}
            {}
            LIMIT $9 OFFSET $10
            "#,
            order_by(filter.sort)
        );
        let rows: Vec<OrderViewRow> = sqlx::query_as(&sql)
            .bind(filter.company_id)
            .bind(filter.status.map(|s| s.as_str()))
            .bind(filter.from)
            .bind(filter.to)
            .bind(filter.waiter_id)
            .bind(filter.cook_id)
            .bind(filter.table_id)
            .bind(filter.unassigned_only)
            .bind(filter.page.map(|p| i64::from(p.limit)))
            .bind(filter.page.map_or(0, |p| p.offset() as i64))
            .fetch_all(&self.pool)
            .await?;

        let ids: Vec<i64> = rows.iter().map(|r| r.order.id).collect();
        let items = self.load_items(&ids).await?;
        rows.into_iter()
            .map(|row| {
                let lines = items.get(&row.order.id).map(Vec::as_slice).unwrap_or_default();
                row.into_view(lines)
            })
            .collect()
    }

    async fn count(&self, filter: &OrderFilter) -> RepoResult<u64> {
        let sql = format!("SELECT COUNT(*) FROM orders o {FILTER_WHERE}");
        let total: i64 = sqlx::query_scalar(&sql)
            .bind(filter.company_id)
            .bind(filter.status.map(|s| s.as_str()))
            .bind(filter.from)
            .bind(filter.to)
            .bind(filter.waiter_id)
            .bind(filter.cook_id)
            .bind(filter.table_id)
            .bind(filter.unassigned_only)
            .fetch_one(&self.pool)
            .await?;
        Ok(total.max(0) as u64)
    }

    async fn assign(&self, company_id: i64, order_id: i64, cook_id: i64) -> RepoResult<Order> {
        let row: Option<OrderRow> = sqlx::query_as(&format!(
            r#"
            UPDATE orders AS o
            SET cook_id = $3, status = 'IN_PROGRESS', updated_at = now()
            WHERE o.id = $1 AND o.company_id = $2
                AND o.status = 'PENDING' AND o.cook_id IS NULL
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(order_id)
        .bind(company_id)
        .bind(cook_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => self.with_items(row).await,
            None => Err(RepoError::Conflict(format!(
                "order {order_id} is not pending and unassigned"
            ))),
        }
    }

    async fn update_status(&self, update: StatusUpdate) -> RepoResult<Order> {
        let mut tx = self.pool.begin().await?;

        let row: Option<OrderRow> = sqlx::query_as(&format!(
            r#"
            UPDATE orders AS o
            SET status = $4, updated_at = now()
            WHERE o.id = $1 AND o.company_id = $2 AND o.status = $3
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(update.order_id)
        .bind(update.company_id)
        .bind(update.from.as_str())
        .bind(update.to.as_str())
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            return Err(RepoError::Conflict(format!(
                "order {} is no longer {}",
                update.order_id, update.from
            )));
        };

        if update.release_table {
            sqlx::query("UPDATE dining_tables SET active = TRUE WHERE id = $1 AND company_id = $2")
                .bind(row.table_id)
                .bind(update.company_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        self.with_items(row).await
    }
}

#[async_trait]
impl TableRepository for PgStore {
    async fn find_by_id(&self, company_id: i64, table_id: i64) -> RepoResult<Option<DiningTable>> {
        let table = sqlx::query_as::<_, DiningTable>(
            r#"
            SELECT id, company_id, number, seats, active
            FROM dining_tables
            WHERE id = $1 AND company_id = $2
            "#,
        )
        .bind(table_id)
        .bind(company_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(table)
    }

    async fn set_active(&self, company_id: i64, table_id: i64, active: bool) -> RepoResult<()> {
        let result =
            sqlx::query("UPDATE dining_tables SET active = $3 WHERE id = $1 AND company_id = $2")
                .bind(table_id)
                .bind(company_id)
                .bind(active)
                .execute(&self.pool)
                .await?;
        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl DishRepository for PgStore {
    async fn find_many_by_ids(&self, company_id: i64, ids: &[i64]) -> RepoResult<Vec<Dish>> {
        let dishes = sqlx::query_as::<_, Dish>(
            r#"
            SELECT id, company_id, name, price, category_id
            FROM dishes
            WHERE company_id = $1 AND id = ANY($2)
            "#,
        )
        .bind(company_id)
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(dishes)
    }
}
