//! In-memory repository
//!
//! All state sits behind one `parking_lot::Mutex`; each repository call takes
//! the lock once, so a check and the write it guards can never interleave
//! with another request. Used by tests and by development runs without
//! `DATABASE_URL`.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use shared::models::{
    Category, DiningTable, Dish, DishRef, Employee, EmployeeRef, Order, OrderSortField,
    OrderStatus, OrderView, SortOrder, TableRef,
};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use super::{
    DishRepository, NewOrder, OrderFilter, OrderRepository, OrderSort, StatusUpdate,
    TableRepository,
};
use crate::error::{RepoError, RepoResult};

#[derive(Default)]
struct State {
    last_order_id: i64,
    orders: BTreeMap<i64, Order>,
    tables: HashMap<i64, DiningTable>,
    dishes: HashMap<i64, Dish>,
    categories: HashMap<i64, Category>,
    employees: HashMap<i64, Employee>,
}

impl State {
    fn open_order_on(&self, table_id: i64) -> Option<&Order> {
        self.orders
            .values()
            .find(|o| o.table_id == table_id && o.is_open())
    }

    fn set_table_active(&mut self, table_id: i64, active: bool) {
        if let Some(table) = self.tables.get_mut(&table_id) {
            table.active = active;
        }
    }

    fn employee_ref(&self, id: i64) -> EmployeeRef {
        EmployeeRef {
            id,
            name: self
                .employees
                .get(&id)
                .map(|e| e.name.clone())
                .unwrap_or_default(),
        }
    }

    fn dish_ref(&self, id: i64) -> DishRef {
        let dish = self.dishes.get(&id);
        let category_id = dish.and_then(|d| d.category_id);
        DishRef {
            id,
            name: dish.map(|d| d.name.clone()).unwrap_or_default(),
            category_id,
            category_name: category_id
                .and_then(|cid| self.categories.get(&cid))
                .map(|c| c.name.clone()),
        }
    }

    fn view(&self, order: &Order) -> OrderView {
        OrderView {
            waiter: self.employee_ref(order.waiter_id),
            cook: order.cook_id.map(|id| self.employee_ref(id)),
            table: TableRef {
                id: order.table_id,
                number: self
                    .tables
                    .get(&order.table_id)
                    .map(|t| t.number)
                    .unwrap_or_default(),
            },
            dishes: order
                .order_items
                .iter()
                .map(|item| self.dish_ref(item.dish_id))
                .collect(),
            order: order.clone(),
        }
    }

    fn tenant_order_mut(&mut self, company_id: i64, order_id: i64) -> RepoResult<&mut Order> {
        self.orders
            .get_mut(&order_id)
            .filter(|o| o.company_id == company_id)
            .ok_or(RepoError::NotFound)
    }
}

fn compare(sort: OrderSort, a: &Order, b: &Order) -> Ordering {
    let primary = match sort.field {
        OrderSortField::CreatedAt => a.created_at.cmp(&b.created_at),
        OrderSortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        OrderSortField::Status => a.status.as_str().cmp(b.status.as_str()),
        OrderSortField::Id => Ordering::Equal,
    };
    let ordering = primary.then(a.id.cmp(&b.id));
    match sort.direction {
        SortOrder::Asc => ordering,
        SortOrder::Desc => ordering.reverse(),
    }
}

/// Mutex-guarded in-memory store
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ========== Seeding ==========

    pub fn insert_table(&self, table: DiningTable) {
        self.state.lock().tables.insert(table.id, table);
    }

    pub fn insert_category(&self, category: Category) {
        self.state.lock().categories.insert(category.id, category);
    }

    pub fn insert_dish(&self, dish: Dish) {
        self.state.lock().dishes.insert(dish.id, dish);
    }

    pub fn insert_employee(&self, employee: Employee) {
        self.state.lock().employees.insert(employee.id, employee);
    }

    /// Import an existing order as-is (history, fixtures)
    pub fn insert_order(&self, order: Order) {
        let mut state = self.state.lock();
        state.last_order_id = state.last_order_id.max(order.id);
        if order.is_open() {
            state.set_table_active(order.table_id, false);
        }
        state.orders.insert(order.id, order);
    }

    /// Change a dish's catalog price; existing orders keep their snapshot
    pub fn update_dish_price(&self, dish_id: i64, price: Decimal) -> RepoResult<()> {
        let mut state = self.state.lock();
        let dish = state.dishes.get_mut(&dish_id).ok_or(RepoError::NotFound)?;
        dish.price = price;
        Ok(())
    }
}

#[async_trait]
impl OrderRepository for MemoryStore {
    async fn create(&self, new: NewOrder) -> RepoResult<Order> {
        let mut state = self.state.lock();

        let table_in_tenant = state
            .tables
            .get(&new.table_id)
            .is_some_and(|t| t.company_id == new.company_id);
        if !table_in_tenant {
            return Err(RepoError::NotFound);
        }
        if let Some(open) = state.open_order_on(new.table_id) {
            return Err(RepoError::Conflict(format!(
                "table {} has open order {}",
                new.table_id, open.id
            )));
        }

        state.last_order_id += 1;
        let now = Utc::now();
        let order = Order {
            id: state.last_order_id,
            company_id: new.company_id,
            table_id: new.table_id,
            waiter_id: new.waiter_id,
            cook_id: None,
            status: OrderStatus::Pending,
            created_at: now,
            updated_at: now,
            order_items: new.items,
        };
        state.orders.insert(order.id, order.clone());
        state.set_table_active(order.table_id, false);
        Ok(order)
    }

    async fn find_by_id(&self, company_id: i64, order_id: i64) -> RepoResult<Option<Order>> {
        let state = self.state.lock();
        Ok(state
            .orders
            .get(&order_id)
            .filter(|o| o.company_id == company_id)
            .cloned())
    }

    async fn find_view(&self, company_id: i64, order_id: i64) -> RepoResult<Option<OrderView>> {
        let state = self.state.lock();
        Ok(state
            .orders
            .get(&order_id)
            .filter(|o| o.company_id == company_id)
            .map(|o| state.view(o)))
    }

    async fn find_many(&self, filter: &OrderFilter) -> RepoResult<Vec<OrderView>> {
        let state = self.state.lock();
        let mut matched: Vec<&Order> = state.orders.values().filter(|o| filter.matches(o)).collect();
        matched.sort_by(|a, b| compare(filter.sort, a, b));

        let (skip, take) = match filter.page {
            Some(page) => (page.offset() as usize, page.limit as usize),
            None => (0, usize::MAX),
        };
        Ok(matched
            .into_iter()
            .skip(skip)
            .take(take)
            .map(|o| state.view(o))
            .collect())
    }

    async fn count(&self, filter: &OrderFilter) -> RepoResult<u64> {
        let state = self.state.lock();
        Ok(state.orders.values().filter(|o| filter.matches(o)).count() as u64)
    }

    async fn assign(&self, company_id: i64, order_id: i64, cook_id: i64) -> RepoResult<Order> {
        let mut state = self.state.lock();
        let order = state.tenant_order_mut(company_id, order_id)?;
        if order.status != OrderStatus::Pending || order.cook_id.is_some() {
            return Err(RepoError::Conflict(format!(
                "order {order_id} is {} with cook {:?}",
                order.status, order.cook_id
            )));
        }
        order.cook_id = Some(cook_id);
        order.status = OrderStatus::InProgress;
        order.updated_at = Utc::now();
        Ok(order.clone())
    }

    async fn update_status(&self, update: StatusUpdate) -> RepoResult<Order> {
        let mut state = self.state.lock();
        let order = state.tenant_order_mut(update.company_id, update.order_id)?;
        if order.status != update.from {
            return Err(RepoError::Conflict(format!(
                "order {} is {}, expected {}",
                update.order_id, order.status, update.from
            )));
        }
        order.status = update.to;
        order.updated_at = Utc::now();
        let order = order.clone();
        if update.release_table {
            state.set_table_active(order.table_id, true);
        }
        Ok(order)
    }
}

#[async_trait]
impl TableRepository for MemoryStore {
    async fn find_by_id(&self, company_id: i64, table_id: i64) -> RepoResult<Option<DiningTable>> {
        let state = self.state.lock();
        Ok(state
            .tables
            .get(&table_id)
            .filter(|t| t.company_id == company_id)
            .cloned())
    }

    async fn set_active(&self, company_id: i64, table_id: i64, active: bool) -> RepoResult<()> {
        let mut state = self.state.lock();
        let table = state
            .tables
            .get_mut(&table_id)
            .filter(|t| t.company_id == company_id)
            .ok_or(RepoError::NotFound)?;
        table.active = active;
        Ok(())
    }
}

#[async_trait]
impl DishRepository for MemoryStore {
    async fn find_many_by_ids(&self, company_id: i64, ids: &[i64]) -> RepoResult<Vec<Dish>> {
        let state = self.state.lock();
        Ok(ids
            .iter()
            .filter_map(|id| state.dishes.get(id))
            .filter(|d| d.company_id == company_id)
            .cloned()
            .collect())
    }
}
