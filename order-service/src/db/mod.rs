//! Repository contract
//!
//! The lifecycle and analytics services only talk to storage through these
//! traits. Every read and write is scoped by `company_id`; a row of another
//! tenant is indistinguishable from a missing row.
//!
//! Conditional writes (`create`, `assign`, `update_status`) are atomic in every
//! implementation: they either apply completely or report `RepoError::Conflict`.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::models::{
    DiningTable, Dish, Order, OrderItem, OrderSortField, OrderStatus, OrderView, OrdersQuery,
    SortOrder,
};

use crate::error::RepoResult;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Order to insert; prices are already snapshotted
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub company_id: i64,
    pub table_id: i64,
    pub waiter_id: i64,
    pub items: Vec<OrderItem>,
}

/// Conditional status write
#[derive(Debug, Clone, Copy)]
pub struct StatusUpdate {
    pub company_id: i64,
    pub order_id: i64,
    /// The write only applies while the order is still in this status
    pub from: OrderStatus,
    pub to: OrderStatus,
    /// Flip the order's table back to `active = true` in the same write
    pub release_table: bool,
}

/// Sort field and direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrderSort {
    pub field: OrderSortField,
    pub direction: SortOrder,
}

/// Page window, 1-based
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: u32,
    pub limit: u32,
}

impl Page {
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }
}

/// Filter shared by `find_many` and `count`
#[derive(Debug, Clone)]
pub struct OrderFilter {
    pub company_id: i64,
    pub status: Option<OrderStatus>,
    /// Inclusive lower bound on `created_at`
    pub from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on `created_at`
    pub to: Option<DateTime<Utc>>,
    pub waiter_id: Option<i64>,
    pub cook_id: Option<i64>,
    pub table_id: Option<i64>,
    /// Only orders without a cook
    pub unassigned_only: bool,
    pub sort: OrderSort,
    /// `None` returns every matching row
    pub page: Option<Page>,
}

impl OrderFilter {
    pub fn for_company(company_id: i64) -> Self {
        Self {
            company_id,
            status: None,
            from: None,
            to: None,
            waiter_id: None,
            cook_id: None,
            table_id: None,
            unassigned_only: false,
            sort: OrderSort::default(),
            page: None,
        }
    }

    /// Build a filter from a list query; `page`/`limit` must already be clamped
    pub fn from_query(company_id: i64, query: &OrdersQuery) -> Self {
        Self {
            company_id,
            status: query.status,
            from: query.from,
            to: query.to,
            waiter_id: query.waiter_id,
            cook_id: query.cook_id,
            table_id: query.table_id,
            unassigned_only: false,
            sort: OrderSort {
                field: query.sort_by,
                direction: query.sort_order,
            },
            page: Some(Page {
                page: query.page,
                limit: query.limit,
            }),
        }
    }

    /// Whether `order` satisfies every predicate (paging and sorting aside)
    pub fn matches(&self, order: &Order) -> bool {
        order.company_id == self.company_id
            && self.status.is_none_or(|s| order.status == s)
            && self.from.is_none_or(|from| order.created_at >= from)
            && self.to.is_none_or(|to| order.created_at <= to)
            && self.waiter_id.is_none_or(|id| order.waiter_id == id)
            && self.cook_id.is_none_or(|id| order.cook_id == Some(id))
            && self.table_id.is_none_or(|id| order.table_id == id)
            && (!self.unassigned_only || order.cook_id.is_none())
    }
}

#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Insert a `PENDING` order and occupy its table.
    ///
    /// `NotFound` if the table is not in the tenant, `Conflict` if it already
    /// has a non-terminal order.
    async fn create(&self, order: NewOrder) -> RepoResult<Order>;

    async fn find_by_id(&self, company_id: i64, order_id: i64) -> RepoResult<Option<Order>>;

    /// Order joined with waiter, cook, table and dish projections
    async fn find_view(&self, company_id: i64, order_id: i64) -> RepoResult<Option<OrderView>>;

    async fn find_many(&self, filter: &OrderFilter) -> RepoResult<Vec<OrderView>>;

    /// Rows matching `filter`, ignoring its page window
    async fn count(&self, filter: &OrderFilter) -> RepoResult<u64>;

    /// `PENDING -> IN_PROGRESS` with `cook_id = cook_id`, only while the order
    /// is `PENDING` and unassigned.
    async fn assign(&self, company_id: i64, order_id: i64, cook_id: i64) -> RepoResult<Order>;

    /// Apply `update` only if the order is still in `update.from`
    async fn update_status(&self, update: StatusUpdate) -> RepoResult<Order>;
}

#[async_trait]
pub trait TableRepository: Send + Sync {
    async fn find_by_id(&self, company_id: i64, table_id: i64) -> RepoResult<Option<DiningTable>>;

    /// Manual table flip for seeding and maintenance.
    ///
    /// Lifecycle writes never call this: `OrderRepository::create` and
    /// `update_status` flip `active` inside their own transaction.
    async fn set_active(&self, company_id: i64, table_id: i64, active: bool) -> RepoResult<()>;
}

#[async_trait]
pub trait DishRepository: Send + Sync {
    /// Dishes of the tenant among `ids`; absent ids are simply missing
    async fn find_many_by_ids(&self, company_id: i64, ids: &[i64]) -> RepoResult<Vec<Dish>>;
}
