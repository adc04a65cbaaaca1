//! Order Model
//!
//! `Order` is the aggregate root; `OrderView` is the joined read model that
//! carries the shallow waiter/cook/table/dish projections list endpoints and
//! analytics work from.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::dining_table::TableRef;
use super::dish::DishRef;
use super::employee::EmployeeRef;

// ============================================================================
// Status
// ============================================================================

/// Order lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    InProgress,
    Complete,
    Delivered,
    Finished,
    Canceled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::Pending,
        OrderStatus::InProgress,
        OrderStatus::Complete,
        OrderStatus::Delivered,
        OrderStatus::Finished,
        OrderStatus::Canceled,
    ];

    /// Statuses that keep a table occupied
    pub const OPEN: [OrderStatus; 4] = [
        OrderStatus::Pending,
        OrderStatus::InProgress,
        OrderStatus::Complete,
        OrderStatus::Delivered,
    ];

    /// `FINISHED` and `CANCELED` are terminal
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Finished | OrderStatus::Canceled)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::InProgress => "IN_PROGRESS",
            OrderStatus::Complete => "COMPLETE",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Finished => "FINISHED",
            OrderStatus::Canceled => "CANCELED",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase();
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| format!("unknown order status: {s}"))
    }
}

// ============================================================================
// Aggregate
// ============================================================================

/// Order line with the unit price captured at creation time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub dish_id: i64,
    pub quantity: i32,
    /// Dish price at the moment the order was created; never recomputed
    #[serde(rename = "unitPriceSnapshot")]
    pub unit_price: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl OrderItem {
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Order aggregate root
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i64,
    pub company_id: i64,
    pub table_id: i64,
    pub waiter_id: i64,
    pub cook_id: Option<i64>,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub order_items: Vec<OrderItem>,
}

impl Order {
    /// Sum of `quantity * unitPriceSnapshot`; always derived, never stored
    pub fn total(&self) -> Decimal {
        self.order_items.iter().map(OrderItem::line_total).sum()
    }

    pub fn is_open(&self) -> bool {
        !self.status.is_terminal()
    }
}

/// Order input line
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrderItem {
    pub dish_id: i64,
    pub quantity: i32,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Create order payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub table_id: i64,
    pub items: Vec<NewOrderItem>,
}

/// Advance status payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvanceStatusRequest {
    pub status: OrderStatus,
}

// ============================================================================
// Read Models
// ============================================================================

/// Order joined with its waiter, cook, table and dish projections
///
/// `dishes[i]` describes `order.order_items[i]`.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderView {
    pub order: Order,
    pub waiter: EmployeeRef,
    pub cook: Option<EmployeeRef>,
    pub table: TableRef,
    pub dishes: Vec<DishRef>,
}

impl OrderView {
    /// Order lines paired with their dish projection
    pub fn lines(&self) -> impl Iterator<Item = (&OrderItem, &DishRef)> {
        self.order.order_items.iter().zip(self.dishes.iter())
    }
}

/// Summary line in list responses
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummaryItem {
    pub dish: DishRef,
    pub quantity: i32,
}

/// Order list entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub id: i64,
    pub status: OrderStatus,
    pub table: TableRef,
    pub waiter: EmployeeRef,
    pub cook: Option<EmployeeRef>,
    pub total: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub items: Vec<OrderSummaryItem>,
}

impl From<&OrderView> for OrderSummary {
    fn from(view: &OrderView) -> Self {
        Self {
            id: view.order.id,
            status: view.order.status,
            table: view.table.clone(),
            waiter: view.waiter.clone(),
            cook: view.cook.clone(),
            total: view.order.total(),
            created_at: view.order.created_at,
            updated_at: view.order.updated_at,
            items: view
                .lines()
                .map(|(item, dish)| OrderSummaryItem {
                    dish: dish.clone(),
                    quantity: item.quantity,
                })
                .collect(),
        }
    }
}

/// Detail line with snapshot price and notes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetailLine {
    pub dish: DishRef,
    pub quantity: i32,
    pub unit_price_snapshot: Decimal,
    pub line_total: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Full order detail
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetail {
    pub id: i64,
    pub company_id: i64,
    pub status: OrderStatus,
    pub table: TableRef,
    pub waiter: EmployeeRef,
    pub cook: Option<EmployeeRef>,
    pub total: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub items: Vec<OrderDetailLine>,
}

impl From<OrderView> for OrderDetail {
    fn from(view: OrderView) -> Self {
        let items = view
            .lines()
            .map(|(item, dish)| OrderDetailLine {
                dish: dish.clone(),
                quantity: item.quantity,
                unit_price_snapshot: item.unit_price,
                line_total: item.line_total(),
                notes: item.notes.clone(),
            })
            .collect();
        Self {
            id: view.order.id,
            company_id: view.order.company_id,
            status: view.order.status,
            total: view.order.total(),
            created_at: view.order.created_at,
            updated_at: view.order.updated_at,
            table: view.table,
            waiter: view.waiter,
            cook: view.cook,
            items,
        }
    }
}

// ============================================================================
// List Query
// ============================================================================

/// Sort direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(format!("unknown sort order: {other}")),
        }
    }
}

/// Sortable order columns
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OrderSortField {
    #[default]
    CreatedAt,
    UpdatedAt,
    Status,
    Id,
}

impl FromStr for OrderSortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "createdAt" | "created_at" => Ok(OrderSortField::CreatedAt),
            "updatedAt" | "updated_at" => Ok(OrderSortField::UpdatedAt),
            "status" => Ok(OrderSortField::Status),
            "id" => Ok(OrderSortField::Id),
            other => Err(format!("unknown sort field: {other}")),
        }
    }
}

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 100;

/// Order list filter (`from`/`to` inclusive on `createdAt`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrdersQuery {
    pub status: Option<OrderStatus>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub waiter_id: Option<i64>,
    pub cook_id: Option<i64>,
    pub table_id: Option<i64>,
    pub page: u32,
    pub limit: u32,
    pub sort_by: OrderSortField,
    pub sort_order: SortOrder,
}

impl Default for OrdersQuery {
    fn default() -> Self {
        Self {
            status: None,
            from: None,
            to: None,
            waiter_id: None,
            cook_id: None,
            table_id: None,
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
            sort_by: OrderSortField::default(),
            sort_order: SortOrder::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(quantity: i32, price: &str) -> OrderItem {
        OrderItem {
            dish_id: 1,
            quantity,
            unit_price: price.parse().unwrap(),
            notes: None,
        }
    }

    #[test]
    fn test_total_is_sum_of_lines() {
        let now = Utc::now();
        let order = Order {
            id: 1,
            company_id: 1,
            table_id: 1,
            waiter_id: 1,
            cook_id: None,
            status: OrderStatus::Pending,
            created_at: now,
            updated_at: now,
            order_items: vec![item(2, "10.50"), item(1, "3.25")],
        };
        assert_eq!(order.total(), "24.25".parse::<Decimal>().unwrap());
    }

    #[test]
    fn test_terminal_statuses() {
        let terminal: Vec<_> = OrderStatus::ALL
            .into_iter()
            .filter(OrderStatus::is_terminal)
            .collect();
        assert_eq!(terminal, vec![OrderStatus::Finished, OrderStatus::Canceled]);
        assert!(OrderStatus::OPEN.iter().all(|s| !s.is_terminal()));
    }

    #[test]
    fn test_status_parse() {
        assert_eq!("in_progress".parse(), Ok(OrderStatus::InProgress));
        assert_eq!("CANCELED".parse(), Ok(OrderStatus::Canceled));
        assert!("SHIPPED".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_item_serializes_snapshot_name() {
        let json = serde_json::to_value(item(1, "10")).unwrap();
        assert_eq!(json["unitPriceSnapshot"], 10.0);
        assert_eq!(json["dishId"], 1);
    }
}
