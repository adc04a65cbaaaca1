//! Order analytics request/response models

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Grouping dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupBy {
    Day,
    Month,
    Dish,
    Category,
    Waiter,
    Cook,
    Table,
}

impl GroupBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupBy::Day => "day",
            GroupBy::Month => "month",
            GroupBy::Dish => "dish",
            GroupBy::Category => "category",
            GroupBy::Waiter => "waiter",
            GroupBy::Cook => "cook",
            GroupBy::Table => "table",
        }
    }
}

impl fmt::Display for GroupBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GroupBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" => Ok(GroupBy::Day),
            "month" => Ok(GroupBy::Month),
            "dish" => Ok(GroupBy::Dish),
            "category" => Ok(GroupBy::Category),
            "waiter" => Ok(GroupBy::Waiter),
            "cook" => Ok(GroupBy::Cook),
            "table" => Ok(GroupBy::Table),
            _ => Err(format!("unknown groupBy: {s}")),
        }
    }
}

/// Aggregated metric selected as `value`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    #[default]
    Revenue,
    Count,
    Quantity,
}

impl Metric {
    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Revenue => "revenue",
            Metric::Count => "count",
            Metric::Quantity => "quantity",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "revenue" => Ok(Metric::Revenue),
            "count" => Ok(Metric::Count),
            "quantity" => Ok(Metric::Quantity),
            _ => Err(format!("unknown metric: {s}")),
        }
    }
}

/// Analytics request
///
/// Id-list filters set to `None` or an empty list do not filter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderAnalyticsQuery {
    pub group_by: GroupBy,
    #[serde(default)]
    pub metric: Metric,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub dish_ids: Option<Vec<i64>>,
    pub category_ids: Option<Vec<i64>>,
    pub waiter_ids: Option<Vec<i64>>,
    pub cook_ids: Option<Vec<i64>>,
    pub table_ids: Option<Vec<i64>>,
}

impl OrderAnalyticsQuery {
    pub fn new(group_by: GroupBy, metric: Metric) -> Self {
        Self {
            group_by,
            metric,
            from: None,
            to: None,
            dish_ids: None,
            category_ids: None,
            waiter_ids: None,
            cook_ids: None,
            table_ids: None,
        }
    }
}

/// Display data attached to a group
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupInfo {
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_number: Option<i32>,
}

/// One day of a group's sparse trend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub value: Decimal,
}

/// Per-group statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderAnalyticsResult {
    /// `YYYY-MM-DD`, `YYYY-MM` or the entity id
    pub group_key: String,
    pub group_info: GroupInfo,
    pub count: i64,
    pub quantity: i64,
    pub revenue: Decimal,
    pub value: Decimal,
    pub avg_revenue_per_order: Decimal,
    pub avg_items_per_order: Decimal,
    pub percentage_of_total_revenue: Decimal,
    /// Share of the selected metric across all groups
    pub percentage_of_total: Decimal,
    pub trend: Vec<TrendPoint>,
    pub max_revenue_in_day: Decimal,
    pub min_revenue_in_day: Decimal,
    pub peak_day: Option<NaiveDate>,
    pub trough_day: Option<NaiveDate>,
}
