//! Dish / Category Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Menu category
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: i64,
    pub company_id: i64,
    pub name: String,
}

/// Dish entity with its current catalog price
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Dish {
    pub id: i64,
    pub company_id: i64,
    pub name: String,
    pub price: Decimal,
    pub category_id: Option<i64>,
}

/// Shallow dish projection embedded in order lines
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DishRef {
    pub id: i64,
    pub name: String,
    pub category_id: Option<i64>,
    pub category_name: Option<String>,
}
