//! Dining Table Model

use serde::{Deserialize, Serialize};

/// Dining table entity (桌台)
///
/// `active == true` means the table is free; an open order flips it to `false`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct DiningTable {
    pub id: i64,
    pub company_id: i64,
    pub number: i32,
    pub seats: i32,
    pub active: bool,
}

/// Shallow table projection embedded in order views
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRef {
    pub id: i64,
    pub number: i32,
}
