//! Error codes for the order service
//!
//! Codes are grouped by range:
//! - 0xxx: General
//! - 1xxx: Authentication
//! - 2xxx: Permission
//! - 4xxx: Order
//! - 6xxx: Dish
//! - 7xxx: Table
//! - 9xxx: System

use serde::{Deserialize, Serialize};
use std::fmt;

/// Error code carried by every error envelope, serialized as a bare `u16`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Malformed query parameter or request value
    ValidationFailed = 2,

    // ==================== 1xxx: Auth ====================
    /// Caller identity missing or malformed
    NotAuthenticated = 1001,

    // ==================== 2xxx: Permission ====================
    /// Role or identity does not allow the operation
    PermissionDenied = 2001,

    // ==================== 4xxx: Order ====================
    OrderNotFound = 4001,
    /// Create request without items
    OrderEmpty = 4007,
    /// Status moved underneath a conditional write
    OrderConflict = 4008,
    /// Requested status change is not in the transition graph
    InvalidStatusTransition = 4009,
    OrderAlreadyAssigned = 4010,
    /// Item quantity outside `1..=9999`
    InvalidQuantity = 4011,

    // ==================== 6xxx: Dish ====================
    DishNotFound = 6001,

    // ==================== 7xxx: Table ====================
    TableNotFound = 7001,
    /// Table already carries a non-terminal order
    TableOccupied = 7002,

    // ==================== 9xxx: System ====================
    DatabaseError = 9002,
}

impl ErrorCode {
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Default message when no custom one is given
    pub const fn message(&self) -> &'static str {
        match self {
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::OrderEmpty => "Order is empty",
            ErrorCode::OrderConflict => "Order was modified concurrently",
            ErrorCode::InvalidStatusTransition => "Invalid order status transition",
            ErrorCode::OrderAlreadyAssigned => "Order is already assigned",
            ErrorCode::InvalidQuantity => "Invalid item quantity",
            ErrorCode::DishNotFound => "Dish not found",
            ErrorCode::TableNotFound => "Table not found",
            ErrorCode::TableOccupied => "Table is occupied",
            ErrorCode::DatabaseError => "Database error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// A `u16` that names no [`ErrorCode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        let code = match value {
            2 => ErrorCode::ValidationFailed,
            1001 => ErrorCode::NotAuthenticated,
            2001 => ErrorCode::PermissionDenied,
            4001 => ErrorCode::OrderNotFound,
            4007 => ErrorCode::OrderEmpty,
            4008 => ErrorCode::OrderConflict,
            4009 => ErrorCode::InvalidStatusTransition,
            4010 => ErrorCode::OrderAlreadyAssigned,
            4011 => ErrorCode::InvalidQuantity,
            6001 => ErrorCode::DishNotFound,
            7001 => ErrorCode::TableNotFound,
            7002 => ErrorCode::TableOccupied,
            9002 => ErrorCode::DatabaseError,
            _ => return Err(InvalidErrorCode(value)),
        };
        Ok(code)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
