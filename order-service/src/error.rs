//! Error types for the order service
//!
//! `RepoError` is what storage backends report; `OrderError` is the typed
//! business error the lifecycle and analytics services return. The HTTP layer
//! converts `OrderError` into the unified `AppError` envelope.

use shared::error::{AppError, ErrorCode};
use shared::models::OrderStatus;
use std::fmt;
use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

// ============================================================================
// Repository
// ============================================================================

/// Storage-layer errors
#[derive(Debug, Error)]
pub enum RepoError {
    /// Target row is absent or outside the tenant
    #[error("Record not found")]
    NotFound,

    /// A conditional write matched zero rows or a unique constraint fired
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(BoxError),
}

impl From<sqlx::Error> for RepoError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::RowNotFound => RepoError::NotFound,
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                RepoError::Conflict(db.message().to_string())
            }
            _ => RepoError::Database(e.into()),
        }
    }
}

pub type RepoResult<T> = Result<T, RepoError>;

// ============================================================================
// Business
// ============================================================================

/// Entity kinds that can be reported missing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Order,
    Table,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entity::Order => f.write_str("Order"),
            Entity::Table => f.write_str("Table"),
        }
    }
}

/// Which invariant a conflicting write ran into
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Conflict {
    /// The table already carries a non-terminal order
    TableOccupied { table_id: i64 },
    /// The order left `PENDING` or got a cook first
    AlreadyAssigned { order_id: i64 },
    /// The order's status moved since it was read
    StaleStatus { order_id: i64, expected: OrderStatus },
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Conflict::TableOccupied { table_id } => {
                write!(f, "Table {table_id} already has an open order")
            }
            Conflict::AlreadyAssigned { order_id } => {
                write!(f, "Order {order_id} is already assigned")
            }
            Conflict::StaleStatus { order_id, expected } => {
                write!(f, "Order {order_id} is no longer {expected}")
            }
        }
    }
}

/// Order lifecycle / analytics errors
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("{0} not found: {1}")]
    NotFound(Entity, i64),

    #[error("Dish not found: {0}")]
    DishNotFound(i64),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("{0}")]
    Conflict(Conflict),

    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("Order must contain at least one item")]
    EmptyOrder,

    #[error("Invalid quantity {quantity} for dish {dish_id}")]
    InvalidQuantity { dish_id: i64, quantity: i32 },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Repository error: {0}")]
    Repository(#[source] RepoError),
}

impl OrderError {
    pub fn forbidden(msg: impl Into<String>) -> Self {
        OrderError::Forbidden(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        OrderError::Validation(msg.into())
    }

    /// Map a conditional-write failure into its business meaning
    pub(crate) fn from_write(err: RepoError, not_found: OrderError, conflict: Conflict) -> Self {
        match err {
            RepoError::NotFound => not_found,
            RepoError::Conflict(_) => OrderError::Conflict(conflict),
            other => OrderError::Repository(other),
        }
    }
}

impl From<RepoError> for OrderError {
    fn from(e: RepoError) -> Self {
        OrderError::Repository(e)
    }
}

pub type OrderResult<T> = Result<T, OrderError>;

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        let message = err.to_string();
        match err {
            OrderError::NotFound(Entity::Order, id) => {
                AppError::with_message(ErrorCode::OrderNotFound, message).with_detail("id", id)
            }
            OrderError::NotFound(Entity::Table, id) => {
                AppError::with_message(ErrorCode::TableNotFound, message).with_detail("id", id)
            }
            OrderError::DishNotFound(id) => {
                AppError::with_message(ErrorCode::DishNotFound, message).with_detail("dish_id", id)
            }
            OrderError::Forbidden(_) => AppError::with_message(ErrorCode::PermissionDenied, message),
            OrderError::Conflict(conflict) => match conflict {
                Conflict::TableOccupied { table_id } => {
                    AppError::with_message(ErrorCode::TableOccupied, message)
                        .with_detail("table_id", table_id)
                }
                Conflict::AlreadyAssigned { order_id } => {
                    AppError::with_message(ErrorCode::OrderAlreadyAssigned, message)
                        .with_detail("order_id", order_id)
                }
                Conflict::StaleStatus { order_id, expected } => {
                    AppError::with_message(ErrorCode::OrderConflict, message)
                        .with_detail("order_id", order_id)
                        .with_detail("expected", expected.as_str())
                }
            },
            OrderError::InvalidTransition { from, to } => {
                AppError::with_message(ErrorCode::InvalidStatusTransition, message)
                    .with_detail("from", from.as_str())
                    .with_detail("to", to.as_str())
            }
            OrderError::EmptyOrder => AppError::with_message(ErrorCode::OrderEmpty, message),
            OrderError::InvalidQuantity { dish_id, quantity } => {
                AppError::with_message(ErrorCode::InvalidQuantity, message)
                    .with_detail("dish_id", dish_id)
                    .with_detail("quantity", quantity)
            }
            OrderError::Validation(msg) => AppError::validation(msg),
            OrderError::Repository(e) => {
                tracing::error!(error = %e, "Order repository error");
                AppError::new(ErrorCode::DatabaseError)
            }
        }
    }
}
