//! Shared types for the order service
//!
//! Domain models, error codes and the error envelope shared by the service and
//! its HTTP clients.

pub mod error;
pub mod models;
pub mod query;

pub use query::PaginatedResponse;
