//! order-service: multi-tenant restaurant order lifecycle and analytics
//!
//! - [`orders`]: status state machine, lifecycle service, notifications
//! - [`analytics`]: grouped revenue / count / quantity statistics
//! - [`db`]: repository contract with in-memory and PostgreSQL stores
//! - [`api`]: axum HTTP surface

pub mod analytics;
pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod orders;
pub mod state;

pub use config::Config;
pub use error::{OrderError, OrderResult};
pub use state::AppState;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;
