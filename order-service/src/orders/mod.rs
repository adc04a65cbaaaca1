//! Order lifecycle
//!
//! - [`state_machine`]: the allowed status graph and its role gates
//! - [`service`]: create / assign / cancel / advance and the list queries
//! - [`notifier`]: best-effort kitchen and waiter notifications
//! - [`money`]: quantity validation and decimal rounding

pub mod money;
pub mod notifier;
pub mod service;
pub mod state_machine;

pub use notifier::{BroadcastNotifier, Channel, Notification, NotificationSink, OrderEvent};
pub use service::OrderLifecycleService;

#[cfg(test)]
mod tests;
