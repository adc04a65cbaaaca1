//! Order analytics
//!
//! [`aggregator`] is a pure reduction over loaded orders; [`service`] scopes
//! the load to the actor's tenant and date window.

pub mod aggregator;
pub mod service;

pub use aggregator::{aggregate, GroupKey};
pub use service::AnalyticsService;
