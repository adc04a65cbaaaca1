//! Domain models

pub mod analytics;
pub mod dining_table;
pub mod dish;
pub mod employee;
pub mod order;

pub use analytics::*;
pub use dining_table::*;
pub use dish::*;
pub use employee::*;
pub use order::*;
