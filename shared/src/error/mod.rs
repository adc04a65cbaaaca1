//! Error codes and the HTTP error envelope
//!
//! - [`ErrorCode`]: numeric code, default message and HTTP status
//! - [`ErrorCategory`]: grouping by code range
//! - [`AppError`]: handler error, rendered as an [`ErrorBody`]
//!
//! ```
//! use shared::error::{AppError, ErrorBody, ErrorCode};
//!
//! let err = AppError::with_message(ErrorCode::InvalidStatusTransition, "PENDING -> FINISHED")
//!     .with_detail("from", "PENDING");
//!
//! let body = ErrorBody::from(&err);
//! assert_eq!(body.code, 4009);
//! ```

mod category;
mod codes;
mod http;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{AppError, ErrorBody};
