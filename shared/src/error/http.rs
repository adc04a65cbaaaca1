//! HTTP status for each error code

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::ValidationFailed | Self::OrderEmpty | Self::InvalidQuantity => {
                StatusCode::BAD_REQUEST
            }
            Self::NotAuthenticated => StatusCode::UNAUTHORIZED,
            Self::PermissionDenied => StatusCode::FORBIDDEN,
            Self::OrderNotFound | Self::DishNotFound | Self::TableNotFound => {
                StatusCode::NOT_FOUND
            }
            Self::OrderConflict | Self::OrderAlreadyAssigned | Self::TableOccupied => {
                StatusCode::CONFLICT
            }
            Self::InvalidStatusTransition => StatusCode::UNPROCESSABLE_ENTITY,
            Self::DatabaseError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
