//! Error category by code range

use super::codes::ErrorCode;

/// Leading-digit grouping of [`ErrorCode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    General,
    Auth,
    Permission,
    Order,
    Dish,
    Table,
    /// Infrastructure failures; logged when they reach the HTTP layer
    System,
}

impl ErrorCategory {
    pub fn from_code(code: u16) -> Self {
        match code {
            0..1000 => Self::General,
            1000..2000 => Self::Auth,
            2000..4000 => Self::Permission,
            4000..6000 => Self::Order,
            6000..7000 => Self::Dish,
            7000..9000 => Self::Table,
            _ => Self::System,
        }
    }
}

impl ErrorCode {
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }
}
