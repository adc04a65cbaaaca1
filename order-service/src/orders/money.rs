//! Money and quantity utilities using rust_decimal for precision
//!
//! Line totals and aggregates stay exact `Decimal`s; only values leaving the
//! service are rounded.

use rust_decimal::prelude::*;
use shared::models::CreateOrderRequest;

use crate::error::{OrderError, OrderResult};

/// Rounding for reported monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Minimum allowed quantity per item
pub const MIN_QUANTITY: i32 = 1;
/// Maximum allowed quantity per item
pub const MAX_QUANTITY: i32 = 9999;

/// Validate a create request before any lookup runs
pub fn validate_order_request(request: &CreateOrderRequest) -> OrderResult<()> {
    if request.items.is_empty() {
        return Err(OrderError::EmptyOrder);
    }
    match request
        .items
        .iter()
        .find(|item| !(MIN_QUANTITY..=MAX_QUANTITY).contains(&item.quantity))
    {
        Some(item) => Err(OrderError::InvalidQuantity {
            dish_id: item.dish_id,
            quantity: item.quantity,
        }),
        None => Ok(()),
    }
}

/// Round to 2 decimal places, midpoint away from zero
#[inline]
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// `part / total * 100`, rounded; zero when `total` is zero
pub fn percentage(part: Decimal, total: Decimal) -> Decimal {
    if total.is_zero() {
        return Decimal::ZERO;
    }
    round_money(part / total * Decimal::ONE_HUNDRED)
}

/// `numerator / denominator`, rounded; zero when `denominator` is zero
pub fn ratio(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator.is_zero() {
        return Decimal::ZERO;
    }
    round_money(numerator / denominator)
}
