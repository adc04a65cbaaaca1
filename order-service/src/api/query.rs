//! Query-string parsing
//!
//! Handlers take raw strings and convert them here so a bad value becomes a
//! `ValidationFailed` envelope instead of an extractor rejection.

use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};
use shared::error::AppError;
use std::str::FromStr;

/// Which end of a date range a bare `YYYY-MM-DD` stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// `00:00:00` of the day
    Start,
    /// Last instant of the day
    End,
}

fn blank(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

/// Parse an optional value with its `FromStr` impl
pub fn parse_opt<T>(raw: Option<&str>, field: &str) -> Result<Option<T>, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    blank(raw)
        .map(|s| {
            s.parse::<T>()
                .map_err(|e| AppError::validation(format!("invalid {field}: {e}")).with_detail("field", field))
        })
        .transpose()
}

/// Comma-separated id list, e.g. `1,2,3`
pub fn parse_ids(raw: Option<&str>, field: &str) -> Result<Option<Vec<i64>>, AppError> {
    let Some(raw) = blank(raw) else {
        return Ok(None);
    };
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i64>().map_err(|_| {
                AppError::validation(format!("invalid id in {field}: {s}")).with_detail("field", field)
            })
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

/// RFC 3339 timestamp or `YYYY-MM-DD` date
pub fn parse_instant(
    raw: Option<&str>,
    field: &str,
    bound: Bound,
) -> Result<Option<DateTime<Utc>>, AppError> {
    let Some(raw) = blank(raw) else {
        return Ok(None);
    };
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(Some(ts.with_timezone(&Utc)));
    }
    let invalid = || {
        AppError::validation(format!(
            "invalid {field}: expected RFC 3339 timestamp or YYYY-MM-DD, got {raw}"
        ))
        .with_detail("field", field)
    };
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| invalid())?;
    let start = date.and_time(NaiveTime::MIN).and_utc();
    match bound {
        Bound::Start => Ok(Some(start)),
        Bound::End => {
            let next = date.checked_add_days(Days::new(1)).ok_or_else(invalid)?;
            Ok(Some(
                next.and_time(NaiveTime::MIN).and_utc() - chrono::Duration::nanoseconds(1),
            ))
        }
    }
}
