//! Query window for filtering and bounding recurrence expansion.

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::{FeedError, FeedResult};

/// Half-open query window `[from, to)`.
/// None values mean unbounded in that direction.
#[derive(Debug, Clone, Default)]
pub struct QueryRange {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl QueryRange {
    pub fn new(from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> Self {
        QueryRange { from, to }
    }

    /// Fully unbounded window.
    pub fn unbounded() -> Self {
        QueryRange::default()
    }

    /// Parse CLI-style date strings into a QueryRange.
    /// - `from`: YYYY-MM-DD, taken as start of day UTC
    /// - `to`: YYYY-MM-DD, taken as end of day UTC
    pub fn from_args(from: Option<&str>, to: Option<&str>) -> FeedResult<Self> {
        let from_dt = from.map(parse_date_start).transpose()?;
        let to_dt = to.map(parse_date_end).transpose()?;
        Ok(QueryRange {
            from: from_dt,
            to: to_dt,
        })
    }

    /// True if the instant falls inside the window.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        if let Some(from) = self.from {
            if instant < from {
                return false;
            }
        }
        if let Some(to) = self.to {
            if instant >= to {
                return false;
            }
        }
        true
    }
}

/// Parse YYYY-MM-DD as start of day in UTC
fn parse_date_start(s: &str) -> FeedResult<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| FeedError::InvalidDate(s.to_string()))?;
    Ok(date.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc())
}

/// Parse YYYY-MM-DD as end of day in UTC
fn parse_date_end(s: &str) -> FeedResult<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| FeedError::InvalidDate(s.to_string()))?;
    Ok(date.and_hms_opt(23, 59, 59).unwrap_or_default().and_utc())
}
