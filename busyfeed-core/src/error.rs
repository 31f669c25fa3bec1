//! Error types for the busyfeed ecosystem.

use thiserror::Error;

/// Errors that can occur while parsing a calendar feed.
///
/// Inside [`crate::parse_feed`] these are demoted to strings in
/// `ParsedFeed.errors` so one bad record never aborts the rest of the feed.
#[derive(Error, Debug)]
pub enum FeedError {
    #[error("Unparseable datetime '{0}'")]
    UnparseableDateTime(String),

    #[error("Event '{uid}': unparseable datetime '{value}'")]
    EventDateTime { uid: String, value: String },

    #[error("Event '{uid}': failed to parse recurrence rule: {reason}")]
    RecurrenceRule { uid: String, reason: String },

    #[error("Invalid date '{0}'. Expected YYYY-MM-DD")]
    InvalidDate(String),
}

/// Result type alias for busyfeed operations.
pub type FeedResult<T> = Result<T, FeedError>;
