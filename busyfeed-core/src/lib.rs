//! Calendar feed ingestion for busy-time scheduling.
//!
//! This crate turns iCalendar-style feed text into a normalized set of
//! events with UTC start/end instants, then projects the busy intervals a
//! scheduling engine consumes:
//! - [`parse_feed`] — text to `{events, errors}`, with recurrence expansion,
//!   legacy timezone resolution, exception handling, and deduplication
//! - [`extract_busy_times`] — events + window to sorted busy intervals
//! - [`validate_feed_url`] — advisory check before an external fetch
//!
//! The pipeline is pure and synchronous: no I/O, no shared state, safe to
//! run concurrently across independent feeds.

pub mod busy;
pub mod dedup;
pub mod error;
pub mod event;
pub mod feed;
pub mod range;
pub mod recurrence;
pub mod timezone;
pub mod validate;

pub use busy::extract_busy_times;
pub use dedup::UidNormalizer;
pub use error::{FeedError, FeedResult};
pub use event::{BusyInterval, CalendarEvent, EventStatus, ParsedFeed, Transparency};
pub use feed::parse_feed;
pub use range::QueryRange;
pub use validate::{validate_feed_url, UrlValidation};
