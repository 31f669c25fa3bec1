//! Normalized event types produced by the feed parser.
//!
//! These types are provider-agnostic: every datetime has already been
//! resolved to a UTC instant by the parsing pipeline, so consumers (the
//! busy-time projector, a scheduling engine) never see timezone qualifiers
//! or recurrence rules.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single calendar event occurrence with normalized UTC instants.
///
/// Recurring events are expanded before this type is produced: each
/// occurrence of a series is its own `CalendarEvent`, and recurrence rule
/// text never survives into the output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub uid: String,
    pub summary: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub status: EventStatus,
    /// Whether the event blocks time (OPAQUE) or shows as free (TRANSPARENT)
    pub transparency: Transparency,
    /// Literal DTSTART token from the feed, kept for diagnostics
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_start: Option<String>,
    /// Literal DTEND token from the feed, kept for diagnostics
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_end: Option<String>,
}

impl CalendarEvent {
    /// True if the event overlaps the half-open window `[from, to)`.
    pub fn overlaps(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> bool {
        self.start < to && self.end > from
    }
}

/// Event status (STATUS property). Defaults to `Confirmed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventStatus {
    Confirmed,
    Tentative,
    Cancelled,
}

impl Default for EventStatus {
    fn default() -> Self {
        EventStatus::Confirmed
    }
}

impl EventStatus {
    pub fn from_ics_str(value: &str) -> Self {
        match value.trim().to_ascii_uppercase().as_str() {
            "TENTATIVE" => EventStatus::Tentative,
            "CANCELLED" => EventStatus::Cancelled,
            _ => EventStatus::Confirmed,
        }
    }
}

/// Event transparency (TRANSP property). Defaults to `Opaque`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Transparency {
    /// Event blocks time on the calendar (default)
    Opaque,
    /// Event does not block time (shows as free)
    Transparent,
}

impl Default for Transparency {
    fn default() -> Self {
        Transparency::Opaque
    }
}

impl Transparency {
    pub fn from_ics_str(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("TRANSPARENT") {
            Transparency::Transparent
        } else {
            Transparency::Opaque
        }
    }
}

/// Result of parsing one feed: normalized events plus advisory errors.
///
/// A non-empty `errors` list does not mean `events` is unusable; partial
/// results are expected under real-world feed irregularities.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParsedFeed {
    pub events: Vec<CalendarEvent>,
    pub errors: Vec<String>,
}

/// A busy interval handed to the scheduling engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusyInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_status_from_ics_str() {
        assert_eq!(EventStatus::from_ics_str("CONFIRMED"), EventStatus::Confirmed);
        assert_eq!(EventStatus::from_ics_str("tentative"), EventStatus::Tentative);
        assert_eq!(EventStatus::from_ics_str("CANCELLED"), EventStatus::Cancelled);
        // Unknown values degrade to the default
        assert_eq!(EventStatus::from_ics_str("WHATEVER"), EventStatus::Confirmed);
    }

    #[test]
    fn test_overlaps_half_open_window() {
        let event = CalendarEvent {
            uid: "a".to_string(),
            summary: "Standup".to_string(),
            start: Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap(),
            status: EventStatus::Confirmed,
            transparency: Transparency::Opaque,
            raw_start: None,
            raw_end: None,
        };

        let from = Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap();
        let to = Utc.with_ymd_and_hms(2024, 1, 16, 0, 0, 0).unwrap();
        assert!(event.overlaps(from, to));

        // Window ending exactly at the event start does not overlap
        let to_at_start = Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap();
        assert!(!event.overlaps(from, to_at_start));
    }
}
