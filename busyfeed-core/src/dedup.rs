//! Occurrence suppression and ingest deduplication.
//!
//! After every block is parsed into a flat occurrence list, two passes run:
//! a RECURRENCE-ID suppression pass that drops generated occurrences matched
//! by separately-encoded CANCELLED overrides, then an ingest dedup that
//! collapses duplicates by series identity (stripped UID + start instant).

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use regex::Regex;
use tracing::debug;

use crate::event::{CalendarEvent, EventStatus};
use crate::feed::block::EventBlock;
use crate::timezone::normalize_datetime;

/// Strips synthetic and vendor-specific suffixes off UIDs so all records of
/// one series share a base identity.
///
/// The default patterns cover the synthetic datetime suffix this crate
/// appends to generated occurrences and the Google-style `_R<datetime>`
/// recurring-instance marker. Vendors with other conventions can supply
/// their own patterns.
pub struct UidNormalizer {
    patterns: Vec<Regex>,
}

impl Default for UidNormalizer {
    fn default() -> Self {
        // The trailing synthetic datetime suffix, then the Google-style
        // recurring-instance marker (which sits before the @domain tail)
        UidNormalizer::with_patterns(&[r"[-_]\d{8}(T\d{6}Z?)?$", r"_R\d{8}(T\d{6}Z?)?"])
            .unwrap_or(UidNormalizer { patterns: Vec::new() })
    }
}

impl UidNormalizer {
    /// Build a normalizer from custom suffix patterns.
    pub fn with_patterns(patterns: &[&str]) -> Result<Self, regex::Error> {
        let patterns = patterns
            .iter()
            .map(|p| Regex::new(p))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(UidNormalizer { patterns })
    }

    /// Derive the series-base identity for a UID.
    pub fn series_base(&self, uid: &str) -> String {
        let mut base = uid.to_string();
        for pattern in &self.patterns {
            base = pattern.replace(&base, "").into_owned();
        }
        base
    }
}

/// Drop generated occurrences matched by CANCELLED recurrence-anchor
/// overrides.
///
/// Re-scans the original blocks for ones carrying a RECURRENCE-ID: each
/// CANCELLED one records (series base, anchor instant to the second), and
/// any occurrence whose stripped UID and start both match is removed.
/// Non-cancelled anchor blocks (moved or modified instances) are not used
/// for suppression; they stand as independent events.
pub fn suppress_cancelled_overrides(
    events: Vec<CalendarEvent>,
    blocks: &[EventBlock],
    normalizer: &UidNormalizer,
) -> Vec<CalendarEvent> {
    let mut cancelled: HashSet<(String, i64)> = HashSet::new();

    for block in blocks {
        let Some(anchor) = block.prop("RECURRENCE-ID") else {
            continue;
        };
        let Some(uid) = block.value("UID") else {
            continue;
        };

        let status = block
            .value("STATUS")
            .map(EventStatus::from_ics_str)
            .unwrap_or_default();
        if status != EventStatus::Cancelled {
            continue;
        }

        match normalize_datetime(&anchor.value, anchor.param("TZID")) {
            Ok(instant) => {
                cancelled.insert((normalizer.series_base(uid), instant.timestamp()));
            }
            Err(e) => debug!(uid, "skipping override with bad anchor: {e}"),
        }
    }

    if cancelled.is_empty() {
        return events;
    }

    events
        .into_iter()
        .filter(|event| {
            let key = (normalizer.series_base(&event.uid), event.start.timestamp());
            !cancelled.contains(&key)
        })
        .collect()
}

/// Collapse duplicate occurrences by ingest identity.
///
/// Key: series-base UID + start instant. The first occurrence per key wins;
/// later ones are dropped. Runs after suppression, so a suppressed
/// occurrence cannot reappear as a duplicate of itself.
pub fn dedup_ingest(
    events: Vec<CalendarEvent>,
    normalizer: &UidNormalizer,
) -> Vec<CalendarEvent> {
    let mut seen: HashSet<(String, DateTime<Utc>)> = HashSet::new();
    events
        .into_iter()
        .filter(|event| seen.insert((normalizer.series_base(&event.uid), event.start)))
        .collect()
}
