//! Busy-time projection for a query window.
//!
//! The final, consumer-facing pass: collapses events that describe the same
//! real meeting across providers (identical start and end, regardless of
//! UID), then keeps only the ones that actually block time.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::event::{BusyInterval, CalendarEvent, EventStatus, Transparency};

/// Project the busy intervals for `[from, to)` out of a final event list.
///
/// Events are first grouped by (start, end): distinct providers can emit
/// structurally different records for the same meeting, so UID is ignored
/// here. Conflicts resolve OPAQUE over TRANSPARENT, then CONFIRMED over any
/// other status, then first-seen. The surviving representative is busy when
/// it is opaque, not cancelled, not tentative by status or by a "tentative"
/// summary, and overlaps the window; an opaque, in-window event whose
/// summary mentions "busy" counts even outside CONFIRMED status.
pub fn extract_busy_times(
    events: &[CalendarEvent],
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Vec<BusyInterval> {
    let mut representatives: HashMap<(DateTime<Utc>, DateTime<Utc>), &CalendarEvent> =
        HashMap::new();

    for event in events {
        match representatives.entry((event.start, event.end)) {
            Entry::Vacant(slot) => {
                slot.insert(event);
            }
            Entry::Occupied(mut slot) => {
                if beats(event, slot.get()) {
                    slot.insert(event);
                }
            }
        }
    }

    let mut intervals: Vec<BusyInterval> = representatives
        .into_values()
        .filter(|event| is_busy(event, from, to))
        .map(|event| BusyInterval {
            start: event.start,
            end: event.end,
        })
        .collect();

    intervals.sort_by_key(|interval| (interval.start, interval.end));
    intervals
}

/// Conflict resolution between two events sharing (start, end):
/// OPAQUE > TRANSPARENT, then CONFIRMED > other, then first-seen.
fn beats(candidate: &CalendarEvent, incumbent: &CalendarEvent) -> bool {
    if candidate.transparency != incumbent.transparency {
        return candidate.transparency == Transparency::Opaque;
    }
    if (candidate.status == EventStatus::Confirmed) != (incumbent.status == EventStatus::Confirmed)
    {
        return candidate.status == EventStatus::Confirmed;
    }
    false
}

fn is_busy(event: &CalendarEvent, from: DateTime<Utc>, to: DateTime<Utc>) -> bool {
    if event.status == EventStatus::Cancelled
        || event.transparency != Transparency::Opaque
        || !event.overlaps(from, to)
    {
        return false;
    }

    let summary = event.summary.to_lowercase();
    if summary.contains("tentative") {
        return false;
    }

    match event.status {
        EventStatus::Confirmed => true,
        // A summary that says "busy" blocks time even without CONFIRMED
        _ => summary.contains("busy"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn event(
        uid: &str,
        summary: &str,
        status: EventStatus,
        transparency: Transparency,
    ) -> CalendarEvent {
        CalendarEvent {
            uid: uid.to_string(),
            summary: summary.to_string(),
            start: Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap(),
            status,
            transparency,
            raw_start: None,
            raw_end: None,
        }
    }

    fn window() -> (DateTime<Utc>, DateTime<Utc>) {
        (
            Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 16, 0, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_opaque_confirmed_beats_transparent_tentative() {
        let events = vec![
            event(
                "provider-b",
                "Team sync",
                EventStatus::Tentative,
                Transparency::Transparent,
            ),
            event(
                "provider-a",
                "Team sync",
                EventStatus::Confirmed,
                Transparency::Opaque,
            ),
        ];

        let (from, to) = window();
        let intervals = extract_busy_times(&events, from, to);
        assert_eq!(intervals.len(), 1);
    }

    #[test]
    fn test_transparent_event_is_not_busy() {
        let events = vec![event(
            "a",
            "OOO note",
            EventStatus::Confirmed,
            Transparency::Transparent,
        )];
        let (from, to) = window();
        assert!(extract_busy_times(&events, from, to).is_empty());
    }

    #[test]
    fn test_tentative_status_is_not_busy() {
        let events = vec![event(
            "a",
            "Maybe lunch",
            EventStatus::Tentative,
            Transparency::Opaque,
        )];
        let (from, to) = window();
        assert!(extract_busy_times(&events, from, to).is_empty());
    }

    #[test]
    fn test_tentative_summary_is_not_busy() {
        let events = vec![event(
            "a",
            "Tentative: planning session",
            EventStatus::Confirmed,
            Transparency::Opaque,
        )];
        let (from, to) = window();
        assert!(extract_busy_times(&events, from, to).is_empty());
    }

    #[test]
    fn test_busy_summary_counts_outside_confirmed() {
        let events = vec![event(
            "a",
            "Busy - focus block",
            EventStatus::Tentative,
            Transparency::Opaque,
        )];
        let (from, to) = window();
        assert_eq!(extract_busy_times(&events, from, to).len(), 1);
    }

    #[test]
    fn test_cancelled_never_busy() {
        let events = vec![event(
            "a",
            "busy anyway",
            EventStatus::Cancelled,
            Transparency::Opaque,
        )];
        let (from, to) = window();
        assert!(extract_busy_times(&events, from, to).is_empty());
    }

    #[test]
    fn test_out_of_window_excluded() {
        let events = vec![event(
            "a",
            "Standup",
            EventStatus::Confirmed,
            Transparency::Opaque,
        )];
        let from = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        let to = Utc.with_ymd_and_hms(2024, 2, 2, 0, 0, 0).unwrap();
        assert!(extract_busy_times(&events, from, to).is_empty());
    }

    #[test]
    fn test_intervals_sorted_by_start() {
        let mut later = event("b", "Two", EventStatus::Confirmed, Transparency::Opaque);
        later.start = Utc.with_ymd_and_hms(2024, 1, 15, 14, 0, 0).unwrap();
        later.end = Utc.with_ymd_and_hms(2024, 1, 15, 15, 0, 0).unwrap();
        let earlier = event("a", "One", EventStatus::Confirmed, Transparency::Opaque);

        let (from, to) = window();
        let intervals = extract_busy_times(&[later, earlier], from, to);
        assert_eq!(intervals.len(), 2);
        assert!(intervals[0].start < intervals[1].start);
    }

    #[test]
    fn test_first_seen_wins_among_equals() {
        let first = event("a", "First", EventStatus::Confirmed, Transparency::Opaque);
        let second = event("b", "Second", EventStatus::Confirmed, Transparency::Opaque);

        let (from, to) = window();
        // Identical (start, end) and equal rank: one interval out
        let intervals = extract_busy_times(&[first, second], from, to);
        assert_eq!(intervals.len(), 1);
    }
}
