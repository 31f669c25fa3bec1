//! Recurrence expansion for recurring events.
//!
//! Expands a base event's rule into bounded occurrence instants via the
//! rrule crate, then reconciles exclusion (EXDATE) and addition (RDATE)
//! instants on top of the computed set.

use chrono::{DateTime, Duration, TimeZone, Utc};
use rrule::RRuleSet;
use tracing::warn;

use crate::error::{FeedError, FeedResult};
use crate::event::CalendarEvent;
use crate::feed::block::Property;
use crate::range::QueryRange;
use crate::timezone::normalize_datetime;

/// Open-ended rules are capped this far past the base start.
const UNBOUNDED_HORIZON_DAYS: i64 = 365;

/// Ceiling on generated occurrences per rule.
const OCCURRENCE_CAP: u16 = 1000;

/// Exclusion instants match an occurrence start within this tolerance,
/// absorbing timezone and rounding drift.
const EXDATE_TOLERANCE_SECS: i64 = 60;

/// Expand a recurring base event into its occurrences.
///
/// The rule is anchored at the base start and evaluated over
/// `[max(window.from, base.start), window.to)`, with `base.start + 1 year`
/// standing in when the window has no end. Each occurrence is a clone of the
/// base shifted by the base's fixed duration; generated instances carry a
/// synthetic datetime suffix on their UID while the base occurrence (when
/// in-window) keeps its own. Exclusions are applied before additions, so an
/// addition cannot be cancelled by an unrelated exclusion.
pub fn expand_event(
    base: &CalendarEvent,
    rule: &str,
    exdates: &[DateTime<Utc>],
    rdates: &[DateTime<Utc>],
    window: &QueryRange,
) -> FeedResult<Vec<CalendarEvent>> {
    let duration = base.end - base.start;

    let range_start = match window.from {
        Some(from) if from > base.start => from,
        _ => base.start,
    };
    let range_end = window
        .to
        .unwrap_or(base.start + Duration::days(UNBOUNDED_HORIZON_DAYS));

    let rrule_input = format!(
        "DTSTART:{}\nRRULE:{}",
        base.start.format("%Y%m%dT%H%M%SZ"),
        rule.trim()
    );

    let rrule_set: RRuleSet = rrule_input.parse().map_err(|e| FeedError::RecurrenceRule {
        uid: base.uid.clone(),
        reason: format!("{e}"),
    })?;

    // after/before are exclusive: shift the lower bound by a second to keep
    // the window half-open [range_start, range_end)
    let tz: rrule::Tz = Utc.into();
    let after = (range_start - Duration::seconds(1)).with_timezone(&tz);
    let before = range_end.with_timezone(&tz);

    let result = rrule_set.after(after).before(before).all(OCCURRENCE_CAP);
    if result.limited {
        warn!(
            uid = base.uid.as_str(),
            cap = OCCURRENCE_CAP,
            "recurrence expansion hit the occurrence ceiling"
        );
    }

    let mut occurrences: Vec<DateTime<Utc>> = result
        .dates
        .iter()
        .map(|dt| dt.with_timezone(&Utc))
        .collect();

    // Exclusions first
    occurrences.retain(|occ| {
        !exdates
            .iter()
            .any(|ex| (*occ - *ex).num_seconds().abs() <= EXDATE_TOLERANCE_SECS)
    });

    let mut events: Vec<CalendarEvent> = occurrences
        .into_iter()
        .map(|start| occurrence_of(base, start, duration))
        .collect();

    // Then additions, window-filtered on overlap
    for &added in rdates {
        let added_end = added + duration;
        let overlaps_from = window.from.map_or(true, |from| added_end > from);
        let overlaps_to = window.to.map_or(true, |to| added < to);
        if overlaps_from && overlaps_to {
            events.push(occurrence_of(base, added, duration));
        }
    }

    events.sort_by_key(|event| event.start);
    Ok(events)
}

/// Clone the base for one occurrence. Instances other than the base start
/// get a synthetic datetime suffix so series identity survives dedup.
fn occurrence_of(base: &CalendarEvent, start: DateTime<Utc>, duration: Duration) -> CalendarEvent {
    let uid = if start == base.start {
        base.uid.clone()
    } else {
        format!("{}-{}", base.uid, start.format("%Y%m%dT%H%M%SZ"))
    };

    CalendarEvent {
        uid,
        start,
        end: start + duration,
        ..base.clone()
    }
}

/// Parse a comma-separated EXDATE/RDATE value into UTC instants, sharing the
/// property's TZID qualifier across all values. Unparseable entries are
/// skipped.
pub fn parse_instant_list(prop: &Property) -> Vec<DateTime<Utc>> {
    let tzid = prop.param("TZID");
    prop.value
        .split(',')
        .filter_map(|token| {
            let token = token.trim();
            if token.is_empty() {
                return None;
            }
            normalize_datetime(token, tzid).ok()
        })
        .collect()
}
