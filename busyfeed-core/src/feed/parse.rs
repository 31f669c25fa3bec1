//! Event field parsing and the top-level feed pipeline.
//!
//! Turns each extracted block into zero or more normalized events, then runs
//! the cross-block passes (RECURRENCE-ID suppression, ingest dedup). Failures
//! are isolated per block: one bad record becomes a string in `errors` and
//! never aborts the rest of the feed.

use chrono::Duration;
use tracing::debug;

use crate::dedup::{dedup_ingest, suppress_cancelled_overrides, UidNormalizer};
use crate::error::FeedError;
use crate::event::{CalendarEvent, EventStatus, ParsedFeed, Transparency};
use crate::feed::block::{extract_blocks, EventBlock};
use crate::range::QueryRange;
use crate::recurrence::{expand_event, parse_instant_list};
use crate::timezone::normalize_datetime;

/// Parse feed text into normalized UTC events plus advisory errors.
///
/// The window bounds recurrence expansion; it does not filter standalone
/// events. Pass [`QueryRange::unbounded`] when no window applies.
pub fn parse_feed(text: &str, window: &QueryRange) -> ParsedFeed {
    let feed = extract_blocks(text);
    let feed_cancelled = feed
        .method
        .as_deref()
        .is_some_and(|m| m.eq_ignore_ascii_case("CANCEL"));

    let mut events = Vec::new();
    let mut errors = Vec::new();
    for block in &feed.blocks {
        parse_block(block, feed_cancelled, window, &mut events, &mut errors);
    }

    let normalizer = UidNormalizer::default();
    let events = suppress_cancelled_overrides(events, &feed.blocks, &normalizer);
    let events = dedup_ingest(events, &normalizer);

    debug!(
        events = events.len(),
        errors = errors.len(),
        "parsed calendar feed"
    );
    ParsedFeed { events, errors }
}

fn parse_block(
    block: &EventBlock,
    feed_cancelled: bool,
    window: &QueryRange,
    events: &mut Vec<CalendarEvent>,
    errors: &mut Vec<String>,
) {
    // UID and DTSTART are required; a block missing either yields nothing,
    // and that is not an error
    let Some(uid) = block.value("UID") else {
        return;
    };
    let Some(start_prop) = block.prop("DTSTART") else {
        return;
    };

    let status = block
        .value("STATUS")
        .map(EventStatus::from_ics_str)
        .unwrap_or_default();
    let block_cancelled = block
        .value("METHOD")
        .is_some_and(|m| m.eq_ignore_ascii_case("CANCEL"));
    if status == EventStatus::Cancelled || block_cancelled || feed_cancelled {
        return;
    }

    let start = match normalize_datetime(&start_prop.value, start_prop.param("TZID")) {
        Ok(start) => start,
        Err(_) => {
            errors.push(
                FeedError::EventDateTime {
                    uid: uid.to_string(),
                    value: start_prop.value.clone(),
                }
                .to_string(),
            );
            return;
        }
    };

    let end_prop = block.prop("DTEND");
    let end = match end_prop {
        Some(prop) => match normalize_datetime(&prop.value, prop.param("TZID")) {
            // Clamp so start <= end always holds
            Ok(end) => end.max(start),
            Err(_) => {
                errors.push(
                    FeedError::EventDateTime {
                        uid: uid.to_string(),
                        value: prop.value.clone(),
                    }
                    .to_string(),
                );
                return;
            }
        },
        None => start + Duration::hours(1),
    };

    let transparency = block
        .value("TRANSP")
        .map(Transparency::from_ics_str)
        .unwrap_or_default();

    let base = CalendarEvent {
        uid: uid.to_string(),
        summary: block
            .value("SUMMARY")
            .unwrap_or("(No title)")
            .to_string(),
        start,
        end,
        status,
        transparency,
        raw_start: Some(start_prop.value.clone()),
        raw_end: end_prop.map(|prop| prop.value.clone()),
    };

    let Some(rule) = block.value("RRULE") else {
        events.push(base);
        return;
    };

    let exdates = block
        .prop("EXDATE")
        .map(parse_instant_list)
        .unwrap_or_default();
    let rdates = block
        .prop("RDATE")
        .map(parse_instant_list)
        .unwrap_or_default();

    match expand_event(&base, rule, &exdates, &rdates, window) {
        Ok(mut occurrences) => events.append(&mut occurrences),
        Err(e) => {
            // A broken rule degrades to the base occurrence, not a lost block
            errors.push(e.to_string());
            if window.contains(base.start) {
                events.push(base);
            }
        }
    }
}
