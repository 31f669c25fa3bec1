//! Feed text splitting and property-line tokenizing.
//!
//! Splits raw feed text into per-event line groups and parses each
//! `KEY[;PARAM=...]:VALUE` line into a property map. Continuation-line
//! unfolding is deliberately not performed: a wrapped property value stays
//! split, and the continuation lines (no colon) are dropped.

use std::collections::HashMap;

const BEGIN_EVENT: &str = "BEGIN:VEVENT";
const END_EVENT: &str = "END:VEVENT";

/// One parsed property line: parameters plus the raw value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    pub params: Vec<(String, String)>,
    pub value: String,
}

impl Property {
    /// Look up a parameter value by name, case-insensitively.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Property map for one event record. Last value wins on duplicate keys.
#[derive(Debug, Clone, Default)]
pub struct EventBlock {
    props: HashMap<String, Property>,
}

impl EventBlock {
    pub fn prop(&self, name: &str) -> Option<&Property> {
        self.props.get(name)
    }

    pub fn value(&self, name: &str) -> Option<&str> {
        self.props.get(name).map(|p| p.value.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.props.contains_key(name)
    }

    fn insert_line(&mut self, line: &str) {
        if let Some((name, property)) = parse_property_line(line) {
            self.props.insert(name, property);
        }
    }
}

/// Result of splitting one feed: ordered event blocks plus the
/// calendar-level METHOD property (seen outside any event block).
#[derive(Debug, Clone, Default)]
pub struct FeedBlocks {
    pub method: Option<String>,
    pub blocks: Vec<EventBlock>,
}

/// Split feed text into per-event property maps.
///
/// Line endings are normalized, lines trimmed, blanks dropped. Lines between
/// matched BEGIN/END event markers are buffered in document order; an
/// unterminated block (EOF or another BEGIN before the matching END) is
/// discarded silently.
pub fn extract_blocks(text: &str) -> FeedBlocks {
    let mut feed = FeedBlocks::default();
    let mut current: Option<EventBlock> = None;

    for raw_line in text.replace("\r\n", "\n").lines() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }

        if line.eq_ignore_ascii_case(BEGIN_EVENT) {
            // A BEGIN inside an open block abandons the unterminated buffer
            current = Some(EventBlock::default());
        } else if line.eq_ignore_ascii_case(END_EVENT) {
            if let Some(block) = current.take() {
                feed.blocks.push(block);
            }
        } else if let Some(block) = current.as_mut() {
            block.insert_line(line);
        } else if let Some((name, property)) = parse_property_line(line) {
            if name == "METHOD" {
                feed.method = Some(property.value);
            }
        }
    }

    feed
}

/// Parse one `KEY[;PARAM=...]:VALUE` line. Lines without a colon (including
/// folded continuation lines) yield None.
fn parse_property_line(line: &str) -> Option<(String, Property)> {
    let (key_part, value) = line.split_once(':')?;

    let mut segments = key_part.split(';');
    let name = segments.next()?.trim().to_ascii_uppercase();
    if name.is_empty() {
        return None;
    }

    let params = segments
        .filter_map(|segment| {
            let (key, value) = segment.split_once('=')?;
            Some((
                key.trim().to_ascii_uppercase(),
                value.trim().trim_matches('"').to_string(),
            ))
        })
        .collect();

    Some((
        name,
        Property {
            params,
            value: value.trim().to_string(),
        },
    ))
}
