//! Datetime normalization for feed datetime tokens.
//!
//! Converts one ICS-style datetime token (UTC-suffixed, TZID-qualified, or
//! floating) into an absolute UTC instant. TZID values are resolved through a
//! static legacy-name table covering the vendor "Standard/Daylight Time"
//! spellings before falling back to IANA lookup; names that resolve to
//! neither degrade to a hardcoded offset table and finally to a default
//! business zone rather than failing the whole record.

use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use tracing::debug;

use crate::error::{FeedError, FeedResult};

/// Zone used when a TZID cannot be resolved at all.
pub(crate) const DEFAULT_ZONE: Tz = Tz::America__New_York;

/// Legacy vendor timezone names mapped to IANA zone ids.
///
/// Covers the common "Standard Time" / "Daylight Time" spellings emitted by
/// Exchange-family producers across Africa, the Americas, Europe, Asia, and
/// the Pacific. The daylight spellings map to the same zone as their standard
/// counterpart; the zone database supplies the actual seasonal offset.
static LEGACY_ZONE_NAMES: &[(&str, &str)] = &[
    // UTC
    ("UTC", "UTC"),
    ("Coordinated Universal Time", "UTC"),
    ("Greenwich Mean Time", "UTC"),
    // Africa
    ("Morocco Standard Time", "Africa/Casablanca"),
    ("W. Central Africa Standard Time", "Africa/Lagos"),
    ("Egypt Standard Time", "Africa/Cairo"),
    ("South Africa Standard Time", "Africa/Johannesburg"),
    ("E. Africa Standard Time", "Africa/Nairobi"),
    ("Namibia Standard Time", "Africa/Windhoek"),
    // Americas
    ("Hawaiian Standard Time", "Pacific/Honolulu"),
    ("Alaskan Standard Time", "America/Anchorage"),
    ("Pacific Standard Time", "America/Los_Angeles"),
    ("Pacific Daylight Time", "America/Los_Angeles"),
    ("US Mountain Standard Time", "America/Phoenix"),
    ("Mountain Standard Time", "America/Denver"),
    ("Mountain Daylight Time", "America/Denver"),
    ("Central America Standard Time", "America/Guatemala"),
    ("Central Standard Time", "America/Chicago"),
    ("Central Daylight Time", "America/Chicago"),
    ("Canada Central Standard Time", "America/Regina"),
    ("SA Pacific Standard Time", "America/Bogota"),
    ("Eastern Standard Time", "America/New_York"),
    ("Eastern Daylight Time", "America/New_York"),
    ("US Eastern Standard Time", "America/Indiana/Indianapolis"),
    ("Venezuela Standard Time", "America/Caracas"),
    ("Atlantic Standard Time", "America/Halifax"),
    ("SA Western Standard Time", "America/La_Paz"),
    ("Newfoundland Standard Time", "America/St_Johns"),
    ("E. South America Standard Time", "America/Sao_Paulo"),
    ("Argentina Standard Time", "America/Argentina/Buenos_Aires"),
    ("SA Eastern Standard Time", "America/Cayenne"),
    ("Montevideo Standard Time", "America/Montevideo"),
    ("Greenland Standard Time", "America/Godthab"),
    // Atlantic
    ("Azores Standard Time", "Atlantic/Azores"),
    ("Cape Verde Standard Time", "Atlantic/Cape_Verde"),
    ("Greenwich Standard Time", "Atlantic/Reykjavik"),
    // Europe
    ("GMT Standard Time", "Europe/London"),
    ("W. Europe Standard Time", "Europe/Berlin"),
    ("Central Europe Standard Time", "Europe/Budapest"),
    ("Central European Standard Time", "Europe/Warsaw"),
    ("Romance Standard Time", "Europe/Paris"),
    ("E. Europe Standard Time", "Europe/Chisinau"),
    ("FLE Standard Time", "Europe/Helsinki"),
    ("GTB Standard Time", "Europe/Bucharest"),
    ("Turkey Standard Time", "Europe/Istanbul"),
    ("Belarus Standard Time", "Europe/Minsk"),
    ("Russian Standard Time", "Europe/Moscow"),
    // Middle East / Asia
    ("Israel Standard Time", "Asia/Jerusalem"),
    ("Arabic Standard Time", "Asia/Baghdad"),
    ("Arab Standard Time", "Asia/Riyadh"),
    ("Arabian Standard Time", "Asia/Dubai"),
    ("Iran Standard Time", "Asia/Tehran"),
    ("Caucasus Standard Time", "Asia/Yerevan"),
    ("Azerbaijan Standard Time", "Asia/Baku"),
    ("Georgian Standard Time", "Asia/Tbilisi"),
    ("Afghanistan Standard Time", "Asia/Kabul"),
    ("West Asia Standard Time", "Asia/Tashkent"),
    ("Pakistan Standard Time", "Asia/Karachi"),
    ("India Standard Time", "Asia/Kolkata"),
    ("Sri Lanka Standard Time", "Asia/Colombo"),
    ("Nepal Standard Time", "Asia/Kathmandu"),
    ("Central Asia Standard Time", "Asia/Almaty"),
    ("Bangladesh Standard Time", "Asia/Dhaka"),
    ("Myanmar Standard Time", "Asia/Yangon"),
    ("SE Asia Standard Time", "Asia/Bangkok"),
    ("North Asia Standard Time", "Asia/Krasnoyarsk"),
    ("China Standard Time", "Asia/Shanghai"),
    ("Singapore Standard Time", "Asia/Singapore"),
    ("Taipei Standard Time", "Asia/Taipei"),
    ("North Asia East Standard Time", "Asia/Irkutsk"),
    ("Tokyo Standard Time", "Asia/Tokyo"),
    ("Korea Standard Time", "Asia/Seoul"),
    ("Yakutsk Standard Time", "Asia/Yakutsk"),
    ("Vladivostok Standard Time", "Asia/Vladivostok"),
    ("Magadan Standard Time", "Asia/Magadan"),
    // Australia / Pacific
    ("W. Australia Standard Time", "Australia/Perth"),
    ("AUS Central Standard Time", "Australia/Darwin"),
    ("Cen. Australia Standard Time", "Australia/Adelaide"),
    ("AUS Eastern Standard Time", "Australia/Sydney"),
    ("E. Australia Standard Time", "Australia/Brisbane"),
    ("Tasmania Standard Time", "Australia/Hobart"),
    ("West Pacific Standard Time", "Pacific/Port_Moresby"),
    ("Central Pacific Standard Time", "Pacific/Guadalcanal"),
    ("Fiji Standard Time", "Pacific/Fiji"),
    ("New Zealand Standard Time", "Pacific/Auckland"),
    ("Tonga Standard Time", "Pacific/Tongatapu"),
    ("Samoa Standard Time", "Pacific/Apia"),
];

/// Standard-time offsets in minutes for the fallback path, with a flag for
/// whether the zone observes daylight saving. Only consulted when a name
/// resolves neither through the legacy table nor as an IANA id.
static FALLBACK_OFFSETS: &[(&str, i32, bool)] = &[
    ("Hawaiian Standard Time", -600, false),
    ("Alaskan Standard Time", -540, true),
    ("Pacific Standard Time", -480, true),
    ("Mountain Standard Time", -420, true),
    ("Central Standard Time", -360, true),
    ("Eastern Standard Time", -300, true),
    ("Atlantic Standard Time", -240, true),
    ("GMT Standard Time", 0, true),
    ("W. Europe Standard Time", 60, true),
    ("Central Europe Standard Time", 60, true),
    ("Romance Standard Time", 60, true),
    ("FLE Standard Time", 120, true),
    ("Russian Standard Time", 180, false),
    ("Arabian Standard Time", 240, false),
    ("India Standard Time", 330, false),
    ("SE Asia Standard Time", 420, false),
    ("China Standard Time", 480, false),
    ("Tokyo Standard Time", 540, false),
    ("AUS Eastern Standard Time", 600, false),
    ("New Zealand Standard Time", 720, false),
];

/// Convert one datetime token into a UTC instant.
///
/// Handles the three shapes a feed can carry:
/// - `20240115T170000Z` — UTC-suffixed
/// - `20240115T090000` with a TZID — zone-qualified wall clock
/// - `20240115T090000` with no TZID — floating, host-local wall clock
///
/// An 8-digit value is an all-day date at midnight.
pub fn normalize_datetime(value: &str, tzid: Option<&str>) -> FeedResult<DateTime<Utc>> {
    let token = value.trim();

    // All-day date: midnight in the qualifying zone, or local when floating
    if token.len() == 8 && token.bytes().all(|b| b.is_ascii_digit()) {
        let date = NaiveDate::parse_from_str(token, "%Y%m%d")
            .map_err(|_| FeedError::UnparseableDateTime(value.to_string()))?;
        let midnight = date.and_hms_opt(0, 0, 0).unwrap_or_default();
        return Ok(match tzid {
            Some(id) => zone_wall_to_utc(id, midnight),
            None => wall_to_utc(&chrono::Local, midnight),
        });
    }

    if let Some(stripped) = token.strip_suffix('Z') {
        let naive = NaiveDateTime::parse_from_str(stripped, "%Y%m%dT%H%M%S")
            .map_err(|_| FeedError::UnparseableDateTime(value.to_string()))?;
        return Ok(naive.and_utc());
    }

    let naive = NaiveDateTime::parse_from_str(token, "%Y%m%dT%H%M%S")
        .map_err(|_| FeedError::UnparseableDateTime(value.to_string()))?;

    Ok(match tzid {
        Some(id) => zone_wall_to_utc(id, naive),
        None => wall_to_utc(&chrono::Local, naive),
    })
}

/// Resolve a TZID to an IANA zone: legacy table first, then direct parse.
pub(crate) fn resolve_zone(tzid: &str) -> Option<Tz> {
    let stripped = strip_vendor_prefix(tzid);

    if let Some(iana) = lookup_legacy(stripped) {
        return iana.parse().ok();
    }

    if let Ok(tz) = stripped.parse::<Tz>() {
        return Some(tz);
    }

    // Some producers prepend an extra path segment (e.g. a tzdata version);
    // retry on the remainder after the first slash.
    stripped
        .split_once('/')
        .and_then(|(_, rest)| rest.parse::<Tz>().ok())
}

fn strip_vendor_prefix(tzid: &str) -> &str {
    tzid.strip_prefix("/mozilla.org/")
        .or_else(|| tzid.strip_prefix("/softwarestudio.org/"))
        .unwrap_or(tzid)
}

fn lookup_legacy(name: &str) -> Option<&'static str> {
    LEGACY_ZONE_NAMES
        .iter()
        .find(|(legacy, _)| legacy.eq_ignore_ascii_case(name))
        .map(|(_, iana)| *iana)
}

/// Convert a zone-qualified wall-clock time to UTC, degrading through the
/// offset table and finally the default zone when the TZID is unresolvable.
fn zone_wall_to_utc(tzid: &str, naive: NaiveDateTime) -> DateTime<Utc> {
    if let Some(tz) = resolve_zone(tzid) {
        return wall_to_utc(&tz, naive);
    }

    if let Some(instant) = fallback_offset_to_utc(tzid, naive) {
        debug!(tzid, "TZID resolved via hardcoded offset table");
        return instant;
    }

    debug!(tzid, "unresolvable TZID, defaulting to {}", DEFAULT_ZONE);
    wall_to_utc(&DEFAULT_ZONE, naive)
}

/// Apply a hardcoded standard offset with a coarse month-range DST heuristic
/// (April through October counts as daylight time).
fn fallback_offset_to_utc(tzid: &str, naive: NaiveDateTime) -> Option<DateTime<Utc>> {
    let (_, std_offset, observes_dst) = FALLBACK_OFFSETS
        .iter()
        .find(|(name, _, _)| name.eq_ignore_ascii_case(tzid))?;

    let month = chrono::Datelike::month(&naive);
    let dst_shift = if *observes_dst && (4..=10).contains(&month) {
        60
    } else {
        0
    };

    let offset_minutes = std_offset + dst_shift;
    Some((naive - Duration::minutes(i64::from(offset_minutes))).and_utc())
}

/// Convert a wall-clock time in `zone` to UTC.
///
/// Ambiguous times (DST fold) take the earlier instant per RFC 5545;
/// non-existent times (DST gap) shift forward one hour.
fn wall_to_utc<Z: TimeZone>(zone: &Z, naive: NaiveDateTime) -> DateTime<Utc> {
    match zone.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt.with_timezone(&Utc),
        LocalResult::Ambiguous(earlier, _) => earlier.with_timezone(&Utc),
        LocalResult::None => {
            let shifted = naive + Duration::hours(1);
            match zone.from_local_datetime(&shifted) {
                LocalResult::Single(dt) => dt.with_timezone(&Utc),
                LocalResult::Ambiguous(earlier, _) => earlier.with_timezone(&Utc),
                LocalResult::None => naive.and_utc(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_utc_suffixed_token() {
        let instant = normalize_datetime("20240115T170000Z", None).unwrap();
        assert_eq!(instant, Utc.with_ymd_and_hms(2024, 1, 15, 17, 0, 0).unwrap());
    }

    #[test]
    fn test_pacific_standard_time_winter() {
        // 9:00 AM Pacific on Jan 15 is UTC-8
        let instant =
            normalize_datetime("20240115T090000", Some("Pacific Standard Time")).unwrap();
        assert_eq!(instant, Utc.with_ymd_and_hms(2024, 1, 15, 17, 0, 0).unwrap());
    }

    #[test]
    fn test_pacific_standard_time_summer_honors_dst() {
        // The legacy name still resolves to America/Los_Angeles, which is
        // UTC-7 in July
        let instant =
            normalize_datetime("20240715T090000", Some("Pacific Standard Time")).unwrap();
        assert_eq!(instant, Utc.with_ymd_and_hms(2024, 7, 15, 16, 0, 0).unwrap());
    }

    #[test]
    fn test_iana_tzid_passthrough() {
        let instant =
            normalize_datetime("20240115T100000", Some("America/New_York")).unwrap();
        assert_eq!(instant, Utc.with_ymd_and_hms(2024, 1, 15, 15, 0, 0).unwrap());
    }

    #[test]
    fn test_floating_token_uses_local_wall_clock() {
        let instant = normalize_datetime("20240115T090000", None).unwrap();
        let expected = chrono::Local
            .with_ymd_and_hms(2024, 1, 15, 9, 0, 0)
            .earliest()
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(instant, expected);
    }

    #[test]
    fn test_all_day_date_is_midnight() {
        let instant = normalize_datetime("20240115", Some("UTC")).unwrap();
        assert_eq!(instant, Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_unresolvable_tzid_defaults_to_business_zone() {
        // January in America/New_York is UTC-5
        let instant =
            normalize_datetime("20240115T090000", Some("Atlantis Standard Time")).unwrap();
        assert_eq!(instant, Utc.with_ymd_and_hms(2024, 1, 15, 14, 0, 0).unwrap());
    }

    #[test]
    fn test_garbage_token_is_an_error() {
        assert!(normalize_datetime("not-a-date", None).is_err());
        assert!(normalize_datetime("2024-01-15T09:00:00", None).is_err());
    }

    #[test]
    fn test_mozilla_prefix_stripped() {
        assert_eq!(
            resolve_zone("/mozilla.org/America/New_York"),
            Some(Tz::America__New_York)
        );
    }

    #[test]
    fn test_legacy_lookup_is_case_insensitive() {
        assert_eq!(resolve_zone("pacific standard time"), Some(Tz::America__Los_Angeles));
    }

    #[test]
    fn test_fallback_offset_heuristic() {
        // Exercise the offset table directly: standard offset in January...
        let winter = NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let instant = fallback_offset_to_utc("Eastern Standard Time", winter).unwrap();
        assert_eq!(instant, Utc.with_ymd_and_hms(2024, 1, 15, 14, 0, 0).unwrap());

        // ...and the +1h daylight shift for in-range months
        let summer = NaiveDate::from_ymd_opt(2024, 7, 15)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let instant = fallback_offset_to_utc("Eastern Standard Time", summer).unwrap();
        assert_eq!(instant, Utc.with_ymd_and_hms(2024, 7, 15, 13, 0, 0).unwrap());
    }

    #[test]
    fn test_dst_gap_shifts_forward() {
        // 2:30 AM on 2024-03-10 does not exist in America/New_York
        let instant =
            normalize_datetime("20240310T023000", Some("America/New_York")).unwrap();
        let expected = Utc.with_ymd_and_hms(2024, 3, 10, 7, 30, 0).unwrap();
        assert_eq!(instant, expected);
    }
}
