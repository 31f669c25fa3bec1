//! Advisory feed-URL validation, performed before any external fetch.

use serde::{Deserialize, Serialize};

/// Verdict of [`validate_feed_url`]. Advisory only: a valid-looking URL can
/// still 404, and an odd-looking one can still serve a feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrlValidation {
    pub is_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl UrlValidation {
    fn ok() -> Self {
        UrlValidation {
            is_valid: true,
            error: None,
        }
    }

    fn invalid(reason: &str) -> Self {
        UrlValidation {
            is_valid: false,
            error: Some(reason.to_string()),
        }
    }
}

/// Check that a URL uses http/https and plausibly names a calendar endpoint.
pub fn validate_feed_url(url: &str) -> UrlValidation {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return UrlValidation::invalid("URL is empty");
    }

    let lower = trimmed.to_lowercase();
    let rest = if let Some(rest) = lower.strip_prefix("https://") {
        rest
    } else if let Some(rest) = lower.strip_prefix("http://") {
        rest
    } else {
        return UrlValidation::invalid("URL must use http or https");
    };

    if rest.is_empty() || rest.starts_with('/') {
        return UrlValidation::invalid("URL has no host");
    }

    let looks_like_calendar = lower.contains(".ics")
        || lower.contains("calendar")
        || lower.contains("ical")
        || lower.contains("webcal")
        || lower.contains("feed");
    if !looks_like_calendar {
        return UrlValidation::invalid("URL does not look like a calendar feed endpoint");
    }

    UrlValidation::ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_ics_url() {
        assert!(validate_feed_url("https://example.com/team.ics").is_valid);
    }

    #[test]
    fn test_accepts_calendar_path() {
        assert!(validate_feed_url("https://calendar.google.com/calendar/ical/abc/basic").is_valid);
    }

    #[test]
    fn test_rejects_non_http_scheme() {
        let verdict = validate_feed_url("ftp://example.com/cal.ics");
        assert!(!verdict.is_valid);
        assert!(verdict.error.unwrap().contains("http"));
    }

    #[test]
    fn test_rejects_missing_host() {
        assert!(!validate_feed_url("https:///cal.ics").is_valid);
    }

    #[test]
    fn test_rejects_implausible_endpoint() {
        assert!(!validate_feed_url("https://example.com/index.html").is_valid);
    }

    #[test]
    fn test_rejects_empty() {
        assert!(!validate_feed_url("   ").is_valid);
    }
}
