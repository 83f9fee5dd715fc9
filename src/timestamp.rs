//! Timestamp parsing and formatting for catalog headers and remote stats.
//!
//! Catalog headers carry gettext style dates (`2021-10-21 14:30+0000`) or the
//! longer form this crate writes back (`2021-10-21 14:30:00+00:00`). The
//! translation service reports RFC 3339 (`2021-10-21T14:30:00Z`). All of them
//! parse into the same [`Timestamp`], and comparisons are by instant.

use chrono::{DateTime, FixedOffset};

/// A point in time with the offset it was written with.
pub type Timestamp = DateTime<FixedOffset>;

const FALLBACK_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M%:z",
    "%Y-%m-%d %H:%M%z",
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%dT%H:%M%z",
];

/// Parse a timestamp, returning `None` for anything unparsable.
///
/// Unparsable values are treated exactly like absent ones by the date
/// reconciler, so no error is surfaced here.
pub fn parse_timestamp(value: &str) -> Option<Timestamp> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed);
    }

    let normalized = match value.strip_suffix('Z').or_else(|| value.strip_suffix('z')) {
        Some(stripped) => format!("{}+00:00", stripped),
        None => value.to_string(),
    };
    FALLBACK_FORMATS
        .iter()
        .find_map(|format| DateTime::parse_from_str(&normalized, format).ok())
}

/// Format a timestamp for a catalog header.
///
/// The fractional part is only written when present, and always parses back
/// to an equal instant.
pub fn format_timestamp(timestamp: &Timestamp) -> String {
    timestamp.format("%Y-%m-%d %H:%M:%S%.f%:z").to_string()
}
