//! Instant parsing and time-history strings
//!
//! Timestamps reach the record from several generations of the pipeline: new
//! writers store ISO-8601 instants, old writers stored raw epoch-millisecond
//! digit strings. The parser here accepts both and treats anything else as
//! the epoch, so a corrupt value can never abort a pipeline stage.

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};

/// The instant used as "absent" for every timestamp field
pub fn epoch() -> DateTime<Utc> {
    Utc.timestamp_millis_opt(0).unwrap()
}

/// The scheduling sentinel for records that are never fetched
pub fn doomsday() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(3000, 1, 1, 0, 0, 0).unwrap()
}

/// Formats an instant in the canonical form written to metadata
pub fn format_instant(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parses a stored instant, accepting both legacy encodings
///
/// * A pure digit string is an epoch-millisecond value (old writers)
/// * Anything else is tried as an ISO-8601 instant
/// * A malformed string yields `default`
pub fn parse_instant(s: &str, default: DateTime<Utc>) -> DateTime<Utc> {
    if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
        return s
            .parse::<i64>()
            .ok()
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
            .unwrap_or(default);
    }

    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .unwrap_or(default)
}

/// Appends an instant to a comma-joined time-history string
///
/// The history keeps the `cap` most recent instants, newest last; once the
/// cap is exceeded the oldest entries are dropped.
pub fn construct_time_history(history: Option<&str>, time: DateTime<Utc>, cap: usize) -> String {
    let mut entries: Vec<String> = history
        .unwrap_or("")
        .split(',')
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect();

    entries.push(format_instant(time));
    if entries.len() > cap {
        entries.drain(..entries.len() - cap);
    }

    entries.join(",")
}

/// Extracts the oldest instant recorded in a time-history string
///
/// Returns None for an empty history or one whose first entry does not parse
/// to an instant after the epoch.
pub fn first_instant_of_history(history: &str) -> Option<DateTime<Utc>> {
    let first = history.split(',').next().filter(|s| !s.is_empty())?;
    let time = parse_instant(first, epoch());
    (time > epoch()).then_some(time)
}
