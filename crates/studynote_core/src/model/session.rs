//! Study session model and duration arithmetic.
//!
//! # Responsibility
//! - Represent one closed study interval as a pair of ISO-8601 strings.
//! - Convert interval bounds into elapsed seconds for aggregation.
//!
//! # Invariants
//! - Only closed sessions (both bounds set) are ever stored on a note.
//! - Bounds are stored as text and parsed lazily; malformed text is kept
//!   as-is on disk and only reported when a duration is requested.
//! - Durations are `end - start` without clamping, so inverted bounds yield a
//!   negative value.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Error for session bounds that are not valid timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimestampError {
    pub value: String,
}

impl Display for TimestampError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "malformed session timestamp: `{}`", self.value)
    }
}

impl Error for TimestampError {}

/// One completed study interval on a note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudySession {
    /// Interval start, ISO-8601 text.
    pub start: String,
    /// Interval end, ISO-8601 text. Written after `start`.
    pub end: String,
}

impl StudySession {
    /// Builds a closed session from two instants.
    pub fn closed(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start: format_timestamp(start),
            end: format_timestamp(end),
        }
    }

    /// Returns `end - start` in (fractional) seconds.
    ///
    /// # Errors
    /// - Returns `TimestampError` when either bound fails to parse.
    pub fn duration_seconds(&self) -> Result<f64, TimestampError> {
        let start = parse_timestamp(&self.start)?;
        let end = parse_timestamp(&self.end)?;
        let millis = end.timestamp_millis() - start.timestamp_millis();
        Ok(millis as f64 / 1000.0)
    }
}

/// Sums durations across sessions.
///
/// A malformed session poisons the sum with `NaN`, matching how the stored
/// history has always been totalled.
pub fn total_seconds(sessions: &[StudySession]) -> f64 {
    sessions
        .iter()
        .map(|session| session.duration_seconds().unwrap_or(f64::NAN))
        .sum()
}

/// Rounds seconds to whole minutes for display (half rounds up).
pub fn study_minutes(seconds: f64) -> f64 {
    (seconds / 60.0 + 0.5).floor()
}

/// Formats an instant as `YYYY-MM-DDTHH:MM:SS.mmmZ`.
pub fn format_timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Date-time layouts accepted without an offset, longest first.
const NAIVE_LAYOUTS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Parses an ISO-8601 session bound.
///
/// Accepted forms:
/// - RFC 3339 with any offset, seconds optional (`2024-01-01T10:00Z`).
/// - Date-time without an offset, read as local wall-clock time.
/// - Bare `YYYY-MM-DD`, read as UTC midnight.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, TimestampError> {
    let trimmed = value.trim();
    let malformed = || TimestampError {
        value: value.to_string(),
    };

    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(parsed.with_timezone(&Utc));
    }
    if let Ok(parsed) = DateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M%:z") {
        return Ok(parsed.with_timezone(&Utc));
    }
    if let Some(naive) = trimmed.strip_suffix(['Z', 'z']).and_then(parse_naive) {
        return Ok(naive.and_utc());
    }
    if let Some(naive) = parse_naive(trimmed) {
        // Skipped local times (DST gaps) have no instant and stay malformed.
        return Local
            .from_local_datetime(&naive)
            .earliest()
            .map(|local| local.with_timezone(&Utc))
            .ok_or_else(malformed);
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(malformed)
}

fn parse_naive(value: &str) -> Option<NaiveDateTime> {
    NAIVE_LAYOUTS
        .iter()
        .find_map(|layout| NaiveDateTime::parse_from_str(value, layout).ok())
}
