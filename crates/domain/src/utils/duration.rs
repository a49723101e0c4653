//! Compact duration parsing
//!
//! Record durations and prep durations are stored as `<N><unit>` where the
//! unit is one of `m` (minutes), `h` (hours) or `d` (days), e.g. `90m`,
//! `2h`, `1d`.

use chrono::Duration;
use thiserror::Error;

/// Error type for compact duration parsing
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DurationParseError {
    #[error("Invalid duration format: {0}")]
    InvalidFormat(String),

    #[error("Invalid number: {0}")]
    InvalidNumber(String),

    #[error("Unknown unit: {0}")]
    UnknownUnit(String),

    #[error("Empty duration string")]
    EmptyString,
}

/// Parse a compact `<N><unit>` duration string into a Duration
///
/// # Examples
///
/// ```
/// use almanac_domain::parse_compact_duration;
/// use chrono::Duration;
///
/// assert_eq!(parse_compact_duration("45m").unwrap(), Duration::minutes(45));
/// assert_eq!(parse_compact_duration("2h").unwrap(), Duration::hours(2));
/// assert_eq!(parse_compact_duration("1d").unwrap(), Duration::days(1));
/// assert!(parse_compact_duration("soon").is_err());
/// ```
pub fn parse_compact_duration(s: &str) -> Result<Duration, DurationParseError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(DurationParseError::EmptyString);
    }

    let Some(unit) = s.chars().last() else {
        return Err(DurationParseError::EmptyString);
    };
    let number = &s[..s.len() - unit.len_utf8()];
    if number.is_empty() {
        return Err(DurationParseError::InvalidFormat("Expected number before unit".to_string()));
    }

    let value: i64 =
        number.parse().map_err(|_| DurationParseError::InvalidNumber(number.to_string()))?;

    let duration = match unit {
        'm' => Duration::try_minutes(value),
        'h' => Duration::try_hours(value),
        'd' => Duration::try_days(value),
        other => return Err(DurationParseError::UnknownUnit(other.to_string())),
    };

    duration.ok_or_else(|| DurationParseError::InvalidNumber(number.to_string()))
}
