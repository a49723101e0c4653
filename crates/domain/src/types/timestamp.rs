//! Canonical `YYYYMMDDHHMM` wall-clock timestamp.
//!
//! All agenda ordering and range comparisons happen on this type. The wire
//! form is fixed-width and zero-padded, so the derived ordering matches plain
//! string ordering of the encoded values.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when a string is not a valid `YYYYMMDDHHMM` timestamp
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TimestampParseError {
    #[error("expected 12 digits, got {0:?}")]
    InvalidFormat(String),

    #[error("not a calendar date/time: {0}")]
    OutOfRange(String),
}

/// Minute-precision local timestamp (no timezone concept)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Timestamp(NaiveDateTime);

impl Timestamp {
    /// Wrap a date-time, dropping seconds and sub-second precision.
    pub fn new(value: NaiveDateTime) -> Self {
        let time = NaiveTime::from_hms_opt(value.hour(), value.minute(), 0).unwrap_or(NaiveTime::MIN);
        Self(value.date().and_time(time))
    }

    /// Build from a date and a time-of-day.
    pub fn from_parts(date: NaiveDate, time: NaiveTime) -> Self {
        Self::new(date.and_time(time))
    }

    /// Midnight at the start of `date`.
    pub fn start_of(date: NaiveDate) -> Self {
        Self(date.and_time(NaiveTime::MIN))
    }

    /// Parse the 12-digit wire form.
    pub fn parse(value: &str) -> Result<Self, TimestampParseError> {
        if value.len() != 12 || !value.bytes().all(|b| b.is_ascii_digit()) {
            return Err(TimestampParseError::InvalidFormat(value.to_string()));
        }

        // All bytes are ASCII digits, so every slice below is a valid number.
        let field = |range: std::ops::Range<usize>| value[range].parse::<u32>().unwrap_or(0);
        let year = field(0..4) as i32;
        let date = NaiveDate::from_ymd_opt(year, field(4..6), field(6..8))
            .ok_or_else(|| TimestampParseError::OutOfRange(value.to_string()))?;
        let time = NaiveTime::from_hms_opt(field(8..10), field(10..12), 0)
            .ok_or_else(|| TimestampParseError::OutOfRange(value.to_string()))?;

        Ok(Self(date.and_time(time)))
    }

    /// Underlying date-time.
    pub fn as_datetime(&self) -> NaiveDateTime {
        self.0
    }

    /// Calendar date part.
    pub fn date(&self) -> NaiveDate {
        self.0.date()
    }

    /// Time-of-day part.
    pub fn time(&self) -> NaiveTime {
        self.0.time()
    }

    /// Add a (possibly negative) duration; `None` on overflow.
    pub fn checked_add(&self, duration: Duration) -> Option<Self> {
        self.0.checked_add_signed(duration).map(Self::new)
    }

    /// Subtract a duration; `None` on overflow.
    pub fn checked_sub(&self, duration: Duration) -> Option<Self> {
        self.0.checked_sub_signed(duration).map(Self::new)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}{:02}{:02}{:02}{:02}",
            self.0.year(),
            self.0.month(),
            self.0.day(),
            self.0.hour(),
            self.0.minute()
        )
    }
}

impl FromStr for Timestamp {
    type Err = TimestampParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Timestamp {
    type Error = TimestampParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Timestamp> for String {
    fn from(value: Timestamp) -> Self {
        value.to_string()
    }
}

impl From<NaiveDateTime> for Timestamp {
    fn from(value: NaiveDateTime) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_formats_wire_form() {
        let ts = Timestamp::parse("202401010900").unwrap();
        assert_eq!(ts.date(), NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(ts.time(), NaiveTime::from_hms_opt(9, 0, 0).unwrap());
        assert_eq!(ts.to_string(), "202401010900");
    }

    #[test]
    fn rejects_wrong_width_and_impossible_dates() {
        assert!(matches!(
            Timestamp::parse("2024010109"),
            Err(TimestampParseError::InvalidFormat(_))
        ));
        assert!(matches!(
            Timestamp::parse("20240101090a"),
            Err(TimestampParseError::InvalidFormat(_))
        ));
        assert!(matches!(
            Timestamp::parse("202402300900"),
            Err(TimestampParseError::OutOfRange(_))
        ));
        assert!(matches!(
            Timestamp::parse("202401012500"),
            Err(TimestampParseError::OutOfRange(_))
        ));
    }

    #[test]
    fn ordering_matches_string_ordering() {
        let raw = ["202312312359", "202401010000", "202401010900", "202401100800", "202402010000"];
        let mut parsed: Vec<Timestamp> = raw.iter().rev().map(|s| s.parse().unwrap()).collect();
        parsed.sort();
        let rendered: Vec<String> = parsed.iter().map(ToString::to_string).collect();
        assert_eq!(rendered, raw);
    }

    #[test]
    fn drops_seconds() {
        let dt = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap().and_hms_opt(7, 8, 59).unwrap();
        assert_eq!(Timestamp::new(dt).to_string(), "202403050708");
    }

    #[test]
    fn serializes_as_string() {
        let ts = Timestamp::parse("202406011230").unwrap();
        let json = serde_json::to_string(&ts).unwrap();
        assert_eq!(json, "\"202406011230\"");
        let back: Timestamp = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ts);
        assert!(serde_json::from_str::<Timestamp>("\"2024\"").is_err());
    }
}
