//! Wall-clock timestamps as recorded in exchange exports.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default format of CoinTracking date columns.
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Naive wall-clock timestamp of a record.
///
/// Exchange exports carry no timezone; records are compared and sorted on the
/// timestamp exactly as written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(pub NaiveDateTime);

impl Timestamp {
    pub fn new(inner: NaiveDateTime) -> Self {
        Timestamp(inner)
    }

    /// Parse using the given strftime format.
    ///
    /// # Errors
    /// Returns an error if the string does not match the format.
    pub fn parse(s: &str, format: &str) -> Result<Self, chrono::ParseError> {
        NaiveDateTime::parse_from_str(s.trim(), format).map(Timestamp)
    }

    /// Format using the given strftime format.
    pub fn format(&self, format: &str) -> String {
        self.0.format(format).to_string()
    }

    /// Calendar day this timestamp falls on.
    pub fn day(&self) -> NaiveDate {
        self.0.date()
    }

    /// Same calendar day, with the time-of-day replaced.
    pub fn with_time(&self, time: NaiveTime) -> Self {
        Timestamp(self.0.date().and_time(time))
    }

    pub fn inner(&self) -> NaiveDateTime {
        self.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format(DEFAULT_DATE_FORMAT))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_default_format() {
        let ts = Timestamp::parse("2026-01-02 13:45:00", DEFAULT_DATE_FORMAT).unwrap();
        assert_eq!(ts.to_string(), "2026-01-02 13:45:00");
    }

    #[test]
    fn test_parse_custom_format() {
        let ts = Timestamp::parse("02.01.2026 13:45", "%d.%m.%Y %H:%M").unwrap();
        assert_eq!(ts.format("%Y-%m-%d"), "2026-01-02");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Timestamp::parse("not a date", DEFAULT_DATE_FORMAT).is_err());
    }

    #[test]
    fn test_ordering() {
        let a = Timestamp::parse("2026-01-01 00:00:00", DEFAULT_DATE_FORMAT).unwrap();
        let b = Timestamp::parse("2026-01-02 00:00:00", DEFAULT_DATE_FORMAT).unwrap();
        assert!(a < b);
    }

    #[test]
    fn test_with_time_keeps_day() {
        let ts = Timestamp::parse("2026-01-02 13:45:00", DEFAULT_DATE_FORMAT).unwrap();
        let midnight = ts.with_time(NaiveTime::from_hms_opt(0, 0, 0).unwrap());
        assert_eq!(midnight.to_string(), "2026-01-02 00:00:00");
        assert_eq!(midnight.day(), ts.day());
    }
}
