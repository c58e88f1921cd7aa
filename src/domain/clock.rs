//! Time-of-day and calendar-date value types used at the HTTP edge.
//!
//! Clock times travel as `HH:MM` strings and schedule dates as `DD-MM-YYYY`;
//! everything past the edge works with [`TimeOfDay`] and [`NaiveDate`].

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use thiserror::Error;

pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// Wire format of schedule and task dates.
pub const WIRE_DATE_FORMAT: &str = "%d-%m-%Y";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Invalid Format")]
pub struct TimeFormatError {
    field: &'static str,
}

impl TimeFormatError {
    pub fn field(&self) -> &'static str {
        self.field
    }

    /// Attaches the name of the request field the bad value came from.
    pub fn for_field(self, field: &'static str) -> Self {
        Self { field }
    }
}

impl Default for TimeFormatError {
    fn default() -> Self {
        Self { field: "time" }
    }
}

/// Wall-clock time without date or zone, minute precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay {
    hour: u8,
    minute: u8,
}

impl TimeOfDay {
    pub fn new(hour: u8, minute: u8) -> Result<Self, TimeFormatError> {
        if hour > 23 || minute > 59 {
            return Err(TimeFormatError::default());
        }
        Ok(Self { hour, minute })
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    pub fn minutes_since_midnight(&self) -> u32 {
        u32::from(self.hour) * 60 + u32::from(self.minute)
    }

    pub fn to_naive_time(self) -> NaiveTime {
        // hour/minute are range-checked on construction
        NaiveTime::from_hms_opt(u32::from(self.hour), u32::from(self.minute), 0)
            .unwrap_or(NaiveTime::MIN)
    }

    pub fn from_naive_time(time: NaiveTime) -> Self {
        Self {
            hour: time.hour() as u8,
            minute: time.minute() as u8,
        }
    }

    /// Parses and tags a failure with the request field name.
    pub fn parse_field(value: &str, field: &'static str) -> Result<Self, TimeFormatError> {
        value.parse().map_err(|e: TimeFormatError| e.for_field(field))
    }
}

impl FromStr for TimeOfDay {
    type Err = TimeFormatError;

    /// Accepts `HH:MM` and `HH:MM:SS`; seconds are dropped.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.trim().split(':');
        let (Some(h), Some(m)) = (parts.next(), parts.next()) else {
            return Err(TimeFormatError::default());
        };
        if let Some(sec) = parts.next() {
            sec.parse::<u8>().map_err(|_| TimeFormatError::default())?;
        }
        if parts.next().is_some() {
            return Err(TimeFormatError::default());
        }

        let hour = h.parse::<u8>().map_err(|_| TimeFormatError::default())?;
        let minute = m.parse::<u8>().map_err(|_| TimeFormatError::default())?;
        Self::new(hour, minute)
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl From<NaiveTime> for TimeOfDay {
    fn from(time: NaiveTime) -> Self {
        Self::from_naive_time(time)
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse()
            .map_err(|_| de::Error::custom("Invalid time format. Use HH:MM"))
    }
}

pub fn parse_wire_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), WIRE_DATE_FORMAT).ok()
}

pub fn format_wire_date(date: NaiveDate) -> String {
    date.format(WIRE_DATE_FORMAT).to_string()
}

/// First day of the month `offset` months after the month containing `date`.
pub fn month_start(date: NaiveDate, offset: u32) -> NaiveDate {
    let months = date.year() as u32 * 12 + date.month0() + offset;
    NaiveDate::from_ymd_opt((months / 12) as i32, months % 12 + 1, 1).unwrap_or(date)
}

/// Serde adapter for `DD-MM-YYYY` dates.
pub mod wire_date {
    use super::*;

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_wire_date(*date))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_wire_date(&raw).ok_or_else(|| de::Error::custom("Invalid date format. Use DD-MM-YYYY"))
    }

    pub mod option {
        use super::*;

        pub fn serialize<S: Serializer>(
            date: &Option<NaiveDate>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match date {
                Some(d) => serializer.serialize_str(&format_wire_date(*d)),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<NaiveDate>, D::Error> {
            let raw = Option::<String>::deserialize(deserializer)?;
            match raw.as_deref().map(str::trim) {
                None | Some("") => Ok(None),
                Some(s) => parse_wire_date(s)
                    .map(Some)
                    .ok_or_else(|| de::Error::custom("Invalid date format. Use DD-MM-YYYY")),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hours_and_minutes() {
        let t: TimeOfDay = "08:15".parse().unwrap();
        assert_eq!(t.hour(), 8);
        assert_eq!(t.minute(), 15);
        assert_eq!(t.minutes_since_midnight(), 495);
        assert_eq!(t.to_string(), "08:15");
    }

    #[test]
    fn drops_seconds() {
        let t: TimeOfDay = "17:05:59".parse().unwrap();
        assert_eq!(t.to_string(), "17:05");
    }

    #[test]
    fn rejects_malformed_input() {
        for bad in ["", "0800", "8", "aa:bb", "24:00", "12:60", "1:2:3:4", "-1:00"] {
            assert!(bad.parse::<TimeOfDay>().is_err(), "{bad} should not parse");
        }
    }

    #[test]
    fn parse_field_names_the_field() {
        let err = TimeOfDay::parse_field("later", "clock_in").unwrap_err();
        assert_eq!(err.field(), "clock_in");
        assert_eq!(err.to_string(), "Invalid Format");
    }

    #[test]
    fn naive_time_round_trip_keeps_minutes() {
        let t = TimeOfDay::new(22, 30).unwrap();
        assert_eq!(TimeOfDay::from(t.to_naive_time()), t);
    }

    #[test]
    fn wire_dates_are_day_first() {
        let d = parse_wire_date("05-03-2025").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2025, 3, 5).unwrap());
        assert_eq!(format_wire_date(d), "05-03-2025");
        assert!(parse_wire_date("2025-03-05").is_none());
    }

    #[test]
    fn month_start_rolls_over_the_year() {
        let d = NaiveDate::from_ymd_opt(2025, 11, 20).unwrap();
        assert_eq!(month_start(d, 0), NaiveDate::from_ymd_opt(2025, 11, 1).unwrap());
        assert_eq!(month_start(d, 2), NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
    }

    #[test]
    fn time_serializes_as_string() {
        let t = TimeOfDay::new(6, 0).unwrap();
        assert_eq!(serde_json::to_string(&t).unwrap(), "\"06:00\"");
        let back: TimeOfDay = serde_json::from_str("\"06:00\"").unwrap();
        assert_eq!(back, t);
        assert!(serde_json::from_str::<TimeOfDay>("\"6\"").is_err());
    }
}
