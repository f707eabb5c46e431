//! Integer-day calendar dates.
//!
//! A [`PDate`] is a day count since 2000-01-01 (day 0), valid through
//! 3000-12-31. Calendar decomposition rides on chrono; ordering and
//! serialization use the raw day value.

use std::fmt;
use std::ops::Sub;
use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::InvariantViolation;

/// Day value of 3000-12-31.
pub const MAX_DAY_VALUE: i32 = 365_607;

/// Sort key used for transactions without a date; greater than any real day
/// value.
pub const NULL_DATE_SENTINEL: i32 = 999_999;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PDate {
    value: i32,
}

impl PDate {
    pub const MIN: PDate = PDate { value: 0 };
    pub const MAX: PDate = PDate {
        value: MAX_DAY_VALUE,
    };

    /// Wraps a raw day value, rejecting anything outside the supported range.
    pub fn from_value(value: i32) -> Result<Self, InvariantViolation> {
        if !(0..=MAX_DAY_VALUE).contains(&value) {
            return Err(InvariantViolation::DateOutOfRange(value));
        }
        Ok(Self { value })
    }

    /// Builds a date from year, month (1..=12) and day of month.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Result<Self, InvariantViolation> {
        let date = NaiveDate::from_ymd_opt(year, month, day)
            .ok_or(InvariantViolation::InvalidDate { year, month, day })?;
        let value = (date - epoch()).num_days() as i32;
        Self::from_value(value)
    }

    pub fn value(self) -> i32 {
        self.value
    }

    pub fn year(self) -> i32 {
        self.to_naive().year()
    }

    /// Month of year, 1..=12.
    pub fn month(self) -> u32 {
        self.to_naive().month()
    }

    /// Day of month, 1..=31.
    pub fn day(self) -> u32 {
        self.to_naive().day()
    }

    /// The previous calendar day. Saturates at the range minimum.
    pub fn pred(self) -> PDate {
        PDate {
            value: (self.value - 1).max(0),
        }
    }

    pub fn days_in_month(year: i32, month: u32) -> u32 {
        let (next_year, next_month) = if month == 12 {
            (year + 1, 1)
        } else {
            (year, month + 1)
        };
        let first_next = NaiveDate::from_ymd_opt(next_year, next_month, 1).unwrap();
        (first_next - Duration::days(1)).day()
    }

    pub fn is_leap_year(year: i32) -> bool {
        NaiveDate::from_ymd_opt(year, 2, 29).is_some()
    }

    fn to_naive(self) -> NaiveDate {
        epoch() + Duration::days(self.value as i64)
    }
}

fn epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(2000, 1, 1).unwrap()
}

impl Sub for PDate {
    type Output = i32;

    /// Day difference, `self - rhs`.
    fn sub(self, rhs: PDate) -> i32 {
        self.value - rhs.value
    }
}

impl fmt::Display for PDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_naive().format("%Y-%m-%d"))
    }
}

impl FromStr for PDate {
    type Err = InvariantViolation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map_err(|_| InvariantViolation::UnparsableDate(s.to_string()))?;
        PDate::from_ymd(date.year(), date.month(), date.day())
    }
}

impl Serialize for PDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i32(self.value)
    }
}

impl<'de> Deserialize<'de> for PDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = i32::deserialize(deserializer)?;
        PDate::from_value(value).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_ymd() {
        let date = PDate::from_ymd(2016, 7, 19).unwrap();
        assert_eq!(date.year(), 2016);
        assert_eq!(date.month(), 7);
        assert_eq!(date.day(), 19);
    }

    #[test]
    fn epoch_is_day_zero() {
        assert_eq!(PDate::from_ymd(2000, 1, 1).unwrap().value(), 0);
        assert_eq!(PDate::from_ymd(2000, 1, 2).unwrap().value(), 1);
    }

    #[test]
    fn range_limits() {
        assert_eq!(PDate::from_ymd(3000, 12, 31).unwrap(), PDate::MAX);
        assert!(PDate::from_ymd(1999, 12, 31).is_err());
        assert!(PDate::from_value(MAX_DAY_VALUE + 1).is_err());
        assert!(PDate::MAX.value() < NULL_DATE_SENTINEL);
    }

    #[test]
    fn parses_iso_literals() {
        let parsed: PDate = "2016-02-29".parse().unwrap();
        assert_eq!(parsed, PDate::from_ymd(2016, 2, 29).unwrap());
        assert!("2015-02-29".parse::<PDate>().is_err());
        assert!("not-a-date".parse::<PDate>().is_err());
    }

    #[test]
    fn month_lengths() {
        assert_eq!(PDate::days_in_month(2016, 2), 29);
        assert_eq!(PDate::days_in_month(2015, 2), 28);
        assert_eq!(PDate::days_in_month(2016, 12), 31);
        assert!(PDate::is_leap_year(2000));
        assert!(!PDate::is_leap_year(2100));
    }
}
