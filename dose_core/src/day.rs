//! Calendar-day value type and whole-day arithmetic.
//!
//! A [`CalendarDay`] identifies one local date with no time-of-day component.
//! All scheduling and streak logic works on these values; the `YYYY-MM-DD`
//! string form exists only at the storage and CLI boundary.

use crate::{Error, Result};
use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, TimeZone, Weekday};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Canonical storage encoding of a day
const DAY_FORMAT: &str = "%Y-%m-%d";

/// One calendar date, independent of timezone and time-of-day
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CalendarDay(NaiveDate);

impl CalendarDay {
    /// Build a day from a year, month and day-of-month
    ///
    /// Returns `None` for dates that do not exist (e.g. February 30th).
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    /// Truncate a timestamp to the calendar day it falls on in its own timezone
    pub fn from_datetime<Tz: TimeZone>(moment: &DateTime<Tz>) -> Self {
        Self(moment.date_naive())
    }

    /// The current day in the local timezone
    pub fn today() -> Self {
        Self::from_datetime(&Local::now())
    }

    /// Whole days from `from` to `to`
    ///
    /// Zero for the same day, negative when `to` precedes `from`.
    pub fn days_between(from: CalendarDay, to: CalendarDay) -> i64 {
        (to.0 - from.0).num_days()
    }

    pub fn weekday(&self) -> Weekday {
        self.0.weekday()
    }

    /// Offset this day by `days` (may be negative)
    pub fn add_days(&self, days: i64) -> Self {
        Self(self.0 + Duration::days(days))
    }

    /// The following day
    pub fn succ(&self) -> Self {
        self.add_days(1)
    }

    pub fn as_naive(&self) -> NaiveDate {
        self.0
    }

    /// Long human-readable form, e.g. `Saturday, Nov 22, 2025`
    pub fn human(&self) -> String {
        self.0.format("%A, %b %-d, %Y").to_string()
    }
}

impl From<NaiveDate> for CalendarDay {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl fmt::Display for CalendarDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DAY_FORMAT))
    }
}

impl FromStr for CalendarDay {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        NaiveDate::parse_from_str(s.trim(), DAY_FORMAT)
            .map(Self)
            .map_err(|e| Error::InvalidDay(format!("{:?}: {}", s, e)))
    }
}

impl Serialize for CalendarDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CalendarDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
