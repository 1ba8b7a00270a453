//! Local calendar dates and the clock that produces "today".
//!
//! All arithmetic here is done on year/month/day values through
//! [`chrono::NaiveDate`]; nothing goes through UTC timestamps, so there is no
//! midnight off-by-one for users west of Greenwich.

use chrono::{DateTime, Datelike, Days, Local, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// A local calendar day, printed and parsed as zero-padded `YYYY-MM-DD`.
///
/// Ordering is chronological, which for the fixed-width form is the same as
/// comparing the ISO strings lexicographically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CalendarDate(NaiveDate);

impl CalendarDate {
    /// Build from year/month/day. Returns `None` for impossible dates.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    /// Parse a strict `YYYY-MM-DD` string.
    ///
    /// # Errors
    /// Returns [`ValidationError::InvalidDate`] for anything that is not a
    /// zero-padded, four-digit-year calendar date that actually exists.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        let bytes = s.as_bytes();
        let shaped = bytes.len() == 10
            && bytes[4] == b'-'
            && bytes[7] == b'-'
            && bytes
                .iter()
                .enumerate()
                .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());
        if !shaped {
            return Err(ValidationError::InvalidDate(s.to_string()));
        }

        let field = |range: std::ops::Range<usize>| s[range].parse::<u32>().ok();
        match (field(0..4), field(5..7), field(8..10)) {
            (Some(y), Some(m), Some(d)) => Self::from_ymd(y as i32, m, d)
                .ok_or_else(|| ValidationError::InvalidDate(s.to_string())),
            _ => Err(ValidationError::InvalidDate(s.to_string())),
        }
    }

    /// Move by `days` calendar days (negative goes back). Saturates at the
    /// representable range instead of panicking.
    pub fn shift(self, days: i64) -> Self {
        let magnitude = Days::new(days.unsigned_abs());
        let moved = if days >= 0 {
            self.0.checked_add_days(magnitude)
        } else {
            self.0.checked_sub_days(magnitude)
        };
        match moved {
            Some(date) => Self(date),
            None if days >= 0 => Self(NaiveDate::MAX),
            None => Self(NaiveDate::MIN),
        }
    }

    /// The previous calendar day.
    pub fn pred(self) -> Self {
        self.shift(-1)
    }

    /// Day of week, 0 = Sunday ..= 6 = Saturday.
    pub fn weekday(self) -> u8 {
        self.0.weekday().num_days_from_sunday() as u8
    }

    /// Whole days from `earlier` to `self` (negative if `earlier` is later).
    pub fn days_since(self, earlier: CalendarDate) -> i64 {
        self.0.signed_duration_since(earlier.0).num_days()
    }

    /// `count` consecutive days starting at (and including) `self`.
    pub fn upcoming(self, count: usize) -> Vec<CalendarDate> {
        (0..count as i64).map(|i| self.shift(i)).collect()
    }

    /// Iterate from `self` backwards, inclusive of both ends. Empty when
    /// `earliest` is after `self`.
    pub fn walk_back_to(self, earliest: CalendarDate) -> WalkBack {
        WalkBack {
            next: (self >= earliest).then_some(self),
            earliest,
        }
    }

    pub fn as_naive(self) -> NaiveDate {
        self.0
    }
}

impl From<NaiveDate> for CalendarDate {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02}",
            self.0.year(),
            self.0.month(),
            self.0.day()
        )
    }
}

impl FromStr for CalendarDate {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for CalendarDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CalendarDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Descending day iterator returned by [`CalendarDate::walk_back_to`].
#[derive(Debug, Clone)]
pub struct WalkBack {
    next: Option<CalendarDate>,
    earliest: CalendarDate,
}

impl Iterator for WalkBack {
    type Item = CalendarDate;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        let prev = current.pred();
        self.next = (current > self.earliest && prev < current).then_some(prev);
        Some(current)
    }
}

/// Source of "now". Substitute [`FixedClock`] for deterministic tests.
pub trait Clock {
    /// Current instant, used for creation timestamps.
    fn now(&self) -> DateTime<Utc>;

    /// Current local calendar day.
    fn today(&self) -> CalendarDate;
}

/// Wall clock in the process's local time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn today(&self) -> CalendarDate {
        CalendarDate(Local::now().date_naive())
    }
}

/// Clock pinned to a single day.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    today: CalendarDate,
}

impl FixedClock {
    pub fn new(today: CalendarDate) -> Self {
        Self { today }
    }

    pub fn set(&mut self, today: CalendarDate) {
        self.today = today;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.today
            .0
            .and_hms_opt(12, 0, 0)
            .map(|dt| dt.and_utc())
            .unwrap_or_else(Utc::now)
    }

    fn today(&self) -> CalendarDate {
        self.today
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }

    fn today(&self) -> CalendarDate {
        (**self).today()
    }
}

#[cfg(test)]
pub(crate) fn date(s: &str) -> CalendarDate {
    CalendarDate::parse(s).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_prints_zero_padded() {
        let d = CalendarDate::parse("2026-02-01").unwrap();
        assert_eq!(d.to_string(), "2026-02-01");
        assert_eq!(d, CalendarDate::from_ymd(2026, 2, 1).unwrap());
    }

    #[test]
    fn rejects_malformed_dates() {
        for bad in ["2026-2-01", "2026-02-1", "20260201", "2026-02-30", "abcd-ef-gh", "", " 2026-02-01"] {
            assert!(CalendarDate::parse(bad).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn shift_crosses_month_and_year_boundaries() {
        assert_eq!(date("2026-01-31").shift(1), date("2026-02-01"));
        assert_eq!(date("2026-01-01").shift(-1), date("2025-12-31"));
        assert_eq!(date("2024-02-28").shift(1), date("2024-02-29"));
        assert_eq!(date("2026-03-01").shift(-14), date("2026-02-15"));
    }

    #[test]
    fn weekday_uses_sunday_zero() {
        assert_eq!(date("2026-01-01").weekday(), 4); // Thursday
        assert_eq!(date("2026-02-01").weekday(), 0); // Sunday
        assert_eq!(date("2026-02-07").weekday(), 6); // Saturday
    }

    #[test]
    fn ordering_matches_string_ordering() {
        let a = date("2025-12-31");
        let b = date("2026-01-01");
        assert!(a < b);
        assert!(a.to_string() < b.to_string());
    }

    #[test]
    fn days_since_counts_calendar_days() {
        assert_eq!(date("2026-01-15").days_since(date("2026-01-01")), 14);
        assert_eq!(date("2026-01-01").days_since(date("2026-01-15")), -14);
    }

    #[test]
    fn walk_back_is_inclusive_and_descending() {
        let days: Vec<_> = date("2026-02-03").walk_back_to(date("2026-02-01")).collect();
        assert_eq!(days, vec![date("2026-02-03"), date("2026-02-02"), date("2026-02-01")]);
        assert_eq!(date("2026-02-01").walk_back_to(date("2026-02-02")).count(), 0);
    }

    #[test]
    fn upcoming_starts_today() {
        let days = date("2026-02-27").upcoming(3);
        assert_eq!(days, vec![date("2026-02-27"), date("2026-02-28"), date("2026-03-01")]);
    }

    #[test]
    fn serde_uses_iso_string() {
        let d = date("2026-02-01");
        assert_eq!(serde_json::to_string(&d).unwrap(), "\"2026-02-01\"");
        let parsed: CalendarDate = serde_json::from_str("\"2026-02-01\"").unwrap();
        assert_eq!(parsed, d);
        assert!(serde_json::from_str::<CalendarDate>("\"2026-2-1\"").is_err());
    }

    #[test]
    fn fixed_clock_reports_pinned_day() {
        let clock = FixedClock::new(date("2026-02-04"));
        assert_eq!(clock.today(), date("2026-02-04"));
        assert_eq!(clock.now().date_naive(), date("2026-02-04").as_naive());
    }
}
