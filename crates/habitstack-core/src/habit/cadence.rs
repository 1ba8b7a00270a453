//! Recurrence rules for habit stacks and the due-date predicate.
//!
//! A cadence is a preset type plus an explicit set of weekdays. The preset
//! only matters to the editor and to the fortnightly parity check; every other
//! type is fully described by its day set.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use super::HabitStack;
use crate::calendar::CalendarDate;
use crate::error::ValidationError;

/// Every weekday, 0 = Sunday.
pub const ALL_DAYS: [u8; 7] = [0, 1, 2, 3, 4, 5, 6];

/// Cadence preset.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum CadenceKind {
    Daily,
    Weekdays,
    Weekends,
    Weekly,
    Fortnightly,
    /// Anything unrecognised in persisted data. Never due.
    #[serde(other)]
    Unknown,
}

impl CadenceKind {
    /// Day set the editor selects when this preset is picked.
    ///
    /// Weekly and fortnightly default to today's weekday.
    pub fn default_days(self, today: CalendarDate) -> BTreeSet<u8> {
        match self {
            CadenceKind::Daily => ALL_DAYS.into_iter().collect(),
            CadenceKind::Weekdays => (1..=5).collect(),
            CadenceKind::Weekends => [0, 6].into_iter().collect(),
            CadenceKind::Weekly | CadenceKind::Fortnightly => [today.weekday()].into(),
            CadenceKind::Unknown => BTreeSet::new(),
        }
    }

    /// Whether `day` can be picked at all under this preset.
    pub fn is_day_disabled(self, day: u8) -> bool {
        match self {
            CadenceKind::Weekdays => day == 0 || day == 6,
            CadenceKind::Weekends => (1..=5).contains(&day),
            _ => false,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CadenceKind::Daily => "daily",
            CadenceKind::Weekdays => "weekdays",
            CadenceKind::Weekends => "weekends",
            CadenceKind::Weekly => "weekly",
            CadenceKind::Fortnightly => "fortnightly",
            CadenceKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for CadenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CadenceKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(CadenceKind::Daily),
            "weekdays" => Ok(CadenceKind::Weekdays),
            "weekends" => Ok(CadenceKind::Weekends),
            "weekly" => Ok(CadenceKind::Weekly),
            "fortnightly" => Ok(CadenceKind::Fortnightly),
            _ => Err(ValidationError::UnknownCadence(s.to_string())),
        }
    }
}

/// Recurrence rule of a habit stack.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Cadence {
    #[serde(rename = "type")]
    pub kind: CadenceKind,
    pub days: BTreeSet<u8>,
}

impl Cadence {
    /// Validated cadence with an explicit day set.
    ///
    /// # Errors
    /// Rejects an empty set and weekdays outside `0..=6`.
    pub fn new(
        kind: CadenceKind,
        days: impl IntoIterator<Item = u8>,
    ) -> Result<Self, ValidationError> {
        let days: BTreeSet<u8> = days.into_iter().collect();
        if let Some(&bad) = days.iter().find(|&&d| d > 6) {
            return Err(ValidationError::InvalidWeekday(bad));
        }
        if days.is_empty() {
            return Err(ValidationError::EmptyCadenceDays);
        }
        Ok(Self { kind, days })
    }

    /// Cadence as the editor initialises it when a preset is chosen.
    pub fn preset(kind: CadenceKind, today: CalendarDate) -> Self {
        Self {
            kind,
            days: kind.default_days(today),
        }
    }

    pub fn daily() -> Self {
        Self {
            kind: CadenceKind::Daily,
            days: ALL_DAYS.into_iter().collect(),
        }
    }

    /// Editor toggle of a single weekday.
    ///
    /// Hand-picking a day turns a daily/weekdays/weekends preset into a weekly
    /// one. The last remaining day cannot be removed.
    pub fn toggle_day(&self, day: u8) -> Self {
        if day > 6 {
            return self.clone();
        }
        let kind = match self.kind {
            CadenceKind::Daily | CadenceKind::Weekdays | CadenceKind::Weekends => {
                CadenceKind::Weekly
            }
            other => other,
        };

        let mut days = self.days.clone();
        if days.contains(&day) {
            if days.len() > 1 {
                days.remove(&day);
            }
        } else {
            days.insert(day);
        }
        Self { kind, days }
    }
}

impl Default for Cadence {
    fn default() -> Self {
        Self::daily()
    }
}

/// Whether `stack` is due on `date`.
///
/// Never due before the stack's start date or on weekdays outside the
/// cadence. Fortnightly stacks are due only in even weeks counted from the
/// start date.
pub fn is_due(stack: &HabitStack, date: CalendarDate) -> bool {
    if date < stack.start_date {
        return false;
    }
    if !stack.cadence.days.contains(&date.weekday()) {
        return false;
    }

    match stack.cadence.kind {
        CadenceKind::Fortnightly => {
            let weeks_elapsed = date.days_since(stack.start_date).div_euclid(7);
            weeks_elapsed % 2 == 0
        }
        CadenceKind::Unknown => false,
        CadenceKind::Daily | CadenceKind::Weekdays | CadenceKind::Weekends | CadenceKind::Weekly => {
            true
        }
    }
}

/// [`is_due`] for a raw date string. Malformed input is never due.
pub fn is_due_on_iso(stack: &HabitStack, iso_date: &str) -> bool {
    CalendarDate::parse(iso_date)
        .map(|date| is_due(stack, date))
        .unwrap_or(false)
}

/// Stacks due on `date`, in canonical order.
pub fn due_stacks(stacks: &[HabitStack], date: CalendarDate) -> Vec<&HabitStack> {
    stacks.iter().filter(|s| is_due(s, date)).collect()
}
