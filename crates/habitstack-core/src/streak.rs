//! Current-streak counters.
//!
//! Both walks start at today and go backwards one calendar day at a time.

use std::collections::BTreeSet;

use crate::calendar::CalendarDate;
use crate::habit::{is_due, HabitStack};
use crate::ledger::CompletionLedger;

/// Streak over the aggregate task stream.
///
/// Counts completed days back from `today` down to the earliest recorded day,
/// stopping at the first failed day. Days in neither set are neutral.
pub fn compute_streak(
    completed_days: &BTreeSet<CalendarDate>,
    failed_days: &BTreeSet<CalendarDate>,
    today: CalendarDate,
) -> u32 {
    let earliest = match (completed_days.first(), failed_days.first()) {
        (Some(&a), Some(&b)) => a.min(b),
        (Some(&a), None) | (None, Some(&a)) => a,
        (None, None) => return 0,
    };

    let mut streak = 0;
    for day in today.walk_back_to(earliest) {
        if failed_days.contains(&day) {
            break;
        }
        if completed_days.contains(&day) {
            streak += 1;
        }
    }
    streak
}

/// Streak of one habit stack.
///
/// Only days on which the stack is due count. A due day strictly before
/// `today` without a completion ends the walk; today itself never breaks it,
/// since the day is not over yet.
pub fn compute_habit_streak(
    stack: &HabitStack,
    ledger: &CompletionLedger,
    today: CalendarDate,
) -> u32 {
    let mut streak = 0;
    for day in today.walk_back_to(stack.start_date) {
        if !is_due(stack, day) {
            continue;
        }
        if ledger.is_completed(&stack.id, day) {
            streak += 1;
        } else if day < today {
            break;
        }
    }
    streak
}
