//! Day rollover for one-off tasks.
//!
//! Runs once per activation. Unfinished tasks from earlier days move to
//! today, and each earlier day that left something unfinished is committed as
//! failed. Guarded by `last_active_date`, so repeated calls on the same day
//! return the state unchanged.
//!
//! Carried tasks keep their id and creation time; only `scheduled_date`
//! moves. The day they came from is remembered solely through `failed_days`.

use std::collections::BTreeSet;
use tracing::{debug, info};

use super::TodoState;
use crate::calendar::CalendarDate;

/// What a reconciliation pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Ids of tasks moved onto today.
    pub carried: Vec<String>,
    /// Past days newly committed as failed.
    pub failed_days: BTreeSet<CalendarDate>,
    /// False when the guard short-circuited.
    pub applied: bool,
}

/// Reconcile `state` for `today`.
pub fn reconcile(state: &TodoState, today: CalendarDate) -> TodoState {
    reconcile_with_report(state, today).0
}

/// [`reconcile`] plus a report of what changed.
pub fn reconcile_with_report(
    state: &TodoState,
    today: CalendarDate,
) -> (TodoState, ReconcileReport) {
    if state.last_active_date == Some(today) {
        debug!(today = %today, "day already reconciled");
        return (state.clone(), ReconcileReport::default());
    }

    let mut next = state.clone();
    let mut report = ReconcileReport {
        applied: true,
        ..ReconcileReport::default()
    };

    for task in next
        .tasks
        .iter_mut()
        .filter(|t| t.scheduled_date < today && !t.completed)
    {
        report.failed_days.insert(task.scheduled_date);
        report.carried.push(task.id.clone());
        task.scheduled_date = today;
    }

    for day in &report.failed_days {
        next.completed_days.remove(day);
        next.failed_days.insert(*day);
    }
    if !report.carried.is_empty() {
        next.refresh_day_mark(today);
    }
    next.last_active_date = Some(today);

    info!(
        today = %today,
        previous = ?state.last_active_date.map(|d| d.to_string()),
        carried = report.carried.len(),
        failed_days = report.failed_days.len(),
        "reconciled day"
    );
    (next, report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::date;
    use crate::todo::Task;
    use chrono::Utc;

    fn task(id: &str, day: &str, completed: bool) -> Task {
        Task {
            id: id.into(),
            title: id.into(),
            completed,
            created_at: Utc::now(),
            scheduled_date: date(day),
        }
    }

    fn state(tasks: Vec<Task>) -> TodoState {
        TodoState {
            tasks,
            ..TodoState::default()
        }
    }

    #[test]
    fn carries_unfinished_tasks_to_today() {
        let before = state(vec![
            task("a", "2026-02-01", false),
            task("b", "2026-02-01", true),
            task("c", "2026-02-02", false),
            task("d", "2026-02-03", false),
        ]);
        let (after, report) = reconcile_with_report(&before, date("2026-02-03"));

        assert_eq!(report.carried, vec!["a".to_string(), "c".to_string()]);
        assert_eq!(after.tasks.len(), 4, "carry-over must not duplicate");
        assert_eq!(after.task("a").unwrap().scheduled_date, date("2026-02-03"));
        assert_eq!(after.task("b").unwrap().scheduled_date, date("2026-02-01"));
        assert_eq!(after.task("c").unwrap().scheduled_date, date("2026-02-03"));
        assert_eq!(
            after.failed_days,
            BTreeSet::from([date("2026-02-01"), date("2026-02-02")])
        );
        assert_eq!(after.last_active_date, Some(date("2026-02-03")));
    }

    #[test]
    fn failed_day_leaves_completed_days() {
        let mut before = state(vec![task("a", "2026-02-01", false)]);
        before.completed_days.insert(date("2026-02-01"));
        let after = reconcile(&before, date("2026-02-02"));
        assert!(after.failed_days.contains(&date("2026-02-01")));
        assert!(!after.completed_days.contains(&date("2026-02-01")));
    }

    #[test]
    fn completed_past_days_are_kept() {
        let mut before = state(vec![task("a", "2026-02-01", true)]);
        before.completed_days.insert(date("2026-02-01"));
        let after = reconcile(&before, date("2026-02-02"));
        assert!(after.completed_days.contains(&date("2026-02-01")));
        assert!(after.failed_days.is_empty());
    }

    #[test]
    fn second_call_same_day_is_idempotent() {
        let before = state(vec![task("a", "2026-02-01", false)]);
        let once = reconcile(&before, date("2026-02-03"));
        let twice = reconcile(&once, date("2026-02-03"));
        assert_eq!(once, twice);

        let (_, report) = reconcile_with_report(&once, date("2026-02-03"));
        assert!(!report.applied);
    }

    #[test]
    fn future_tasks_are_untouched() {
        let before = state(vec![task("a", "2026-02-10", false)]);
        let after = reconcile(&before, date("2026-02-03"));
        assert_eq!(after.task("a").unwrap().scheduled_date, date("2026-02-10"));
        assert!(after.failed_days.is_empty());
    }

    #[test]
    fn carried_tasks_reopen_today() {
        let mut before = state(vec![
            task("a", "2026-02-01", false),
            task("b", "2026-02-02", true),
        ]);
        before.completed_days.insert(date("2026-02-02"));
        let after = reconcile(&before, date("2026-02-02"));
        assert!(!after.completed_days.contains(&date("2026-02-02")));
        assert!(after.completed_days.is_disjoint(&after.failed_days));
    }

    #[test]
    fn empty_state_just_records_the_day() {
        let after = reconcile(&TodoState::default(), date("2026-02-03"));
        assert_eq!(after.last_active_date, Some(date("2026-02-03")));
        assert!(after.tasks.is_empty());
    }
}
