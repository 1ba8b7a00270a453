//! One-off tasks and the per-day completed/failed markers derived from them.
//!
//! Every transition returns a fresh [`TodoState`]; the previous value is left
//! untouched. Unknown task ids are ignored.

pub mod reconcile;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

pub use reconcile::{reconcile, reconcile_with_report, ReconcileReport};

use crate::calendar::CalendarDate;
use crate::habit::new_id;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    pub completed: bool,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    /// Day the task belongs to. Rewritten to "today" when it is carried over.
    pub scheduled_date: CalendarDate,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TodoState {
    #[serde(default)]
    pub tasks: Vec<Task>,
    /// Days whose tasks were all completed.
    #[serde(default)]
    pub completed_days: BTreeSet<CalendarDate>,
    /// Days that ended with unfinished tasks. Disjoint from `completed_days`.
    #[serde(default)]
    pub failed_days: BTreeSet<CalendarDate>,
    #[serde(default)]
    pub last_active_date: Option<CalendarDate>,
}

impl TodoState {
    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Append a new task for `date`. Blank titles are ignored.
    pub fn with_task_added(&self, title: &str, date: CalendarDate, now: DateTime<Utc>) -> Self {
        let title = title.trim();
        if title.is_empty() {
            debug!("ignoring task with blank title");
            return self.clone();
        }

        let mut next = self.clone();
        let task = Task {
            id: new_id("task", now),
            title: title.to_string(),
            completed: false,
            created_at: now,
            scheduled_date: date,
        };
        debug!(task_id = %task.id, date = %date, "adding task");
        next.tasks.push(task);
        next.refresh_day_mark(date);
        next
    }

    /// Flip a task's completion and re-derive its day's marker.
    pub fn with_task_toggled(&self, id: &str) -> Self {
        let mut next = self.clone();
        let Some(task) = next.tasks.iter_mut().find(|t| t.id == id) else {
            debug!(task_id = id, "toggle for unknown task ignored");
            return next;
        };
        task.completed = !task.completed;
        let date = task.scheduled_date;
        debug!(task_id = id, completed = task.completed, date = %date, "toggled task");
        next.refresh_day_mark(date);
        next
    }

    pub fn with_task_deleted(&self, id: &str) -> Self {
        let mut next = self.clone();
        let Some(pos) = next.tasks.iter().position(|t| t.id == id) else {
            debug!(task_id = id, "delete for unknown task ignored");
            return next;
        };
        let removed = next.tasks.remove(pos);
        next.refresh_day_mark(removed.scheduled_date);
        next
    }

    /// Tasks scheduled on `date`, in insertion order.
    pub fn tasks_for(&self, date: CalendarDate) -> impl Iterator<Item = &Task> {
        self.tasks.iter().filter(move |t| t.scheduled_date == date)
    }

    /// Pending tasks first, then completed ones, each group in insertion order.
    pub fn sorted_tasks(&self) -> Vec<&Task> {
        let (done, pending): (Vec<&Task>, Vec<&Task>) =
            self.tasks.iter().partition(|t| t.completed);
        pending.into_iter().chain(done).collect()
    }

    /// A day is completed when it has tasks and all of them are done.
    ///
    /// Days already committed as failed stay failed.
    pub(crate) fn refresh_day_mark(&mut self, date: CalendarDate) {
        let all_done = {
            let mut tasks = self.tasks_for(date).peekable();
            tasks.peek().is_some() && tasks.all(|t| t.completed)
        };

        if all_done && !self.failed_days.contains(&date) {
            self.completed_days.insert(date);
        } else {
            self.completed_days.remove(&date);
        }
    }
}
