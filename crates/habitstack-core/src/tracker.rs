//! Process-wide holder of todo and habit state.
//!
//! The tracker owns the current [`TodoState`] and [`HabitState`] values and
//! replaces them wholesale with the result of a pure transition. Every
//! operation completes synchronously; persistence is write-behind through
//! [`Tracker::flush`], and a failed write only leaves the snapshot marked
//! dirty for the next attempt.

use std::collections::BTreeSet;
use tracing::{debug, warn};

use crate::calendar::{CalendarDate, Clock, SystemClock};
use crate::error::{CoreError, ValidationError};
use crate::events::Event;
use crate::habit::{Cadence, HabitDraft, HabitStack, HabitState};
use crate::storage::{Config, KeyValueStore, StorageConfig};
use crate::streak::{compute_habit_streak, compute_streak};
use crate::todo::{reconcile_with_report, ReconcileReport, TodoState};

/// Which persisted snapshot a change touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Snapshot {
    Todo,
    Habits,
}

type Observer = Box<dyn FnMut(&Event) + Send>;

pub struct Tracker<C: Clock = SystemClock> {
    clock: C,
    todo: TodoState,
    habits: HabitState,
    keys: StorageConfig,
    max_stack_size: usize,
    day_options: usize,
    dirty: BTreeSet<Snapshot>,
    observers: Vec<Observer>,
}

impl<C: Clock> Tracker<C> {
    /// Empty tracker, nothing loaded.
    pub fn new(clock: C, config: &Config) -> Self {
        Self {
            clock,
            todo: TodoState::default(),
            habits: HabitState::default(),
            keys: config.storage.clone(),
            max_stack_size: config.habits.max_stack_size,
            day_options: config.calendar.day_options,
            dirty: BTreeSet::new(),
            observers: Vec::new(),
        }
    }

    /// Rehydrate from `store`.
    ///
    /// Missing snapshots start empty. Unreadable ones are logged and also
    /// start empty; the bad bytes are left in place until the next write.
    pub async fn load<S: KeyValueStore>(store: &S, clock: C, config: &Config) -> Self {
        let mut tracker = Self::new(clock, config);
        tracker.todo = read_snapshot(store, &tracker.keys.todo_key).await;
        tracker.habits = read_snapshot(store, &tracker.keys.habit_key).await;
        debug!(
            tasks = tracker.todo.tasks.len(),
            stacks = tracker.habits.stacks.len(),
            "rehydrated state"
        );
        tracker
    }

    pub fn today(&self) -> CalendarDate {
        self.clock.today()
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn todo(&self) -> &TodoState {
        &self.todo
    }

    pub fn habits(&self) -> &HabitState {
        &self.habits
    }

    /// Register a callback for every applied change.
    pub fn subscribe(&mut self, observer: impl FnMut(&Event) + Send + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// True while some change has not been written yet.
    pub fn is_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    // --- tasks ---

    /// Add a task for `date` (default today). Returns the new id, or `None`
    /// for a blank title.
    pub fn add_task(&mut self, title: &str, date: Option<CalendarDate>) -> Option<String> {
        let date = date.unwrap_or_else(|| self.today());
        let next = self.todo.with_task_added(title, date, self.clock.now());
        if next == self.todo {
            return None;
        }
        let task_id = next.tasks.last().map(|t| t.id.clone())?;
        let event = Event::TaskAdded {
            task_id: task_id.clone(),
            date,
            at: self.clock.now(),
        };
        self.replace_todo(next, event);
        Some(task_id)
    }

    pub fn toggle_task(&mut self, id: &str) {
        let next = self.todo.with_task_toggled(id);
        let Some(task) = next.task(id) else {
            return;
        };
        let event = Event::TaskToggled {
            task_id: id.to_string(),
            completed: task.completed,
            date: task.scheduled_date,
            at: self.clock.now(),
        };
        self.replace_todo(next, event);
    }

    pub fn delete_task(&mut self, id: &str) {
        let next = self.todo.with_task_deleted(id);
        let event = Event::TaskDeleted {
            task_id: id.to_string(),
            at: self.clock.now(),
        };
        self.replace_todo(next, event);
    }

    // --- habits ---

    /// Build a stack from drafts and put it first.
    ///
    /// # Errors
    /// Returns the validation failure from [`HabitStack::from_drafts`].
    pub fn add_habit_stack(
        &mut self,
        drafts: &[HabitDraft],
        cadence: Cadence,
        start_date: Option<CalendarDate>,
    ) -> Result<String, ValidationError> {
        let start_date = start_date.unwrap_or_else(|| self.today());
        let stack = HabitStack::from_drafts(
            drafts,
            cadence,
            start_date,
            self.max_stack_size,
            self.clock.now(),
        )?;
        let stack_id = stack.id.clone();
        let next = self.habits.with_stack_added(stack);
        let event = Event::HabitStackAdded {
            stack_id: stack_id.clone(),
            at: self.clock.now(),
        };
        self.replace_habits(next, event);
        Ok(stack_id)
    }

    /// Replace an existing stack. Unknown ids are ignored.
    ///
    /// # Errors
    /// Returns the failure from [`HabitStack::validate`].
    pub fn update_habit_stack(&mut self, stack: HabitStack) -> Result<(), ValidationError> {
        stack.validate(self.max_stack_size)?;
        let event = Event::HabitStackUpdated {
            stack_id: stack.id.clone(),
            at: self.clock.now(),
        };
        let next = self.habits.with_stack_updated(stack);
        self.replace_habits(next, event);
        Ok(())
    }

    pub fn remove_habit_stack(&mut self, id: &str) {
        let next = self.habits.with_stack_removed(id);
        let event = Event::HabitStackRemoved {
            stack_id: id.to_string(),
            at: self.clock.now(),
        };
        self.replace_habits(next, event);
    }

    /// Toggle a stack's completion for `date` (default today).
    pub fn toggle_habit_completion(&mut self, stack_id: &str, date: Option<CalendarDate>) {
        let date = date.unwrap_or_else(|| self.today());
        let next = self.habits.with_completion_toggled(stack_id, date);
        let event = Event::HabitCompletionToggled {
            stack_id: stack_id.to_string(),
            date,
            completed: next.completed_habits.is_completed(stack_id, date),
            at: self.clock.now(),
        };
        self.replace_habits(next, event);
    }

    /// Apply a user reorder of the stacks due on `date`. Returns false (and
    /// changes nothing) when `new_order` does not match the visible stacks.
    pub fn reorder_habit_stacks(&mut self, date: CalendarDate, new_order: &[impl AsRef<str>]) -> bool {
        match self.habits.with_reordered(date, new_order) {
            Ok(next) => {
                let event = Event::HabitStacksReordered {
                    date,
                    at: self.clock.now(),
                };
                self.replace_habits(next, event);
                true
            }
            Err(rejected) => {
                warn!(date = %date, ?rejected, "reorder rejected");
                false
            }
        }
    }

    // --- day lifecycle ---

    /// Roll the day over. Safe to call on every activation: the second call
    /// on the same day changes nothing.
    pub fn reconcile_day(&mut self) -> ReconcileReport {
        let today = self.today();
        let (next, report) = reconcile_with_report(&self.todo, today);
        if report.applied {
            let event = Event::DayReconciled {
                date: today,
                carried: report.carried.len(),
                failed_days: report.failed_days.iter().copied().collect(),
                at: self.clock.now(),
            };
            self.replace_todo(next, event);
        }
        report
    }

    // --- queries ---

    pub fn task_streak(&self) -> u32 {
        compute_streak(&self.todo.completed_days, &self.todo.failed_days, self.today())
    }

    /// Streak of one stack; unknown ids have none.
    pub fn habit_streak(&self, stack_id: &str) -> u32 {
        self.habits
            .stack(stack_id)
            .map(|stack| compute_habit_streak(stack, &self.habits.completed_habits, self.today()))
            .unwrap_or(0)
    }

    pub fn due_stacks(&self, date: CalendarDate) -> Vec<&HabitStack> {
        self.habits.due_on(date)
    }

    /// Selectable days, starting today.
    pub fn day_options(&self) -> Vec<CalendarDate> {
        self.today().upcoming(self.day_options)
    }

    // --- persistence ---

    /// Write every dirty snapshot.
    ///
    /// Snapshots that fail stay dirty; in-memory state is unaffected. Returns
    /// the first failure after attempting all of them.
    ///
    /// # Errors
    /// Returns the first storage or serialization error encountered.
    pub async fn flush<S: KeyValueStore>(&mut self, store: &S) -> Result<(), CoreError> {
        let mut first_error = None;
        for snapshot in std::mem::take(&mut self.dirty) {
            let (key, bytes) = match snapshot {
                Snapshot::Todo => (&self.keys.todo_key, serde_json::to_vec(&self.todo)),
                Snapshot::Habits => (&self.keys.habit_key, serde_json::to_vec(&self.habits)),
            };
            let result = match bytes {
                Ok(bytes) => store.set(key, bytes).await.map_err(CoreError::from),
                Err(e) => Err(CoreError::from(e)),
            };
            match result {
                Ok(()) => debug!(key = %key, "snapshot written"),
                Err(e) => {
                    warn!(key = %key, error = %e, "snapshot write failed; will retry on next flush");
                    self.dirty.insert(snapshot);
                    first_error.get_or_insert(e);
                }
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    fn replace_todo(&mut self, next: TodoState, event: Event) {
        if next == self.todo {
            return;
        }
        self.todo = next;
        self.dirty.insert(Snapshot::Todo);
        self.notify(&event);
    }

    fn replace_habits(&mut self, next: HabitState, event: Event) {
        if next == self.habits {
            return;
        }
        self.habits = next;
        self.dirty.insert(Snapshot::Habits);
        self.notify(&event);
    }

    fn notify(&mut self, event: &Event) {
        debug!(?event, "state changed");
        for observer in &mut self.observers {
            observer(event);
        }
    }
}

async fn read_snapshot<S, T>(store: &S, key: &str) -> T
where
    S: KeyValueStore,
    T: serde::de::DeserializeOwned + Default,
{
    match store.get(key).await {
        Ok(Some(bytes)) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
            warn!(key, error = %e, "unreadable snapshot; starting empty");
            T::default()
        }),
        Ok(None) => T::default(),
        Err(e) => {
            warn!(key, error = %e, "snapshot read failed; starting empty");
            T::default()
        }
    }
}
