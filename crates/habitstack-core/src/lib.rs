//! # habitstack Core Library
//!
//! Recurrence and streak engine for a daily todo list and recurring habit
//! stacks. Everything that decides state is a pure function over explicit
//! values; the [`Tracker`] holds the current values, applies transitions,
//! notifies observers and writes snapshots behind to a key-value store.
//!
//! ## Key Components
//!
//! - [`CalendarDate`] / [`Clock`]: local calendar days and "today"
//! - [`habit::is_due`]: whether a habit stack recurs on a date
//! - [`CompletionLedger`]: per-day completed stack ids
//! - [`todo::reconcile()`]: day rollover for unfinished tasks
//! - [`streak`]: current-streak counters
//! - [`reorder::project_reorder`]: applying a filtered reorder to the full list
//! - [`Tracker`]: the state holder used by front ends

pub mod calendar;
pub mod error;
pub mod events;
pub mod habit;
pub mod ledger;
pub mod reorder;
pub mod storage;
pub mod streak;
pub mod todo;
pub mod tracker;

pub use calendar::{CalendarDate, Clock, FixedClock, SystemClock};
pub use error::{ConfigError, CoreError, StorageError, ValidationError};
pub use events::Event;
pub use habit::{Cadence, CadenceKind, Habit, HabitDraft, HabitStack, HabitState};
pub use ledger::CompletionLedger;
pub use storage::{Config, FileStore, KeyValueStore, MemoryStore};
pub use streak::{compute_habit_streak, compute_streak};
pub use todo::{reconcile, ReconcileReport, Task, TodoState};
pub use tracker::Tracker;
