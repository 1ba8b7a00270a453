//! Habit stacks and their completion state.
//!
//! A stack is an ordered chain of habits: the first one (the anchor) carries
//! the time and place, the rest are performed right after it. Stacks recur on
//! a [`Cadence`] and are completed per day in a [`CompletionLedger`].

pub mod cadence;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub use cadence::{due_stacks, is_due, is_due_on_iso, Cadence, CadenceKind};

use crate::calendar::CalendarDate;
use crate::error::ValidationError;
use crate::ledger::CompletionLedger;
use crate::reorder::{project_reorder, Keyed, ReorderRejected};

/// Most habits a single stack may chain.
pub const MAX_STACK_SIZE: usize = 5;

/// A single step of a stack.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Habit {
    pub id: String,
    pub behaviour: String,
    /// Only meaningful on the anchor.
    #[serde(default)]
    pub time: String,
    /// Only meaningful on the anchor.
    #[serde(default)]
    pub location: String,
}

impl Habit {
    pub fn new(
        id: impl Into<String>,
        behaviour: impl Into<String>,
        time: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            behaviour: behaviour.into(),
            time: time.into(),
            location: location.into(),
        }
    }
}

/// Partially filled habit as it comes out of the editor.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct HabitDraft {
    pub behaviour: Option<String>,
    pub time: Option<String>,
    pub location: Option<String>,
}

impl HabitDraft {
    pub fn behaviour(behaviour: impl Into<String>) -> Self {
        Self {
            behaviour: Some(behaviour.into()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HabitStack {
    pub id: String,
    pub habits: Vec<Habit>,
    pub cadence: Cadence,
    /// Never due before this day.
    pub start_date: CalendarDate,
}

impl HabitStack {
    /// Build a stack from editor drafts.
    ///
    /// Fields are trimmed. Time and location are kept only on the anchor;
    /// chained habits inherit them.
    ///
    /// # Errors
    /// Fails when there are no drafts, more than `max_size`, a blank
    /// behaviour, or an empty cadence.
    pub fn from_drafts(
        drafts: &[HabitDraft],
        cadence: Cadence,
        start_date: CalendarDate,
        max_size: usize,
        now: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        if drafts.is_empty() {
            return Err(ValidationError::EmptyStack);
        }
        if drafts.len() > max_size {
            return Err(ValidationError::StackTooLarge {
                len: drafts.len(),
                max: max_size,
            });
        }
        if cadence.days.is_empty() {
            return Err(ValidationError::EmptyCadenceDays);
        }

        let trimmed = |field: &Option<String>| {
            field.as_deref().map(str::trim).unwrap_or_default().to_string()
        };

        let habits = drafts
            .iter()
            .enumerate()
            .map(|(index, draft)| {
                let behaviour = trimmed(&draft.behaviour);
                if behaviour.is_empty() {
                    return Err(ValidationError::EmptyBehaviour { index });
                }
                let (time, location) = if index == 0 {
                    (trimmed(&draft.time), trimmed(&draft.location))
                } else {
                    (String::new(), String::new())
                };
                Ok(Habit {
                    id: new_id("habit", now),
                    behaviour,
                    time,
                    location,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            id: new_id("stack", now),
            habits,
            cadence,
            start_date,
        })
    }

    /// The first habit of the chain.
    /// Check an edited stack against the same rules [`HabitStack::from_drafts`]
    /// applies to new ones.
    ///
    /// # Errors
    /// Fails on an empty or oversized stack, a blank behaviour, or an empty
    /// or out-of-range cadence day set.
    pub fn validate(&self, max_size: usize) -> Result<(), ValidationError> {
        if self.habits.is_empty() {
            return Err(ValidationError::EmptyStack);
        }
        if self.habits.len() > max_size {
            return Err(ValidationError::StackTooLarge {
                len: self.habits.len(),
                max: max_size,
            });
        }
        if let Some(&bad) = self.cadence.days.iter().find(|&&d| d > 6) {
            return Err(ValidationError::InvalidWeekday(bad));
        }
        if self.cadence.days.is_empty() {
            return Err(ValidationError::EmptyCadenceDays);
        }
        if let Some(index) = self.habits.iter().position(|h| h.behaviour.trim().is_empty()) {
            return Err(ValidationError::EmptyBehaviour { index });
        }
        Ok(())
    }

    pub fn anchor(&self) -> Option<&Habit> {
        self.habits.first()
    }

    pub fn is_due_on(&self, date: CalendarDate) -> bool {
        is_due(self, date)
    }
}

impl Keyed for HabitStack {
    fn key(&self) -> &str {
        &self.id
    }
}

pub(crate) fn new_id(prefix: &str, now: DateTime<Utc>) -> String {
    format!("{prefix}-{}-{}", now.timestamp_millis(), uuid::Uuid::new_v4())
}

/// Persisted habit state: canonical stack order plus the completion ledger.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HabitState {
    #[serde(default)]
    pub stacks: Vec<HabitStack>,
    #[serde(default)]
    pub completed_habits: CompletionLedger,
}

impl HabitState {
    pub fn stack(&self, id: &str) -> Option<&HabitStack> {
        self.stacks.iter().find(|s| s.id == id)
    }

    /// New stacks go to the front of the list.
    pub fn with_stack_added(&self, stack: HabitStack) -> Self {
        debug!(stack_id = %stack.id, habits = stack.habits.len(), "adding habit stack");
        let mut stacks = Vec::with_capacity(self.stacks.len() + 1);
        stacks.push(stack);
        stacks.extend(self.stacks.iter().cloned());
        Self {
            stacks,
            completed_habits: self.completed_habits.clone(),
        }
    }

    /// Replace the stack with the same id in place. Unknown ids are a no-op.
    pub fn with_stack_updated(&self, stack: HabitStack) -> Self {
        let mut next = self.clone();
        match next.stacks.iter_mut().find(|s| s.id == stack.id) {
            Some(slot) => {
                debug!(stack_id = %stack.id, "updating habit stack");
                *slot = stack;
            }
            None => debug!(stack_id = %stack.id, "update for unknown habit stack ignored"),
        }
        next
    }

    /// Remove a stack and forget its completions.
    pub fn with_stack_removed(&self, id: &str) -> Self {
        let mut next = self.clone();
        next.stacks.retain(|s| s.id != id);
        next.completed_habits.purge(id);
        next
    }

    /// Flip a stack's completion on `date`. Unknown ids are a no-op.
    pub fn with_completion_toggled(&self, stack_id: &str, date: CalendarDate) -> Self {
        if self.stack(stack_id).is_none() {
            debug!(stack_id, "toggle for unknown habit stack ignored");
            return self.clone();
        }
        Self {
            stacks: self.stacks.clone(),
            completed_habits: self.completed_habits.toggled(stack_id, date),
        }
    }

    /// Apply a user reorder of the stacks due on `date`.
    ///
    /// # Errors
    /// Returns the rejection when `new_order` is not a permutation of the
    /// stacks due that day.
    pub fn with_reordered(
        &self,
        date: CalendarDate,
        new_order: &[impl AsRef<str>],
    ) -> Result<Self, ReorderRejected> {
        let stacks = project_reorder(&self.stacks, |s| is_due(s, date), new_order)?;
        Ok(Self {
            stacks,
            completed_habits: self.completed_habits.clone(),
        })
    }

    pub fn due_on(&self, date: CalendarDate) -> Vec<&HabitStack> {
        due_stacks(&self.stacks, date)
    }
}
