//! Habit stack commands for CLI.

use clap::Subcommand;
use habitstack_core::{Cadence, CadenceKind, CalendarDate, HabitDraft};
use serde_json::json;

use super::{print_json, CliTracker};

#[derive(Subcommand)]
pub enum HabitAction {
    /// Create a stack; the first behaviour is the anchor
    Add {
        /// Behaviours in order (anchor first)
        #[arg(required = true)]
        behaviours: Vec<String>,
        /// Anchor time, e.g. "07:30"
        #[arg(long)]
        time: Option<String>,
        /// Anchor location
        #[arg(long)]
        location: Option<String>,
        /// daily, weekdays, weekends, weekly or fortnightly
        #[arg(long, default_value = "daily")]
        cadence: CadenceKind,
        /// Comma-separated weekdays, 0 = Sunday (default: the preset's days)
        #[arg(long, value_delimiter = ',')]
        days: Option<Vec<u8>>,
        /// First day the stack is due (default: today)
        #[arg(long)]
        start: Option<CalendarDate>,
    },
    /// List all stacks in canonical order
    List,
    /// Stacks due on a day, with completion state
    Due {
        /// Day to check (default: today)
        #[arg(long)]
        date: Option<CalendarDate>,
    },
    /// Toggle a stack's completion
    Toggle {
        /// Stack ID
        id: String,
        /// Day to toggle (default: today)
        #[arg(long)]
        date: Option<CalendarDate>,
    },
    /// Edit a stack's cadence or start date
    Update {
        /// Stack ID
        id: String,
        #[arg(long)]
        cadence: Option<CadenceKind>,
        /// Comma-separated weekdays, 0 = Sunday
        #[arg(long, value_delimiter = ',')]
        days: Option<Vec<u8>>,
        #[arg(long)]
        start: Option<CalendarDate>,
    },
    /// Delete a stack and its completion history
    Remove {
        /// Stack ID
        id: String,
    },
    /// Reorder the stacks due on a day
    Reorder {
        /// Stack IDs in their new order
        #[arg(required = true)]
        ids: Vec<String>,
        /// Day whose due stacks are being reordered (default: today)
        #[arg(long)]
        date: Option<CalendarDate>,
    },
    /// Current streak of one stack
    Streak {
        /// Stack ID
        id: String,
    },
    /// Days a preset selects, and which it disables
    Days {
        cadence: CadenceKind,
    },
}

pub fn run(action: HabitAction, tracker: &mut CliTracker) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        HabitAction::Add {
            behaviours,
            time,
            location,
            cadence,
            days,
            start,
        } => {
            let drafts: Vec<HabitDraft> = behaviours
                .into_iter()
                .enumerate()
                .map(|(i, behaviour)| HabitDraft {
                    behaviour: Some(behaviour),
                    time: if i == 0 { time.clone() } else { None },
                    location: if i == 0 { location.clone() } else { None },
                })
                .collect();
            let cadence = match days {
                Some(days) => Cadence::new(cadence, days)?,
                None => Cadence::preset(cadence, tracker.today()),
            };
            let id = tracker.add_habit_stack(&drafts, cadence, start)?;
            println!("Habit stack created: {id}");
            if let Some(stack) = tracker.habits().stack(&id) {
                print_json(stack)?;
            }
        }
        HabitAction::List => {
            print_json(&tracker.habits().stacks)?;
        }
        HabitAction::Due { date } => {
            let date = date.unwrap_or_else(|| tracker.today());
            let ledger = &tracker.habits().completed_habits;
            let due: Vec<_> = tracker
                .due_stacks(date)
                .into_iter()
                .map(|stack| {
                    json!({
                        "stack": stack,
                        "completed": ledger.is_completed(&stack.id, date),
                    })
                })
                .collect();
            print_json(&due)?;
        }
        HabitAction::Toggle { id, date } => {
            if tracker.habits().stack(&id).is_none() {
                return Err(format!("Habit stack not found: {id}").into());
            }
            let date = date.unwrap_or_else(|| tracker.today());
            tracker.toggle_habit_completion(&id, Some(date));
            let completed = tracker.habits().completed_habits.is_completed(&id, date);
            print_json(&json!({ "id": id, "date": date, "completed": completed }))?;
        }
        HabitAction::Update {
            id,
            cadence,
            days,
            start,
        } => {
            let mut stack = tracker
                .habits()
                .stack(&id)
                .cloned()
                .ok_or_else(|| format!("Habit stack not found: {id}"))?;

            match (cadence, days) {
                (Some(kind), Some(days)) => stack.cadence = Cadence::new(kind, days)?,
                (Some(kind), None) => stack.cadence = Cadence::preset(kind, tracker.today()),
                (None, Some(days)) => stack.cadence = Cadence::new(stack.cadence.kind, days)?,
                (None, None) => {}
            }
            if let Some(start) = start {
                stack.start_date = start;
            }
            tracker.update_habit_stack(stack)?;
            if let Some(stack) = tracker.habits().stack(&id) {
                print_json(stack)?;
            }
        }
        HabitAction::Remove { id } => {
            if tracker.habits().stack(&id).is_none() {
                return Err(format!("Habit stack not found: {id}").into());
            }
            tracker.remove_habit_stack(&id);
            println!("Habit stack deleted: {id}");
        }
        HabitAction::Reorder { ids, date } => {
            let date = date.unwrap_or_else(|| tracker.today());
            if !tracker.reorder_habit_stacks(date, &ids) {
                return Err(format!(
                    "order must list exactly the stacks due on {date}"
                )
                .into());
            }
            let order: Vec<_> = tracker.habits().stacks.iter().map(|s| &s.id).collect();
            print_json(&order)?;
        }
        HabitAction::Streak { id } => {
            if tracker.habits().stack(&id).is_none() {
                return Err(format!("Habit stack not found: {id}").into());
            }
            print_json(&json!({
                "id": id,
                "today": tracker.today(),
                "streak": tracker.habit_streak(&id),
            }))?;
        }
        HabitAction::Days { cadence } => {
            let disabled: Vec<u8> = (0..=6).filter(|&d| cadence.is_day_disabled(d)).collect();
            print_json(&json!({
                "cadence": cadence,
                "days": cadence.default_days(tracker.today()),
                "disabled": disabled,
            }))?;
        }
    }
    Ok(())
}
