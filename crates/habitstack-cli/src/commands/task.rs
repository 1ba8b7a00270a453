//! Task management commands for CLI.

use clap::Subcommand;
use habitstack_core::CalendarDate;
use serde_json::json;

use super::{print_json, CliTracker};

#[derive(Subcommand)]
pub enum TaskAction {
    /// Add a task
    Add {
        /// Task title
        title: String,
        /// Day to schedule it on (default: today)
        #[arg(long)]
        date: Option<CalendarDate>,
    },
    /// List tasks, pending first
    List {
        /// Only tasks scheduled on this day
        #[arg(long)]
        date: Option<CalendarDate>,
    },
    /// Toggle a task's completion
    Toggle {
        /// Task ID
        id: String,
    },
    /// Delete a task
    Delete {
        /// Task ID
        id: String,
    },
    /// Current task streak and day markers
    Streak,
}

pub fn run(action: TaskAction, tracker: &mut CliTracker) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        TaskAction::Add { title, date } => match tracker.add_task(&title, date) {
            Some(id) => {
                println!("Task created: {id}");
                if let Some(task) = tracker.todo().task(&id) {
                    print_json(task)?;
                }
            }
            None => return Err("task title is empty".into()),
        },
        TaskAction::List { date } => {
            let tasks: Vec<_> = tracker
                .todo()
                .sorted_tasks()
                .into_iter()
                .filter(|t| date.map_or(true, |d| t.scheduled_date == d))
                .collect();
            print_json(&tasks)?;
        }
        TaskAction::Toggle { id } => {
            if tracker.todo().task(&id).is_none() {
                return Err(format!("Task not found: {id}").into());
            }
            tracker.toggle_task(&id);
            if let Some(task) = tracker.todo().task(&id) {
                print_json(task)?;
            }
        }
        TaskAction::Delete { id } => {
            if tracker.todo().task(&id).is_none() {
                return Err(format!("Task not found: {id}").into());
            }
            tracker.delete_task(&id);
            println!("Task deleted: {id}");
        }
        TaskAction::Streak => {
            let todo = tracker.todo();
            print_json(&json!({
                "today": tracker.today(),
                "streak": tracker.task_streak(),
                "completedDays": todo.completed_days,
                "failedDays": todo.failed_days,
            }))?;
        }
    }
    Ok(())
}
