//! Day rollover and calendar commands for CLI.

use clap::Subcommand;
use habitstack_core::ReconcileReport;
use serde_json::json;

use super::{print_json, CliTracker};

#[derive(Subcommand)]
pub enum DayAction {
    /// Roll the day over: carry unfinished tasks, mark failed days
    Reconcile,
    /// Selectable days starting today
    Options,
}

/// `rollover` is the report from the reconcile every invocation runs first.
pub fn run(
    action: DayAction,
    tracker: &mut CliTracker,
    rollover: ReconcileReport,
) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        DayAction::Reconcile => {
            let report = rollover;
            print_json(&json!({
                "today": tracker.today(),
                "applied": report.applied,
                "carried": report.carried,
                "failedDays": report.failed_days,
            }))?;
        }
        DayAction::Options => {
            let options: Vec<_> = tracker
                .day_options()
                .into_iter()
                .map(|date| json!({ "date": date, "weekday": date.weekday() }))
                .collect();
            print_json(&options)?;
        }
    }
    Ok(())
}
