pub mod config;
pub mod day;
pub mod habit;
pub mod task;

use chrono::{DateTime, Utc};
use habitstack_core::{CalendarDate, Clock};
use serde::Serialize;

/// Wall-clock timestamps, but "today" can be pinned with `--today`.
#[derive(Debug, Clone, Copy)]
pub struct CliClock {
    today: CalendarDate,
}

impl CliClock {
    pub fn new(today: CalendarDate) -> Self {
        Self { today }
    }
}

impl Clock for CliClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn today(&self) -> CalendarDate {
        self.today
    }
}

pub type CliTracker = habitstack_core::Tracker<CliClock>;

pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
