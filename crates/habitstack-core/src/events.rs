use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::calendar::CalendarDate;

/// Every applied state change produces an Event.
/// Observers registered on the tracker receive them in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TaskAdded {
        task_id: String,
        date: CalendarDate,
        at: DateTime<Utc>,
    },
    TaskToggled {
        task_id: String,
        completed: bool,
        date: CalendarDate,
        at: DateTime<Utc>,
    },
    TaskDeleted {
        task_id: String,
        at: DateTime<Utc>,
    },
    HabitStackAdded {
        stack_id: String,
        at: DateTime<Utc>,
    },
    HabitStackUpdated {
        stack_id: String,
        at: DateTime<Utc>,
    },
    HabitStackRemoved {
        stack_id: String,
        at: DateTime<Utc>,
    },
    HabitCompletionToggled {
        stack_id: String,
        date: CalendarDate,
        completed: bool,
        at: DateTime<Utc>,
    },
    /// Stacks due on `date` were rearranged by the user.
    HabitStacksReordered {
        date: CalendarDate,
        at: DateTime<Utc>,
    },
    /// Day rollover ran and changed something.
    DayReconciled {
        date: CalendarDate,
        carried: usize,
        failed_days: Vec<CalendarDate>,
        at: DateTime<Utc>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::date;

    #[test]
    fn serializes_with_type_tag() {
        let event = Event::HabitStacksReordered {
            date: date("2026-02-02"),
            at: DateTime::parse_from_rfc3339("2026-02-02T12:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "HabitStacksReordered");
        assert_eq!(json["date"], "2026-02-02");
    }
}
