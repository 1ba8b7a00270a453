//! Date-keyed completion ledger.
//!
//! Maps each calendar day to the set of ids completed on that day. A day with
//! no entry is simply an empty set. Empty sets are never stored, so toggling
//! an id on and off again yields a ledger equal to the one you started with.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::calendar::CalendarDate;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompletionLedger {
    entries: BTreeMap<CalendarDate, BTreeSet<String>>,
}

impl CompletionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip `key` on `date`. Other dates are never touched.
    pub fn toggle(&mut self, key: &str, date: CalendarDate) {
        let entry = self.entries.entry(date).or_default();
        if !entry.remove(key) {
            entry.insert(key.to_string());
        }
        if entry.is_empty() {
            self.entries.remove(&date);
        }
    }

    /// Value-returning form of [`toggle`](Self::toggle).
    pub fn toggled(&self, key: &str, date: CalendarDate) -> Self {
        let mut next = self.clone();
        next.toggle(key, date);
        next
    }

    pub fn is_completed(&self, key: &str, date: CalendarDate) -> bool {
        self.entries
            .get(&date)
            .is_some_and(|ids| ids.contains(key))
    }

    /// Ids completed on `date`; empty for days with no record.
    pub fn completed_on(&self, date: CalendarDate) -> impl Iterator<Item = &str> {
        self.entries
            .get(&date)
            .into_iter()
            .flat_map(|ids| ids.iter().map(String::as_str))
    }

    /// Drop `key` from every date.
    pub fn purge(&mut self, key: &str) {
        self.entries.retain(|_, ids| {
            ids.remove(key);
            !ids.is_empty()
        });
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn dates(&self) -> impl Iterator<Item = CalendarDate> + '_ {
        self.entries.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::date;
    use proptest::prelude::*;

    #[test]
    fn toggle_marks_then_unmarks() {
        let mut ledger = CompletionLedger::new();
        ledger.toggle("stack-1", date("2026-02-19"));
        assert!(ledger.is_completed("stack-1", date("2026-02-19")));
        ledger.toggle("stack-1", date("2026-02-19"));
        assert!(!ledger.is_completed("stack-1", date("2026-02-19")));
        assert!(ledger.is_empty());
    }

    #[test]
    fn other_dates_are_untouched() {
        let mut ledger = CompletionLedger::new();
        ledger.toggle("stack-1", date("2026-02-18"));
        ledger.toggle("stack-1", date("2026-02-19"));
        assert!(ledger.is_completed("stack-1", date("2026-02-18")));
        assert!(ledger.is_completed("stack-1", date("2026-02-19")));
    }

    #[test]
    fn multiple_ids_per_date() {
        let ledger = CompletionLedger::new()
            .toggled("stack-1", date("2026-02-19"))
            .toggled("stack-2", date("2026-02-19"));
        let ids: Vec<_> = ledger.completed_on(date("2026-02-19")).collect();
        assert_eq!(ids, vec!["stack-1", "stack-2"]);
        assert_eq!(ledger.completed_on(date("2026-02-20")).count(), 0);
    }

    #[test]
    fn purge_removes_key_everywhere() {
        let mut ledger = CompletionLedger::new()
            .toggled("a", date("2026-02-01"))
            .toggled("b", date("2026-02-01"))
            .toggled("a", date("2026-02-02"));
        ledger.purge("a");
        assert!(!ledger.is_completed("a", date("2026-02-01")));
        assert!(ledger.is_completed("b", date("2026-02-01")));
        assert_eq!(ledger.dates().collect::<Vec<_>>(), vec![date("2026-02-01")]);
    }

    #[test]
    fn serializes_as_plain_date_map() {
        let ledger = CompletionLedger::new().toggled("stack-1", date("2026-02-19"));
        let json = serde_json::to_value(&ledger).unwrap();
        assert_eq!(json, serde_json::json!({"2026-02-19": ["stack-1"]}));
    }

    proptest! {
        #[test]
        fn toggle_is_an_involution(
            seed in proptest::collection::vec((0u8..4, 0i64..10), 0..12),
            key in 0u8..4,
            offset in 0i64..10,
        ) {
            let base = date("2026-02-01");
            let mut ledger = CompletionLedger::new();
            for (k, d) in seed {
                ledger.toggle(&format!("s{k}"), base.shift(d));
            }
            let key = format!("s{key}");
            let day = base.shift(offset);
            prop_assert_eq!(ledger.toggled(&key, day).toggled(&key, day), ledger);
        }
    }
}
