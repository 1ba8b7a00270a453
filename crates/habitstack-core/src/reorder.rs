//! Projection of a reordered filtered view back onto the canonical list.
//!
//! The user only sees (and drags) the items that pass the current filter.
//! The positions those items occupy in the full list are kept as slots; the
//! new order is written into exactly those slots, so hidden items keep their
//! places and their interleaving with visible ones.

use std::collections::{HashMap, HashSet};

/// Anything that carries a stable string key.
pub trait Keyed {
    fn key(&self) -> &str;
}

/// Outcome of a rejected projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReorderRejected {
    /// New order has a different length than the visible subset
    LengthMismatch { visible: usize, given: usize },
    /// New order names a key that is not visible, or repeats one
    UnknownOrDuplicate(String),
}

/// Write `new_order` (keys of the visible items) into the canonical slots
/// occupied by the items for which `is_visible` holds.
///
/// `new_order` must be a permutation of the visible keys.
pub fn project_reorder<T, F, S>(
    canonical: &[T],
    is_visible: F,
    new_order: &[S],
) -> Result<Vec<T>, ReorderRejected>
where
    T: Keyed + Clone,
    F: Fn(&T) -> bool,
    S: AsRef<str>,
{
    let slots: Vec<usize> = canonical
        .iter()
        .enumerate()
        .filter(|(_, item)| is_visible(item))
        .map(|(i, _)| i)
        .collect();

    if slots.len() != new_order.len() {
        return Err(ReorderRejected::LengthMismatch {
            visible: slots.len(),
            given: new_order.len(),
        });
    }

    let visible: HashMap<&str, &T> = slots
        .iter()
        .map(|&i| (canonical[i].key(), &canonical[i]))
        .collect();

    let mut seen = HashSet::with_capacity(new_order.len());
    let mut projected = canonical.to_vec();
    for (&slot, key) in slots.iter().zip(new_order) {
        let key = key.as_ref();
        let item = match visible.get(key) {
            Some(item) if seen.insert(key) => *item,
            _ => return Err(ReorderRejected::UnknownOrDuplicate(key.to_string())),
        };
        projected[slot] = item.clone();
    }
    Ok(projected)
}
