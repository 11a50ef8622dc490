use std::collections::{HashMap, HashSet};

use crate::domain::value_objects::recurring_task::RecurringTask;

/// Whether a persisted, identifier-keyed recurring task set differs from an
/// in-memory task list, compared as multisets.
///
/// Recurring tasks have no identity of their own, so the persisted row ids
/// cannot be lined up with list positions; instead each persisted entry
/// greedily consumes one structurally-equal slot of the list, and duplicates
/// are only matched as many times as they appear. O(n²), which is fine for
/// per-schedule task counts.
pub fn any_tasks_modified(
    persisted: &HashMap<i64, RecurringTask>,
    current: &[RecurringTask],
) -> bool {
    if persisted.len() != current.len() {
        return true;
    }
    let mut used: HashSet<usize> = HashSet::new();
    for task in persisted.values() {
        let matched = current
            .iter()
            .enumerate()
            .find(|(i, candidate)| !used.contains(i) && *candidate == task)
            .map(|(i, _)| i);
        match matched {
            Some(i) => {
                used.insert(i);
            }
            None => return true,
        }
    }
    false
}
