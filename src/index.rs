//! The three priority indexes the simulation loop and policies operate on
//! (spec.md §3 "Indexes", §4.1).
//!
//! Each index is an [`OrderedMap`] whose composite key is `(primary, sys_id)`
//! — the task's own `sys_id` doubles as the map's value, so `insert_task`
//! and `remove_task` below need no separate value payload (spec.md's
//! `compose`/recovery trick, minus the bit-packing).

use crate::ordered_map::OrderedMap;
use crate::task::Task;

pub type List = OrderedMap<()>;

/// Inserts `task` into `list` keyed by `primary`, tiebroken by its `sys_id`.
pub fn insert_task(list: &mut List, primary: i64, task: &Task) {
    list.insert(primary, task.sys_id, ());
}

/// Removes `task`'s entry from `list`, keyed by `primary`. Returns whether
/// the entry was present — a `false` here means the caller tried to remove
/// an instance the index didn't know about, a programmer error per
/// spec.md §4.1.
pub fn remove_task(list: &mut List, primary: i64, task: &Task) -> bool {
    list.remove(primary, task.sys_id)
}

/// The head of `list` as a `sys_id`, if any.
pub fn head_sys_id(list: &List) -> Option<u8> {
    list.head().map(|(key, _)| key.1)
}

/// The head of `list` as `(primary, sys_id)`, if any.
pub fn head_key(list: &List) -> Option<(i64, u8)> {
    list.head().map(|(key, _)| key)
}

/// Every `sys_id` currently in `list`, in ascending key order.
pub fn sys_ids(list: &List) -> impl Iterator<Item = u8> + '_ {
    list.iter().map(|(key, _)| key.1)
}

/// Figure-of-merit store owned by the active policy (spec.md §3).
///
/// RM, EDF and LLF use a single `merit_list`. MUF splits it into
/// `high_crit_l` (the guaranteed HIGH-criticality set) and `low_crit_l`
/// (everything else), walked by the laxity dispatcher in that order so HIGH
/// laxities update first (spec.md §4.4.4).
#[derive(Debug, Clone)]
pub enum MeritStore {
    Single(List),
    Split { high: List, low: List },
}

impl MeritStore {
    pub fn single() -> Self {
        MeritStore::Single(List::new())
    }

    pub fn split() -> Self {
        MeritStore::Split {
            high: List::new(),
            low: List::new(),
        }
    }

    /// The list `pick_next` should walk for policies with one merit list.
    /// Panics if called on a `Split` store — RM/EDF/LLF never construct one.
    pub fn single_list(&mut self) -> &mut List {
        match self {
            MeritStore::Single(l) => l,
            MeritStore::Split { .. } => panic!("single_list() called on a split merit store"),
        }
    }

    pub fn single_list_ref(&self) -> &List {
        match self {
            MeritStore::Single(l) => l,
            MeritStore::Split { .. } => panic!("single_list_ref() called on a split merit store"),
        }
    }

    /// The guaranteed HIGH-criticality list. Panics on a `Single` store —
    /// only MUF constructs a split one.
    pub fn high_mut(&mut self) -> &mut List {
        match self {
            MeritStore::Split { high, .. } => high,
            MeritStore::Single(_) => panic!("high_mut() called on a single merit store"),
        }
    }

    /// The best-effort list (LOW tasks plus demoted HIGH tasks).
    pub fn low_mut(&mut self) -> &mut List {
        match self {
            MeritStore::Split { low, .. } => low,
            MeritStore::Single(_) => panic!("low_mut() called on a single merit store"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{Criticality, Task};

    #[test]
    fn insert_and_remove_round_trip() {
        let t = Task::new("A", b'a', Criticality::High, 4, 2);
        let mut list = List::new();
        insert_task(&mut list, 10, &t);
        assert_eq!(head_sys_id(&list), Some(b'a'));
        assert!(remove_task(&mut list, 10, &t));
        assert!(list.is_empty());
    }

    #[test]
    fn remove_absent_entry_reports_false() {
        let t = Task::new("A", b'a', Criticality::High, 4, 2);
        let mut list = List::new();
        assert!(!remove_task(&mut list, 10, &t));
    }

    #[test]
    fn sys_ids_iterates_in_key_order() {
        let a = Task::new("A", b'a', Criticality::High, 5, 1);
        let b = Task::new("B", b'b', Criticality::Low, 3, 1);
        let mut list = List::new();
        insert_task(&mut list, 5, &a);
        insert_task(&mut list, 3, &b);
        assert_eq!(sys_ids(&list).collect::<Vec<_>>(), vec![b'b', b'a']);
    }
}
