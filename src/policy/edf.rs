//! Earliest-Deadline-First: dynamic priority by absolute deadline
//! (spec.md §4.4.2).
//!
//! Unlike RM, LLF and MUF, EDF's merit list is not populated once at init —
//! it has to track `deadline_list` release-for-release, since a task's
//! figure of merit (its deadline) changes every period. `Simulator::
//! insert_deadline_entry`/`remove_deadline_entry` keep the two indexes in
//! lockstep on EDF's behalf.

use crate::index;
use crate::policy::{default_dispatcher, SchedulabilityReport, Verdict};
use crate::sim::Simulator;
use crate::task::MeritField;

pub fn init(sim: &mut Simulator) -> SchedulabilityReport {
    let utilization = sim.taskset.total_utilization();

    for task in &mut sim.taskset.tasks {
        task.merit_ref = MeritField::Deadline;
    }
    for task in sim.taskset.tasks.clone() {
        index::insert_task(&mut sim.request_list, 0, &task);
    }

    let verdict = if utilization <= 1.0 {
        Verdict::Schedulable
    } else {
        Verdict::NotSchedulable
    };

    SchedulabilityReport {
        policy_label: crate::policy::Algorithm::Edf.label(),
        utilization,
        bound: None,
        verdict,
        critical_set: Vec::new(),
        demoted: Vec::new(),
    }
}

pub fn pick_next(sim: &mut Simulator) -> u8 {
    default_dispatcher(sim)
}

pub fn end(sim: &mut Simulator) {
    sim.deadline_list = index::List::new();
}
