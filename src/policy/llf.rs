//! Least-Laxity-First: dynamic priority by remaining slack
//! (spec.md §4.4.3).

use crate::index;
use crate::policy::{laxity_dispatcher_pick, resolve_tie_with_current, MeritList, SchedulabilityReport, Verdict};
use crate::sim::Simulator;
use crate::task::MeritField;

pub fn init(sim: &mut Simulator) -> SchedulabilityReport {
    let utilization = sim.taskset.total_utilization();

    for task in &mut sim.taskset.tasks {
        task.merit_ref = MeritField::Laxity;
    }
    // merit_list membership is static from here on: laxity is recomputed
    // on every release and consulted directly off the task, not off the
    // list's key, so a stale sort position never causes a wrong pick (see
    // DESIGN.md).
    for task in sim.taskset.tasks.clone() {
        index::insert_task(sim.merit.single_list(), task.period - task.cpu_time, &task);
        index::insert_task(&mut sim.request_list, 0, &task);
    }

    let verdict = if utilization <= 1.0 {
        Verdict::Schedulable
    } else {
        Verdict::NotSchedulable
    };

    SchedulabilityReport {
        policy_label: crate::policy::Algorithm::Llf.label(),
        utilization,
        bound: None,
        verdict,
        critical_set: Vec::new(),
        demoted: Vec::new(),
    }
}

pub fn pick_next(sim: &mut Simulator) -> u8 {
    let least = laxity_dispatcher_pick(sim, MeritList::Single);
    resolve_tie_with_current(sim, least)
}

pub fn end(sim: &mut Simulator) {
    sim.deadline_list = index::List::new();
}
