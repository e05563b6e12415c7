//! Rate Monotonic: static priority by period, shortest period first
//! (spec.md §4.4.1).

use crate::index;
use crate::policy::{default_dispatcher, SchedulabilityReport, Verdict};
use crate::sim::Simulator;
use crate::task::MeritField;

/// Liu–Layland sufficient-schedulability bound for `n` tasks:
/// `n * (2^(1/n) - 1)`.
pub fn liu_layland_bound(n: usize) -> f64 {
    let n = n as f64;
    n * (2f64.powf(1.0 / n) - 1.0)
}

pub fn init(sim: &mut Simulator) -> SchedulabilityReport {
    let n = sim.taskset.num_tasks();
    let bound = liu_layland_bound(n);
    let utilization = sim.taskset.total_utilization();

    for task in &mut sim.taskset.tasks {
        task.merit_ref = MeritField::Period;
    }
    for task in sim.taskset.tasks.clone() {
        index::insert_task(sim.merit.single_list(), task.period, &task);
        index::insert_task(&mut sim.request_list, 0, &task);
    }

    // Walk the merit list (ascending period) accumulating load to report
    // the guaranteed critical set (spec.md §4.4.1).
    let mut critical_set = Vec::new();
    let mut running_load = 0.0;
    for sys_id in index::sys_ids(sim.merit.single_list_ref()).collect::<Vec<_>>() {
        let task = sim.task_ref(sys_id);
        running_load += task.utilization();
        if running_load <= bound {
            critical_set.push(task.name.clone());
        }
    }

    let verdict = if utilization > 1.0 {
        Verdict::NotSchedulable
    } else if utilization <= bound {
        Verdict::Schedulable
    } else {
        Verdict::MayNotBeSchedulable
    };

    SchedulabilityReport {
        policy_label: crate::policy::Algorithm::Rm.label(),
        utilization,
        bound: Some(bound),
        verdict,
        critical_set,
        demoted: Vec::new(),
    }
}

pub fn pick_next(sim: &mut Simulator) -> u8 {
    default_dispatcher(sim)
}

pub fn end(sim: &mut Simulator) {
    sim.deadline_list = index::List::new();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bound_matches_known_values() {
        assert!((liu_layland_bound(1) - 1.0).abs() < 1e-9);
        assert!((liu_layland_bound(2) - 0.8284271).abs() < 1e-6);
    }
}
