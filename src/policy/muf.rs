//! Maximum-Urgency-First: HIGH-criticality tasks run a guaranteed RM-style
//! admission test up front; everything that doesn't fit (plus all LOW
//! tasks) falls back to best-effort laxity scheduling (spec.md §4.4.4).

use crate::index::{self, MeritStore};
use crate::policy::{laxity_dispatcher_pick, resolve_tie_with_current, MeritList, SchedulabilityReport, Verdict};
use crate::sim::{Diagnostic, Simulator};
use crate::task::{Criticality, MeritField};
use tracing::warn;

pub fn init(sim: &mut Simulator) -> SchedulabilityReport {
    let utilization = sim.taskset.total_utilization();

    sim.merit = MeritStore::split();
    for task in &mut sim.taskset.tasks {
        task.merit_ref = MeritField::Laxity;
    }

    // Walk tasks in period order (shortest period = tightest constraint
    // first) deciding HIGH-criticality admission into the guaranteed set.
    let mut by_period = sim.taskset.tasks.clone();
    by_period.sort_by_key(|t| (t.period, t.sys_id));

    let mut high_running = 0.0;
    let mut critical_set_ok = true;
    let mut critical_set = Vec::new();
    let mut demoted = Vec::new();

    for task in &by_period {
        index::insert_task(&mut sim.request_list, 0, task);

        match task.criticality {
            Criticality::High if critical_set_ok && high_running + task.utilization() <= 1.0 => {
                high_running += task.utilization();
                critical_set.push(task.name.clone());
                index::insert_task(
                    sim.merit.high_mut(),
                    task.period - task.cpu_time,
                    task,
                );
            }
            Criticality::High => {
                critical_set_ok = false;
                warn!(name = %task.name, "MUF: demoting HIGH-criticality task to best-effort set");
                sim.diagnostics.push(Diagnostic::MufDemotion {
                    name: task.name.clone(),
                });
                demoted.push(task.name.clone());
                index::insert_task(
                    sim.merit.low_mut(),
                    task.period - task.cpu_time,
                    task,
                );
            }
            Criticality::Low => {
                index::insert_task(
                    sim.merit.low_mut(),
                    task.period - task.cpu_time,
                    task,
                );
            }
        }
    }

    let verdict = if utilization > 1.0 {
        Verdict::NotSchedulable
    } else {
        Verdict::MayBeSchedulable
    };

    SchedulabilityReport {
        policy_label: crate::policy::Algorithm::Muf.label(),
        utilization,
        bound: None,
        verdict,
        critical_set,
        demoted,
    }
}

pub fn pick_next(sim: &mut Simulator) -> u8 {
    // HIGH updates before LOW every tick, so a HIGH instance's laxity is
    // never stale when a LOW pick is compared against it (spec.md §4.4.4).
    let high = laxity_dispatcher_pick(sim, MeritList::High);
    let low = laxity_dispatcher_pick(sim, MeritList::Low);
    let least = if high == crate::task::IDLE_SYS_ID { low } else { high };
    resolve_tie_with_current(sim, least)
}

pub fn end(sim: &mut Simulator) {
    sim.deadline_list = index::List::new();
    if let crate::index::MeritStore::Split { low, .. } = &mut sim.merit {
        *low = index::List::new();
    }
}
