//! Scheduling policies: Rate Monotonic, Earliest-Deadline-First,
//! Least-Laxity-First and Maximum-Urgency-First (spec.md §4.4).
//!
//! Each policy supplies `init`, `pick_next` and `end`. The four are fixed
//! and known at compile time, so they are represented as a closed `enum`
//! dispatching to a sibling module per variant, rather than the
//! function-pointer table the legacy implementation used (spec.md §9
//! "Polymorphic policy" — a tagged variant is the idiomatic Rust shape for
//! a closed set of interchangeable behaviors).

pub mod edf;
pub mod llf;
pub mod muf;
pub mod rm;

use crate::sim::Simulator;
use crate::task::TaskState;

/// Which of the four policies is driving a [`Simulator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    Rm,
    Edf,
    Llf,
    Muf,
}

impl Algorithm {
    pub fn label(self) -> &'static str {
        match self {
            Algorithm::Rm => "Rate Monotonic (RM)",
            Algorithm::Edf => "Earliest-Deadline-First (EDF)",
            Algorithm::Llf => "Least-Laxity-First (LLF)",
            Algorithm::Muf => "Maximum-Urgency-First (MUF)",
        }
    }

    /// Runs this policy's `init` hook, installing indexes on `sim` and
    /// returning the static schedulability assessment.
    pub fn init(self, sim: &mut Simulator) -> SchedulabilityReport {
        match self {
            Algorithm::Rm => rm::init(sim),
            Algorithm::Edf => edf::init(sim),
            Algorithm::Llf => llf::init(sim),
            Algorithm::Muf => muf::init(sim),
        }
    }

    /// Runs this policy's `pick_next` hook, returning the `sys_id` of the
    /// task that should occupy the processor for the tick about to run.
    pub fn pick_next(self, sim: &mut Simulator) -> u8 {
        match self {
            Algorithm::Rm => rm::pick_next(sim),
            Algorithm::Edf => edf::pick_next(sim),
            Algorithm::Llf => llf::pick_next(sim),
            Algorithm::Muf => muf::pick_next(sim),
        }
    }

    /// Runs this policy's `end` hook, releasing policy-owned indexes.
    pub fn end(self, sim: &mut Simulator) {
        match self {
            Algorithm::Rm => rm::end(sim),
            Algorithm::Edf => edf::end(sim),
            Algorithm::Llf => llf::end(sim),
            Algorithm::Muf => muf::end(sim),
        }
    }

    /// Whether this policy applies the `+1` laxity pre-correction at
    /// release (spec.md §4.3) — LLF and MUF only.
    pub fn pre_corrects_laxity(self) -> bool {
        matches!(self, Algorithm::Llf | Algorithm::Muf)
    }
}

/// Static schedulability verdict (spec.md §4.4, Glossary "Liu–Layland
/// bound").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// `U` is within the policy's sufficient bound.
    Schedulable,
    /// `U > 1`: infeasible regardless of policy.
    NotSchedulable,
    /// `U` exceeds the sufficient (but not necessary) RM bound, yet `U <= 1`.
    MayNotBeSchedulable,
    /// MUF's best-effort verdict when `U <= 1` but demotions occurred.
    MayBeSchedulable,
}

/// Static schedulability report produced by a policy's `init` hook.
#[derive(Debug, Clone)]
pub struct SchedulabilityReport {
    pub policy_label: &'static str,
    pub utilization: f64,
    /// The Liu–Layland bound, for RM only.
    pub bound: Option<f64>,
    pub verdict: Verdict,
    /// Names of tasks in the guaranteed/critical set, in merit order
    /// (RM, MUF).
    pub critical_set: Vec<String>,
    /// Names of HIGH-criticality tasks MUF could not admit into the
    /// guaranteed set (spec.md §4.4.4).
    pub demoted: Vec<String>,
}

/// `default_dispatcher` (spec.md §4.4.5): used by RM and EDF.
///
/// Walks `merit_list` in ascending key order for the first entry whose
/// state is eligible (`>= Ready`). The list's order reflects the current
/// figure of merit only for policies that keep it correctly sorted — true
/// for RM (period never changes) and EDF (merit_list is refreshed on every
/// release, see `edf::on_release`).
pub(crate) fn default_dispatcher(sim: &mut Simulator) -> u8 {
    let candidate = {
        let list = sim.merit.single_list_ref();
        let mut found = None;
        for (key, _) in list.iter() {
            let sys_id = key.1;
            if sim.task_ref(sys_id).state >= TaskState::Ready {
                found = Some(sys_id);
                break;
            }
        }
        found
    };

    let candidate = match candidate {
        Some(c) => c,
        None => return crate::task::IDLE_SYS_ID,
    };

    if sim.current == crate::task::IDLE_SYS_ID {
        return candidate;
    }
    if sim.task_ref(candidate).merit() == sim.task_ref(sim.current).merit() {
        sim.current
    } else {
        candidate
    }
}

/// `update_laxity_and_get_least` (spec.md §4.4.3): used by LLF directly and
/// by MUF on each of its two lists.
///
/// Every entry whose state is `Ready` loses one laxity unit; if that drives
/// it negative the instance is blocked and a diagnostic is recorded. Of the
/// entries left `Ready` or `Running`, the one with the smallest laxity wins
/// (idle, at `i64::MAX`, if none are eligible).
pub(crate) fn laxity_dispatcher_pick(sim: &mut Simulator, list: MeritList) -> u8 {
    let sys_ids: Vec<u8> = {
        let l = list.get(sim);
        l.iter().map(|(key, _)| key.1).collect()
    };

    let now = sim.sys_time;
    for sys_id in &sys_ids {
        let sys_id = *sys_id;
        let exhausted = {
            let task = sim.task_mut(sys_id);
            if task.state == TaskState::Ready {
                task.laxity -= 1;
                task.laxity < 0
            } else {
                false
            }
        };
        if exhausted {
            let (name, instance, deadline) = {
                let task = sim.task_mut(sys_id);
                task.state = TaskState::Blocked;
                (task.name.clone(), task.instance, task.deadline)
            };
            sim.emit_laxity_exhausted(now, sys_id, name, instance, deadline);
        }
    }

    let mut least = crate::task::IDLE_SYS_ID;
    let mut least_laxity = i64::MAX;
    for sys_id in sys_ids {
        let task = sim.task_ref(sys_id);
        if (task.state == TaskState::Ready || task.state == TaskState::Running)
            && task.laxity < least_laxity
        {
            least_laxity = task.laxity;
            least = sys_id;
        }
    }
    least
}

/// Selects which of `sim`'s merit lists `laxity_dispatcher_pick` should walk.
#[derive(Debug, Clone, Copy)]
pub(crate) enum MeritList {
    Single,
    High,
    Low,
}

impl MeritList {
    fn get<'a>(self, sim: &'a mut Simulator) -> &'a crate::index::List {
        match (self, &sim.merit) {
            (MeritList::Single, crate::index::MeritStore::Single(l)) => l,
            (MeritList::High, crate::index::MeritStore::Split { high, .. }) => high,
            (MeritList::Low, crate::index::MeritStore::Split { low, .. }) => low,
            _ => panic!("merit list selector does not match the installed merit store"),
        }
    }
}

/// Resolves a laxity-dispatcher pick against the currently running task:
/// the incumbent wins ties, same as `default_dispatcher` (spec.md §4.4.3,
/// §4.4.4).
pub(crate) fn resolve_tie_with_current(sim: &Simulator, least: u8) -> u8 {
    if least == crate::task::IDLE_SYS_ID {
        return crate::task::IDLE_SYS_ID;
    }
    if sim.current == crate::task::IDLE_SYS_ID {
        return least;
    }
    if sim.task_ref(least).merit() == sim.task_ref(sim.current).merit() {
        sim.current
    } else {
        least
    }
}
