//! The discrete-event simulation core (spec.md §4.5): a tick-by-tick loop
//! over a [`TaskSet`] driven by a [`Algorithm`], producing a history of
//! which task held the processor each tick plus any diagnostics raised
//! along the way.

use std::collections::HashMap;

use tracing::warn;

use crate::index::{self, List, MeritStore};
use crate::policy::{Algorithm, SchedulabilityReport};
use crate::task::{Task, TaskState, IDLE_SYS_ID};
use crate::taskset::TaskSet;

/// A notable event surfaced during simulation, for the renderer's inline
/// diagnostics panel (spec.md §6.4).
#[derive(Debug, Clone)]
pub enum Diagnostic {
    /// An instance's deadline arrived before it finished (spec.md §4.5
    /// step 2).
    DeadlineMiss {
        tick: i64,
        sys_id: u8,
        name: String,
        instance: u64,
    },
    /// A HIGH-criticality task's instance ran its laxity to zero under LLF
    /// or MUF and was blocked for the remainder of its period (spec.md
    /// §4.4.3).
    LaxityExhausted {
        tick: i64,
        sys_id: u8,
        name: String,
        instance: u64,
        deadline: i64,
    },
    /// MUF could not admit a HIGH-criticality task into the guaranteed set
    /// at init (spec.md §4.4.4).
    MufDemotion { name: String },
}

/// Owns every piece of mutable state the simulation touches: the task set,
/// the three priority indexes, and the tick-by-tick trace.
pub struct Simulator {
    pub taskset: TaskSet,
    handle_index: HashMap<u8, usize>,
    pub algorithm: Algorithm,

    /// Pending releases, keyed by next-release tick (spec.md §4.5 step 3).
    pub request_list: List,
    /// Live instances, keyed by deadline (spec.md §4.5 step 2).
    pub deadline_list: List,
    /// The policy's figure-of-merit index (spec.md §4.4).
    pub merit: MeritStore,

    pub current: u8,
    pub sys_time: i64,
    pub context_switches: u64,
    /// `sys_id` occupying the processor at each tick, `0..=max_time`.
    pub history: Vec<u8>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Simulator {
    pub fn new(taskset: TaskSet, algorithm: Algorithm) -> Self {
        let handle_index = taskset
            .tasks
            .iter()
            .enumerate()
            .map(|(i, t)| (t.sys_id, i))
            .collect();
        Self {
            taskset,
            handle_index,
            algorithm,
            request_list: List::new(),
            deadline_list: List::new(),
            merit: MeritStore::single(),
            current: IDLE_SYS_ID,
            sys_time: 0,
            context_switches: 0,
            history: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    pub(crate) fn task_ref(&self, sys_id: u8) -> &Task {
        if sys_id == IDLE_SYS_ID {
            &self.taskset.idle
        } else {
            &self.taskset.tasks[self.handle_index[&sys_id]]
        }
    }

    pub(crate) fn task_mut(&mut self, sys_id: u8) -> &mut Task {
        if sys_id == IDLE_SYS_ID {
            &mut self.taskset.idle
        } else {
            let idx = self.handle_index[&sys_id];
            &mut self.taskset.tasks[idx]
        }
    }

    pub(crate) fn emit_laxity_exhausted(
        &mut self,
        tick: i64,
        sys_id: u8,
        name: String,
        instance: u64,
        deadline: i64,
    ) {
        warn!(
            tick,
            sys_id = %(sys_id as char),
            name = %name,
            instance,
            deadline,
            "laxity exhausted, blocking instance"
        );
        self.diagnostics.push(Diagnostic::LaxityExhausted {
            tick,
            sys_id,
            name,
            instance,
            deadline,
        });
    }

    /// Inserts `sys_id`'s current instance into `deadline_list`, and, for
    /// EDF, also into the single merit list — the two indexes are kept in
    /// lockstep rather than aliased to the same storage, since EDF's merit
    /// list must never contain a stale entry for a task whose state has
    /// since changed (see DESIGN.md).
    fn insert_deadline_entry(&mut self, sys_id: u8) {
        let deadline = self.task_ref(sys_id).deadline;
        let task = self.task_ref(sys_id).clone();
        index::insert_task(&mut self.deadline_list, deadline, &task);
        if matches!(self.algorithm, Algorithm::Edf) {
            index::insert_task(self.merit.single_list(), deadline, &task);
        }
    }

    /// Removes `sys_id`'s entry (keyed by `primary`) from `deadline_list`
    /// and, for EDF, the merit list too.
    fn remove_deadline_entry(&mut self, primary: i64, sys_id: u8) {
        let task = self.task_ref(sys_id).clone();
        index::remove_task(&mut self.deadline_list, primary, &task);
        if matches!(self.algorithm, Algorithm::Edf) {
            index::remove_task(self.merit.single_list(), primary, &task);
        }
    }

    fn merit_all_empty(&self) -> bool {
        match &self.merit {
            MeritStore::Single(l) => l.is_empty(),
            MeritStore::Split { high, low } => high.is_empty() && low.is_empty(),
        }
    }

    /// Runs the simulation to completion: the policy's `init`, the tick
    /// loop, and the policy's `end` (spec.md §4.5).
    ///
    /// Terminates when both `merit_list` (or its split halves) and
    /// `request_list` are empty, or `sys_time` exceeds `max_time` —
    /// whichever comes first.
    pub fn run(mut self) -> (Self, SchedulabilityReport) {
        let algorithm = self.algorithm;
        let report = algorithm.init(&mut self);

        while (!self.merit_all_empty() || !self.request_list.is_empty())
            && self.sys_time <= self.taskset.max_time
        {
            self.tick(algorithm);
        }

        algorithm.end(&mut self);
        (self, report)
    }

    fn tick(&mut self, algorithm: Algorithm) {
        let now = self.sys_time;

        // Step 1: account for the tick just spent running `current`.
        if self.current != IDLE_SYS_ID {
            let finished = {
                let task = self.task_mut(self.current);
                task.remaining -= 1;
                task.remaining == 0
            };
            if finished {
                let deadline = {
                    let task = self.task_mut(self.current);
                    task.state = TaskState::Dead;
                    task.cycles += 1;
                    task.deadline
                };
                self.remove_deadline_entry(deadline, self.current);
                self.current = IDLE_SYS_ID;
            }
        }

        // Step 2: sweep deadlines that have arrived; anything still alive
        // missed its deadline.
        while let Some((primary, sys_id)) = index::head_key(&self.deadline_list) {
            if primary > now {
                break;
            }
            let still_alive = self.task_ref(sys_id).state != TaskState::Dead;
            if still_alive {
                let (name, instance) = {
                    let task = self.task_ref(sys_id);
                    (task.name.clone(), task.instance)
                };
                warn!(tick = now, sys_id = %(sys_id as char), name = %name, instance, "deadline miss");
                self.diagnostics.push(Diagnostic::DeadlineMiss {
                    tick: now,
                    sys_id,
                    name,
                    instance,
                });
            }
            self.remove_deadline_entry(primary, sys_id);
        }

        // Step 3: release every instance whose request tick has arrived.
        while let Some((primary, sys_id)) = index::head_key(&self.request_list) {
            if primary > now {
                break;
            }
            let task = self.task_ref(sys_id).clone();
            index::remove_task(&mut self.request_list, primary, &task);

            self.task_mut(sys_id).release(now, algorithm);

            self.insert_deadline_entry(sys_id);
            let deadline = self.task_ref(sys_id).deadline;
            let released = self.task_ref(sys_id).clone();
            index::insert_task(&mut self.request_list, deadline, &released);
        }

        // Step 4: pick who runs the tick about to elapse.
        let pick = algorithm.pick_next(self);

        // Step 5: context-switch bookkeeping.
        if pick != self.current {
            self.context_switches += 1;
            if self.current != IDLE_SYS_ID && self.task_ref(self.current).state != TaskState::Dead
            {
                self.task_mut(self.current).state = TaskState::Ready;
            }
            self.current = pick;
            if self.current != IDLE_SYS_ID {
                self.task_mut(self.current).state = TaskState::Running;
            }
        }

        // Step 6: record and advance.
        self.history.push(self.current);
        self.sys_time += 1;
    }
}

#[cfg(test)]
mod tests;
