//! The validated in-memory task set: static parameters for every task plus
//! the distinguished idle task, and the horizon the simulation runs to
//! (spec.md §4.2).
//!
//! The core consumes an already-validated `TaskSet` — invariant checking
//! happens once, here, rather than being re-checked by every policy.

use crate::lcm;
use crate::task::{Criticality, Task};
use thiserror::Error;

/// Maximum number of real tasks a `TaskSet` may hold (spec.md §4.2;
/// `sys_id` is a single byte drawn from a 52-glyph alphabet with `.`
/// reserved for idle).
pub const MAX_TASKS: usize = 52;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TaskSetError {
    #[error("no tasks specified; at least one task is required")]
    Empty,
    #[error("too many tasks: {0} exceeds the {MAX_TASKS}-task limit")]
    TooManyTasks(usize),
    #[error("task '{name}' has non-positive period {period}")]
    InvalidPeriod { name: String, period: i64 },
    #[error("task '{name}' has cpu_time {cpu_time} outside [1, period={period}]")]
    InvalidCpuTime {
        name: String,
        cpu_time: i64,
        period: i64,
    },
    #[error("duplicate sys_id '{0}'")]
    DuplicateSysId(char),
}

/// An unvalidated task description as read from a config file or built up
/// programmatically. `sys_id` is assigned by [`TaskSet::build`] in
/// declaration order, not supplied by the caller.
#[derive(Debug, Clone)]
pub struct TaskSpec {
    pub name: String,
    pub criticality: Criticality,
    pub period: i64,
    pub cpu_time: i64,
}

/// The validated task set plus simulation horizon.
///
/// `tasks` holds only the real tasks; the idle task is kept separately as
/// `idle` rather than occupying a reserved slot 0 of the same vector — the
/// slot-0 convention in the system this crate models is an artifact of
/// fixed-size C array allocation and has no Rust equivalent worth
/// preserving (see DESIGN.md).
#[derive(Debug, Clone)]
pub struct TaskSet {
    pub tasks: Vec<Task>,
    pub idle: Task,
    pub max_time: i64,
    /// Set when the caller supplied a `max_time` below the hyperperiod
    /// (spec.md §4.2, §9 Open Question: honored with a warning, not an
    /// error).
    pub max_time_below_hyperperiod: bool,
}

/// `sys_id` alphabet: lowercase then uppercase letters, 52 glyphs, `.`
/// reserved for idle.
fn nth_sys_id(i: usize) -> u8 {
    if i < 26 {
        b'a' + i as u8
    } else {
        b'A' + (i - 26) as u8
    }
}

impl TaskSet {
    /// Validates `specs` and assigns sys_ids in declaration order. `max_time`
    /// defaults to the hyperperiod (LCM of all periods) when `None`.
    pub fn build(specs: Vec<TaskSpec>, max_time: Option<i64>) -> Result<Self, TaskSetError> {
        if specs.is_empty() {
            return Err(TaskSetError::Empty);
        }
        if specs.len() > MAX_TASKS {
            return Err(TaskSetError::TooManyTasks(specs.len()));
        }

        let mut tasks = Vec::with_capacity(specs.len());
        let mut seen_ids = std::collections::HashSet::new();
        for (i, spec) in specs.into_iter().enumerate() {
            if spec.period < 1 {
                return Err(TaskSetError::InvalidPeriod {
                    name: spec.name,
                    period: spec.period,
                });
            }
            if spec.cpu_time < 1 || spec.cpu_time > spec.period {
                return Err(TaskSetError::InvalidCpuTime {
                    name: spec.name,
                    cpu_time: spec.cpu_time,
                    period: spec.period,
                });
            }
            let sys_id = nth_sys_id(i);
            if !seen_ids.insert(sys_id) {
                return Err(TaskSetError::DuplicateSysId(sys_id as char));
            }
            tasks.push(Task::new(
                spec.name,
                sys_id,
                spec.criticality,
                spec.period,
                spec.cpu_time,
            ));
        }

        let hyperperiod = lcm::lcm_all(tasks.iter().map(|t| t.period as u64)) as i64;
        let (max_time, below) = match max_time {
            Some(t) if t < hyperperiod => (t, true),
            Some(t) => (t, false),
            None => (hyperperiod, false),
        };

        Ok(Self {
            tasks,
            idle: Task::idle(),
            max_time,
            max_time_below_hyperperiod: below,
        })
    }

    pub fn num_tasks(&self) -> usize {
        self.tasks.len()
    }

    pub fn total_utilization(&self) -> f64 {
        self.tasks.iter().map(|t| t.utilization()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(name: &str, crit: Criticality, period: i64, cpu_time: i64) -> TaskSpec {
        TaskSpec {
            name: name.to_string(),
            criticality: crit,
            period,
            cpu_time,
        }
    }

    #[test]
    fn build_assigns_sys_ids_in_declaration_order() {
        let ts = TaskSet::build(
            vec![
                spec("A", Criticality::High, 4, 2),
                spec("B", Criticality::Low, 6, 3),
            ],
            None,
        )
        .unwrap();
        assert_eq!(ts.tasks[0].sys_id, b'a');
        assert_eq!(ts.tasks[1].sys_id, b'b');
    }

    #[test]
    fn build_defaults_max_time_to_hyperperiod() {
        let ts = TaskSet::build(
            vec![
                spec("A", Criticality::High, 4, 2),
                spec("B", Criticality::Low, 6, 3),
            ],
            None,
        )
        .unwrap();
        assert_eq!(ts.max_time, 12);
        assert!(!ts.max_time_below_hyperperiod);
    }

    #[test]
    fn build_flags_max_time_below_hyperperiod() {
        let ts = TaskSet::build(vec![spec("A", Criticality::High, 4, 2)], Some(2)).unwrap();
        assert_eq!(ts.max_time, 2);
        assert!(ts.max_time_below_hyperperiod);
    }

    #[test]
    fn build_rejects_empty_set() {
        assert_eq!(TaskSet::build(vec![], None), Err(TaskSetError::Empty));
    }

    #[test]
    fn build_rejects_cpu_time_exceeding_period() {
        let err = TaskSet::build(vec![spec("A", Criticality::High, 4, 5)], None).unwrap_err();
        assert!(matches!(err, TaskSetError::InvalidCpuTime { .. }));
    }

    #[test]
    fn build_rejects_nonpositive_period() {
        let err = TaskSet::build(vec![spec("A", Criticality::High, 0, 1)], None).unwrap_err();
        assert!(matches!(err, TaskSetError::InvalidPeriod { .. }));
    }

    #[test]
    fn build_rejects_too_many_tasks() {
        let specs: Vec<_> = (0..53)
            .map(|i| spec(&format!("T{i}"), Criticality::Low, 100, 1))
            .collect();
        assert!(matches!(
            TaskSet::build(specs, None),
            Err(TaskSetError::TooManyTasks(53))
        ));
    }
}
