//! ASCII report renderer (spec.md §6.4): the static schedulability verdict,
//! the timeline, the context-switch count, the `sys_id` cross-reference,
//! and a recap of the diagnostics raised during simulation.

use std::fmt::Write as _;

use crate::policy::{SchedulabilityReport, Verdict};
use crate::sim::{Diagnostic, Simulator};
use crate::task::IDLE_SYS_ID;
use crate::taskset::TaskSet;

fn verdict_label(v: Verdict) -> &'static str {
    match v {
        Verdict::Schedulable => "Schedulable",
        Verdict::NotSchedulable => "NOT Schedulable",
        Verdict::MayNotBeSchedulable => "may NOT be schedulable (bound exceeded, U <= 1)",
        Verdict::MayBeSchedulable => "may be schedulable (best-effort set present)",
    }
}

/// Renders the full report for one simulation run.
pub fn render(
    taskset: &TaskSet,
    report: &SchedulabilityReport,
    sim: &Simulator,
    width: usize,
    per_task_rows: bool,
) -> String {
    let mut out = String::new();

    writeln!(out, "=== {} ===", report.policy_label).unwrap();
    writeln!(
        out,
        "utilization U = {:.4}{}",
        report.utilization,
        report
            .bound
            .map(|b| format!(" (Liu-Layland bound = {b:.4})"))
            .unwrap_or_default()
    )
    .unwrap();
    writeln!(out, "verdict: {}", verdict_label(report.verdict)).unwrap();
    if !report.critical_set.is_empty() {
        writeln!(out, "guaranteed set: {}", report.critical_set.join(", ")).unwrap();
    }
    if !report.demoted.is_empty() {
        writeln!(
            out,
            "demoted to best-effort: {}",
            report.demoted.join(", ")
        )
        .unwrap();
    }
    if taskset.max_time_below_hyperperiod {
        writeln!(
            out,
            "warning: max_time {} is below the hyperperiod",
            taskset.max_time
        )
        .unwrap();
    }
    writeln!(out).unwrap();

    if per_task_rows {
        render_per_task_rows(&mut out, taskset, sim, width);
    } else {
        render_merged_timeline(&mut out, sim, width);
    }
    writeln!(out).unwrap();

    writeln!(out, "context switches: {}", sim.context_switches).unwrap();
    writeln!(out).unwrap();

    writeln!(out, "sys_id  task").unwrap();
    for task in &taskset.tasks {
        writeln!(out, "  {}     {}", task.sys_id as char, task.name).unwrap();
    }
    writeln!(out, "  {}     {}", IDLE_SYS_ID as char, taskset.idle.name).unwrap();

    if !sim.diagnostics.is_empty() {
        writeln!(out).unwrap();
        writeln!(out, "diagnostics:").unwrap();
        for d in &sim.diagnostics {
            writeln!(out, "  {}", format_diagnostic(d)).unwrap();
        }
    }

    out
}

fn render_merged_timeline(out: &mut String, sim: &Simulator, width: usize) {
    writeln!(out, "timeline:").unwrap();
    for chunk in sim.history.chunks(width.max(1)) {
        let line: String = chunk.iter().map(|&b| b as char).collect();
        writeln!(out, "{line}").unwrap();
    }
}

fn render_per_task_rows(out: &mut String, taskset: &TaskSet, sim: &Simulator, width: usize) {
    writeln!(out, "timeline (per-task rows):").unwrap();
    let rows: Vec<(u8, &str)> = taskset
        .tasks
        .iter()
        .map(|t| (t.sys_id, t.name.as_str()))
        .chain(std::iter::once((IDLE_SYS_ID, taskset.idle.name.as_str())))
        .collect();

    let width = width.max(1);
    let chunk_count = (sim.history.len() + width - 1) / width;
    for chunk_idx in 0..chunk_count.max(1) {
        let start = chunk_idx * width;
        let end = (start + width).min(sim.history.len());
        let slice = &sim.history[start..end];
        for (sys_id, name) in &rows {
            let row: String = slice
                .iter()
                .map(|&s| if s == *sys_id { s as char } else { '.' })
                .collect();
            writeln!(out, "{name:>16} | {row}").unwrap();
        }
        writeln!(out).unwrap();
    }
}

fn format_diagnostic(d: &Diagnostic) -> String {
    match d {
        Diagnostic::DeadlineMiss {
            tick,
            sys_id,
            name,
            instance,
        } => format!(
            "t={tick}: deadline miss, {name} ('{}') instance {instance}",
            *sys_id as char
        ),
        Diagnostic::LaxityExhausted {
            tick,
            sys_id,
            name,
            instance,
            deadline,
        } => format!(
            "t={tick}: laxity exhausted, {name} ('{}') instance {instance} blocked (deadline {deadline})",
            *sys_id as char
        ),
        Diagnostic::MufDemotion { name } => {
            format!("MUF: {name} demoted to the best-effort set")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::Algorithm;
    use crate::task::Criticality;
    use crate::taskset::{TaskSet, TaskSpec};

    fn spec(name: &str, crit: Criticality, period: i64, cpu_time: i64) -> TaskSpec {
        TaskSpec {
            name: name.to_string(),
            criticality: crit,
            period,
            cpu_time,
        }
    }

    #[test]
    fn render_includes_key_sections() {
        let taskset = TaskSet::build(vec![spec("A", Criticality::High, 4, 2)], None).unwrap();
        let (sim, report) = crate::sim::Simulator::new(taskset.clone(), Algorithm::Rm).run();
        let text = render(&taskset, &report, &sim, 72, false);
        assert!(text.contains("=== Rate Monotonic (RM) ==="));
        assert!(text.contains("timeline:"));
        assert!(text.contains("context switches:"));
        assert!(text.contains("sys_id  task"));
    }
}
