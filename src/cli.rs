//! Command-line surface (spec.md §6.3), implemented with `clap`'s derive
//! API — the dependency the broader corpus reaches for in comparable CLI
//! front-ends.

use std::path::PathBuf;

use clap::Parser;
use thiserror::Error;

use crate::policy::Algorithm;

/// Default ASCII timeline width in columns (spec.md §6.3).
pub const DEFAULT_WIDTH: usize = 72;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("no algorithm selected: pass at least one of -r/-e/-l/-m")]
    NoAlgorithmSelected,
}

#[derive(Debug, Parser)]
#[command(name = "rtalgs", about = "Hard real-time scheduling simulator")]
pub struct Cli {
    /// Simulate with Rate Monotonic.
    #[arg(short = 'r')]
    pub rate_monotonic: bool,
    /// Simulate with Earliest-Deadline-First.
    #[arg(short = 'e')]
    pub edf: bool,
    /// Simulate with Least-Laxity-First.
    #[arg(short = 'l')]
    pub llf: bool,
    /// Simulate with Maximum-Urgency-First.
    #[arg(short = 'm')]
    pub muf: bool,

    /// Render the per-task-row timeline format instead of the merged one.
    #[arg(short = 'a')]
    pub per_task_rows: bool,

    /// Screen width for the ASCII timeline.
    #[arg(short = 'w', default_value_t = DEFAULT_WIDTH)]
    pub width: usize,

    /// Raise logging from warn to info.
    #[arg(short = 'v')]
    pub verbose: bool,

    /// Task-set config file(s) to simulate.
    #[arg(required = true)]
    pub taskset_files: Vec<PathBuf>,
}

impl Cli {
    /// The policies selected on the command line, in `-r -e -l -m` order.
    pub fn algorithms(&self) -> Result<Vec<Algorithm>, CliError> {
        let mut algorithms = Vec::new();
        if self.rate_monotonic {
            algorithms.push(Algorithm::Rm);
        }
        if self.edf {
            algorithms.push(Algorithm::Edf);
        }
        if self.llf {
            algorithms.push(Algorithm::Llf);
        }
        if self.muf {
            algorithms.push(Algorithm::Muf);
        }
        if algorithms.is_empty() {
            return Err(CliError::NoAlgorithmSelected);
        }
        Ok(algorithms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn algorithms_collects_every_selected_flag() {
        let cli = Cli {
            rate_monotonic: true,
            edf: false,
            llf: true,
            muf: false,
            per_task_rows: false,
            width: DEFAULT_WIDTH,
            verbose: false,
            taskset_files: vec![PathBuf::from("demo.cfg")],
        };
        assert_eq!(cli.algorithms().unwrap(), vec![Algorithm::Rm, Algorithm::Llf]);
    }

    #[test]
    fn algorithms_errors_when_none_selected() {
        let cli = Cli {
            rate_monotonic: false,
            edf: false,
            llf: false,
            muf: false,
            per_task_rows: false,
            width: DEFAULT_WIDTH,
            verbose: false,
            taskset_files: vec![PathBuf::from("demo.cfg")],
        };
        assert!(matches!(
            cli.algorithms(),
            Err(CliError::NoAlgorithmSelected)
        ));
    }
}
