//! Line-oriented task-set config file parser (spec.md §6.2).
//!
//! ```text
//! ; comments start with ';', '*', or are blank
//! title Demo task set
//! tasks 2
//! maxtime 100
//! task A,HIGH,4,2
//! task B,LOW,6,3
//! end
//! ```

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::task::Criticality;
use crate::taskset::TaskSpec;

/// Conservative cap so single-glyph `sys_id`s stay unique within one case
/// (spec.md §6.2).
pub const MAX_CONFIG_TASKS: usize = 24;

#[derive(Debug, Error, Clone)]
pub enum ConfigError {
    #[error("line {line}: unknown keyword '{keyword}'")]
    UnknownKeyword { line: usize, keyword: String },
    #[error("line {line}: missing field in '{directive}' directive")]
    MissingField { line: usize, directive: &'static str },
    #[error("line {line}: '{value}' is not a valid number for '{field}'")]
    OutOfRangeNumeric {
        line: usize,
        field: &'static str,
        value: String,
    },
    #[error("'tasks' count {declared} must be in 1..={MAX_CONFIG_TASKS}")]
    InvalidTaskCount { declared: usize },
    #[error("line {line}: unrecognized criticality '{value}', expected HIGH or LOW")]
    InvalidCriticality { line: usize, value: String },
    #[error("declared 'tasks {declared}' but {found} 'task' lines were present before 'end'")]
    TaskCountMismatch { declared: usize, found: usize },
    #[error("missing 'tasks <N>' directive before the first 'task' line")]
    TasksDirectiveMissing,
    #[error("missing 'end' directive")]
    MissingEnd,
    #[error("failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::sync::Arc<std::io::Error>,
    },
}

/// A fully parsed config file, ready to become a [`crate::taskset::TaskSet`].
#[derive(Debug, Clone)]
pub struct ParsedConfig {
    pub title: Option<String>,
    /// Declared task count (`tasks <N>`), kept for the mismatch check.
    pub declared_tasks: usize,
    pub max_time: Option<i64>,
    /// Tasks in reverse of declaration order, so the timeline prints with
    /// task 1 at the top (spec.md §6.2).
    pub tasks: Vec<TaskSpec>,
}

pub fn load(path: impl AsRef<Path>) -> Result<ParsedConfig, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.display().to_string(),
        source: std::sync::Arc::new(e),
    })?;
    parse(&content)
}

pub fn parse(content: &str) -> Result<ParsedConfig, ConfigError> {
    let mut title = None;
    let mut declared_tasks: Option<usize> = None;
    let mut max_time = None;
    let mut tasks = Vec::new();
    let mut saw_end = false;

    for (i, raw_line) in content.lines().enumerate() {
        let line = i + 1;
        let trimmed = raw_line.trim();
        if trimmed.is_empty() || trimmed.starts_with(';') || trimmed.starts_with('*') {
            continue;
        }

        let mut parts = trimmed.splitn(2, char::is_whitespace);
        let keyword = parts.next().unwrap_or("").to_ascii_lowercase();
        let rest = parts.next().unwrap_or("").trim();

        match keyword.as_str() {
            "title" => title = Some(rest.to_string()),
            "tasks" => {
                let n: usize = rest.parse().map_err(|_| ConfigError::OutOfRangeNumeric {
                    line,
                    field: "tasks",
                    value: rest.to_string(),
                })?;
                if n < 1 || n > MAX_CONFIG_TASKS {
                    return Err(ConfigError::InvalidTaskCount { declared: n });
                }
                declared_tasks = Some(n);
            }
            "maxtime" => {
                let t: i64 = rest.parse().map_err(|_| ConfigError::OutOfRangeNumeric {
                    line,
                    field: "maxtime",
                    value: rest.to_string(),
                })?;
                max_time = Some(t);
            }
            "task" => {
                if declared_tasks.is_none() {
                    return Err(ConfigError::TasksDirectiveMissing);
                }
                tasks.push(parse_task_line(line, rest)?);
            }
            "end" => {
                saw_end = true;
                break;
            }
            other => {
                return Err(ConfigError::UnknownKeyword {
                    line,
                    keyword: other.to_string(),
                })
            }
        }
    }

    if !saw_end {
        return Err(ConfigError::MissingEnd);
    }
    let declared_tasks = declared_tasks.ok_or(ConfigError::TasksDirectiveMissing)?;
    if tasks.len() != declared_tasks {
        return Err(ConfigError::TaskCountMismatch {
            declared: declared_tasks,
            found: tasks.len(),
        });
    }

    tasks.reverse();
    Ok(ParsedConfig {
        title,
        declared_tasks,
        max_time,
        tasks,
    })
}

fn parse_task_line(line: usize, rest: &str) -> Result<TaskSpec, ConfigError> {
    let fields: Vec<&str> = rest.split(',').map(str::trim).collect();
    if fields.len() != 4 {
        return Err(ConfigError::MissingField {
            line,
            directive: "task",
        });
    }
    let [name, crit, period, cpu_time] = [fields[0], fields[1], fields[2], fields[3]];

    let criticality = match crit.to_ascii_uppercase().as_str() {
        "HIGH" => Criticality::High,
        "LOW" => Criticality::Low,
        _ => {
            return Err(ConfigError::InvalidCriticality {
                line,
                value: crit.to_string(),
            })
        }
    };
    let period: i64 = period.parse().map_err(|_| ConfigError::OutOfRangeNumeric {
        line,
        field: "period",
        value: period.to_string(),
    })?;
    let cpu_time: i64 = cpu_time
        .parse()
        .map_err(|_| ConfigError::OutOfRangeNumeric {
            line,
            field: "cpu_time",
            value: cpu_time.to_string(),
        })?;

    Ok(TaskSpec {
        name: name.to_string(),
        criticality,
        period,
        cpu_time,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
; a demo task set
title Demo task set
tasks 2
maxtime 100
task A,HIGH,4,2
task B,LOW,6,3
end
";

    #[test]
    fn parses_sample_and_reverses_declaration_order() {
        let cfg = parse(SAMPLE).unwrap();
        assert_eq!(cfg.title.as_deref(), Some("Demo task set"));
        assert_eq!(cfg.max_time, Some(100));
        assert_eq!(cfg.tasks.len(), 2);
        assert_eq!(cfg.tasks[0].name, "B");
        assert_eq!(cfg.tasks[1].name, "A");
    }

    #[test]
    fn maxtime_is_optional() {
        let cfg = parse("tasks 1\ntask A,HIGH,4,2\nend\n").unwrap();
        assert_eq!(cfg.max_time, None);
    }

    #[test]
    fn comment_and_blank_lines_are_ignored() {
        let cfg = parse("*comment\n\n;comment\ntasks 1\ntask A,LOW,4,2\nend\n").unwrap();
        assert_eq!(cfg.tasks.len(), 1);
    }

    #[test]
    fn rejects_task_count_mismatch() {
        let err = parse("tasks 2\ntask A,HIGH,4,2\nend\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::TaskCountMismatch {
                declared: 2,
                found: 1
            }
        ));
    }

    #[test]
    fn rejects_unknown_keyword() {
        let err = parse("tasks 1\nfrobnicate 5\ntask A,HIGH,4,2\nend\n").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownKeyword { .. }));
    }

    #[test]
    fn rejects_task_count_out_of_range() {
        let err = parse("tasks 0\nend\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidTaskCount { declared: 0 }));
    }

    #[test]
    fn keywords_are_case_insensitive() {
        let cfg = parse("TASKS 1\nTASK A,high,4,2\nEND\n").unwrap();
        assert_eq!(cfg.tasks.len(), 1);
        assert_eq!(cfg.tasks[0].criticality, Criticality::High);
    }
}
