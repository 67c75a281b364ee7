//! Per-task and per-run load reports

use super::task::LoadTask;
use serde::Serialize;

const MAX_ISSUES: usize = 20;

/// How a single row ended up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowOutcome {
    /// Every step matched
    Applied,
    /// Nothing to load (e.g. empty keyword)
    Skipped,
    /// Malformed field
    Rejected,
    /// A step matched nothing
    Unmatched,
    /// A statement failed
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskReport {
    pub task: LoadTask,
    pub rows_read: u64,
    pub applied: u64,
    pub skipped: u64,
    pub parse_errors: u64,
    pub unmatched: u64,
    pub failed: u64,
    /// Set when the task could not run at all (unreadable file)
    pub error: Option<String>,
    /// First few problems, for the summary
    pub issues: Vec<String>,
}

impl TaskReport {
    pub fn new(task: LoadTask) -> Self {
        Self {
            task,
            rows_read: 0,
            applied: 0,
            skipped: 0,
            parse_errors: 0,
            unmatched: 0,
            failed: 0,
            error: None,
            issues: Vec::new(),
        }
    }

    pub fn aborted(task: LoadTask, error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::new(task)
        }
    }

    pub fn record(&mut self, outcome: RowOutcome) {
        match outcome {
            RowOutcome::Applied => self.applied += 1,
            RowOutcome::Skipped => self.skipped += 1,
            RowOutcome::Rejected => self.parse_errors += 1,
            RowOutcome::Unmatched => self.unmatched += 1,
            RowOutcome::Failed => self.failed += 1,
        }
    }

    pub fn note(&mut self, issue: impl Into<String>) {
        if self.issues.len() < MAX_ISSUES {
            self.issues.push(issue.into());
        }
    }

    pub fn is_clean(&self) -> bool {
        self.error.is_none() && self.parse_errors == 0 && self.unmatched == 0 && self.failed == 0
    }
}

/// Reports of every task a pipeline run touched, in execution order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LoadReport {
    pub tasks: Vec<TaskReport>,
}

impl LoadReport {
    pub fn push(&mut self, report: TaskReport) {
        self.tasks.push(report);
    }

    pub fn task(&self, task: LoadTask) -> Option<&TaskReport> {
        self.tasks.iter().find(|report| report.task == task)
    }

    pub fn total_rows(&self) -> u64 {
        self.tasks.iter().map(|t| t.rows_read).sum()
    }

    pub fn total_applied(&self) -> u64 {
        self.tasks.iter().map(|t| t.applied).sum()
    }

    pub fn total_unmatched(&self) -> u64 {
        self.tasks.iter().map(|t| t.unmatched).sum()
    }

    pub fn total_parse_errors(&self) -> u64 {
        self.tasks.iter().map(|t| t.parse_errors).sum()
    }

    pub fn total_failed(&self) -> u64 {
        self.tasks.iter().map(|t| t.failed).sum()
    }

    pub fn has_issues(&self) -> bool {
        self.tasks.iter().any(|t| !t.is_clean())
    }
}
