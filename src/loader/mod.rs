//! Entity/relationship loader and the two-stage load pipeline
//!
//! Rows are loaded one statement at a time through a scoped session. Per-row
//! problems (bad fields, missing endpoints, rejected statements) are counted
//! and the task carries on; only a connection failure stops the run.

pub mod plan;
pub mod report;
pub mod source;
pub mod task;

pub use plan::{LoadPlan, PlanEntry};
pub use report::{LoadReport, RowOutcome, TaskReport};
pub use source::{CsvRowSource, Row, SchemaVariant};
pub use task::{LoadTask, Phase, Stage};

use crate::client::{Connection, Session};
use crate::error::{ScholarError, ScholarResult};
use crate::schema::{Step, StepKind};
use tracing::{debug, error, info, warn};

/// Load every row of one task.
///
/// Returns `Err` only for fatal errors and unreadable input; everything else
/// lands in the report.
pub async fn run_task<I>(connection: &Connection, task: LoadTask, rows: I) -> ScholarResult<TaskReport>
where
    I: IntoIterator<Item = ScholarResult<Row>>,
{
    let session = connection.session(format!("load:{}", task));
    let mut report = TaskReport::new(task);

    for item in rows {
        let row = match item {
            Ok(row) => row,
            Err(ScholarError::Csv(e)) if matches!(e.kind(), csv::ErrorKind::Io(_)) => {
                return Err(ScholarError::Csv(e));
            }
            Err(e) => {
                report.rows_read += 1;
                report.record(RowOutcome::Rejected);
                warn!("{}: unreadable record: {}", task, e);
                report.note(e.to_string());
                continue;
            }
        };
        report.rows_read += 1;

        let steps = match task.plan_row(&row) {
            Ok(steps) => steps,
            Err(e) => {
                warn!("{}: rejected {}", task, e);
                report.record(RowOutcome::Rejected);
                report.note(e.to_string());
                continue;
            }
        };

        let outcome = apply_steps(&session, task, &row, &steps, &mut report).await?;
        report.record(outcome);
    }

    info!(
        "{}: {} rows, {} applied, {} skipped, {} rejected, {} unmatched, {} failed",
        task,
        report.rows_read,
        report.applied,
        report.skipped,
        report.parse_errors,
        report.unmatched,
        report.failed
    );
    Ok(report)
}

async fn apply_steps(
    session: &Session<'_>,
    task: LoadTask,
    row: &Row,
    steps: &[Step],
    report: &mut TaskReport,
) -> ScholarResult<RowOutcome> {
    if steps.is_empty() {
        debug!("{}: line {} has nothing to load", task, row.line());
        return Ok(RowOutcome::Skipped);
    }

    let mut outcome = RowOutcome::Applied;
    for step in steps {
        match session.run(&step.statement).await {
            Ok(result) => {
                if result.matched() == 0 {
                    let what = match step.kind {
                        StepKind::Enrichment => "target not found",
                        _ => "endpoint not found",
                    };
                    debug!("{}: line {} {}", task, row.line(), what);
                    report.note(format!("line {}: {} ({})", row.line(), what, step.statement.name()));
                    outcome = RowOutcome::Unmatched;
                }
            }
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                warn!("{}: line {} failed: {}", task, row.line(), e);
                report.note(format!("line {}: {}", row.line(), e));
                // Later steps build on this one
                return Ok(RowOutcome::Failed);
            }
        }
    }
    Ok(outcome)
}

/// Runs a plan's Create stage, then its Enrich stage
pub struct Pipeline<'c> {
    connection: &'c Connection,
    variant: SchemaVariant,
}

impl<'c> Pipeline<'c> {
    pub fn new(connection: &'c Connection, variant: SchemaVariant) -> Self {
        Self {
            connection,
            variant,
        }
    }

    /// Validate and run the whole plan.
    pub async fn run(&self, plan: &LoadPlan) -> ScholarResult<LoadReport> {
        self.run_stages(plan, &[Stage::Create, Stage::Enrich]).await
    }

    /// Validate the plan, then run the selected stages in order.
    pub async fn run_stages(&self, plan: &LoadPlan, stages: &[Stage]) -> ScholarResult<LoadReport> {
        plan.validate()?;
        let mut report = LoadReport::default();

        for &stage in stages {
            let entries = plan.stage(stage);
            if entries.is_empty() {
                debug!("No tasks in the {} stage", stage);
                continue;
            }
            info!("Starting {} stage ({} tasks)", stage, entries.len());

            for entry in entries.entries() {
                let task_report = match CsvRowSource::open(&entry.path, entry.task, self.variant) {
                    Ok(rows) => match run_task(self.connection, entry.task, rows).await {
                        Ok(task_report) => task_report,
                        Err(e) if e.is_fatal() => {
                            error!("{}: aborting run: {}", entry.task, e);
                            return Err(e);
                        }
                        Err(e) => {
                            warn!("{}: task aborted: {}", entry.task, e);
                            TaskReport::aborted(entry.task, e.to_string())
                        }
                    },
                    Err(e) => {
                        warn!("{}: cannot open {}: {}", entry.task, entry.path.display(), e);
                        TaskReport::aborted(entry.task, format!("{}: {}", entry.path.display(), e))
                    }
                };
                report.push(task_report);
            }
        }

        info!(
            "Load finished: {} rows, {} applied, {} unmatched, {} rejected, {} failed",
            report.total_rows(),
            report.total_applied(),
            report.total_unmatched(),
            report.total_parse_errors(),
            report.total_failed()
        );
        Ok(report)
    }
}
