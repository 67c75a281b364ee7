//! Load plans and their dependency validation

use super::task::{LoadTask, Stage};
use crate::error::{ScholarError, ScholarResult};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::debug;

/// A task bound to its source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanEntry {
    pub task: LoadTask,
    pub path: PathBuf,
}

/// Ordered list of tasks to run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadPlan {
    entries: Vec<PlanEntry>,
}

impl LoadPlan {
    /// Plan in the given order. Call [`LoadPlan::validate`] before running it.
    pub fn new(entries: Vec<PlanEntry>) -> Self {
        Self { entries }
    }

    /// Plan from configured `task key -> path` pairs, in canonical task order.
    pub fn from_paths(paths: &BTreeMap<String, PathBuf>) -> ScholarResult<Self> {
        let mut entries = Vec::with_capacity(paths.len());
        for (key, path) in paths {
            let task = LoadTask::from_key(key)
                .ok_or_else(|| ScholarError::Config(format!("unknown load task '{}'", key)))?;
            entries.push(PlanEntry {
                task,
                path: path.clone(),
            });
        }
        entries.sort_by_key(|entry| entry.task);
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[PlanEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Entries of one stage, order preserved
    pub fn stage(&self, stage: Stage) -> LoadPlan {
        LoadPlan {
            entries: self
                .entries
                .iter()
                .filter(|entry| entry.task.stage() == stage)
                .cloned()
                .collect(),
        }
    }

    /// Reject plans where a task runs before a phase it depends on, or before a
    /// task in the same plan that produces one of its endpoint labels.
    ///
    /// A label no task in the plan produces is assumed to be loaded already.
    pub fn validate(&self) -> ScholarResult<()> {
        for (position, entry) in self.entries.iter().enumerate() {
            if let Some(previous) = self.entries[..position]
                .iter()
                .find(|earlier| earlier.task.phase() > entry.task.phase())
            {
                return Err(ScholarError::Plan(format!(
                    "'{}' ({:?}) is scheduled after '{}' ({:?})",
                    entry.task,
                    entry.task.phase(),
                    previous.task,
                    previous.task.phase()
                )));
            }

            for label in entry.task.requires() {
                let later_producer = self.entries[position + 1..]
                    .iter()
                    .find(|later| later.task.produces().contains(label));
                if let Some(producer) = later_producer {
                    return Err(ScholarError::Plan(format!(
                        "'{}' needs {} nodes but '{}' loads them later",
                        entry.task, label, producer.task
                    )));
                }

                let produced_earlier = self.entries[..position]
                    .iter()
                    .any(|earlier| earlier.task.produces().contains(label));
                if !produced_earlier {
                    debug!(
                        "'{}' resolves {} nodes that this plan does not load",
                        entry.task, label
                    );
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(tasks: &[LoadTask]) -> LoadPlan {
        LoadPlan::new(
            tasks
                .iter()
                .map(|&task| PlanEntry {
                    task,
                    path: PathBuf::from(format!("{}.csv", task.key())),
                })
                .collect(),
        )
    }

    #[test]
    fn test_canonical_plan_is_valid() {
        assert!(plan(&LoadTask::ALL).validate().is_ok());
    }

    #[test]
    fn test_relationship_before_endpoint_is_rejected() {
        let err = plan(&[LoadTask::Authors, LoadTask::Writes, LoadTask::Papers])
            .validate()
            .unwrap_err();
        assert!(matches!(err, ScholarError::Plan(_)));
    }

    #[test]
    fn test_from_paths_sorts_and_rejects_unknown_keys() {
        let mut paths = BTreeMap::new();
        paths.insert("writes".to_string(), PathBuf::from("w.csv"));
        paths.insert("authors".to_string(), PathBuf::from("a.csv"));
        paths.insert("papers".to_string(), PathBuf::from("p.csv"));
        let plan = LoadPlan::from_paths(&paths).unwrap();
        let tasks: Vec<_> = plan.entries().iter().map(|e| e.task).collect();
        assert_eq!(tasks, vec![LoadTask::Authors, LoadTask::Papers, LoadTask::Writes]);

        paths.insert("citations".to_string(), PathBuf::from("c.csv"));
        assert!(matches!(
            LoadPlan::from_paths(&paths),
            Err(ScholarError::Config(_))
        ));
    }

    #[test]
    fn test_stage_filter() {
        let full = plan(&LoadTask::ALL);
        assert_eq!(full.stage(Stage::Enrich).len(), 4);
        assert_eq!(full.stage(Stage::Create).len(), 17);
    }
}
