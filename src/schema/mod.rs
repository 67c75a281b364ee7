//! Graph schema: closed vocabularies and typed source records
//!
//! Each record type parses one source row and turns it into the ordered steps
//! that load it. Composite records (paper, volume, proceedings, paper keyword)
//! produce more than one step; each step is a separate statement, so a later
//! step that fails to match leaves the earlier one applied.

pub mod entities;
pub mod relationships;
pub mod types;

pub use entities::{
    AuthorRecord, EventSeriesRecord, JournalRecord, KeywordRecord, OrganizationRecord,
    PaperRecord, ProceedingsKind, ProceedingsRecord, VolumeRecord, YearRecord,
};
pub use relationships::{
    AffiliationRecord, CitesRecord, PaperKeywordRecord, PublishedInRecord, ReviewsRecord,
    WritesRecord,
};
pub use types::{Key, NodeLabel, NodeRef, Orientation, PropertyMap, RelType, Tag};

use crate::statement::Statement;
use serde_json::Value;

/// What a step does to the graph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    /// Node upsert
    Entity,
    /// Relationship merge between existing nodes
    Relationship,
    /// Property update on something that already exists
    Enrichment,
}

/// One statement of a record's load
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub kind: StepKind,
    pub statement: Statement,
}

/// A parsed source record
pub trait LoadRecord {
    /// Statements that load this record, in execution order. Empty means the
    /// row carries nothing to load.
    fn steps(&self) -> Vec<Step>;
}

/// Property map from optional values. Absent values are left out so an
/// upsert never erases a property it has no data for.
pub fn properties<const N: usize>(pairs: [(&str, Option<Value>); N]) -> PropertyMap {
    pairs
        .into_iter()
        .filter_map(|(name, value)| value.map(|v| (name.to_string(), v)))
        .collect()
}

pub(crate) fn upsert(node: NodeRef, properties: PropertyMap, dates: PropertyMap) -> Step {
    Step {
        kind: StepKind::Entity,
        statement: Statement::UpsertNode {
            node,
            properties,
            dates,
        },
    }
}

pub(crate) fn relate(rel: RelType, from: NodeRef, to: NodeRef, properties: PropertyMap) -> Step {
    Step {
        kind: StepKind::Relationship,
        statement: Statement::MergeEdge {
            rel,
            from,
            to,
            properties,
        },
    }
}
