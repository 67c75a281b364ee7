//! Attribute evolution: second-pass enrichment of loaded entities
//!
//! Enrichment never creates anything. A target that does not exist matches
//! zero rows and is reported as unmatched.

use crate::error::RowError;
use crate::loader::Row;
use crate::schema::{properties, LoadRecord, NodeLabel, NodeRef, RelType, Step, StepKind};
use crate::statement::Statement;
use serde_json::json;

/// Content and decision of an existing review
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewDetailsRecord {
    pub author_id: String,
    pub paper_id: String,
    pub content: Option<String>,
    pub decision: Option<bool>,
}

impl ReviewDetailsRecord {
    pub fn from_row(row: &Row) -> Result<Self, RowError> {
        Ok(Self {
            author_id: row.text("authorID")?,
            paper_id: row.text("paperID")?,
            content: row.optional_text("content"),
            decision: row.get("decision").map(|_| row.flag("decision")),
        })
    }
}

impl LoadRecord for ReviewDetailsRecord {
    fn steps(&self) -> Vec<Step> {
        let update = properties([
            ("content", self.content.as_ref().map(|c| json!(c))),
            ("decision", self.decision.map(|d| json!(d))),
        ]);
        if update.is_empty() {
            return Vec::new();
        }

        vec![Step {
            kind: StepKind::Enrichment,
            statement: Statement::SetEdgeProperties {
                rel: RelType::Reviews,
                from: NodeRef::new(NodeLabel::Author, self.author_id.as_str()),
                to: NodeRef::new(NodeLabel::Paper, self.paper_id.as_str()),
                properties: update,
            },
        }]
    }
}

/// Reviewer policy of a journal, conference or workshop
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewerPolicyRecord {
    pub venue: NodeRef,
    pub policy: String,
}

impl ReviewerPolicyRecord {
    pub fn journal_from_row(row: &Row) -> Result<Self, RowError> {
        Self::from_row(row, NodeLabel::Journal, "journalID")
    }

    pub fn conference_from_row(row: &Row) -> Result<Self, RowError> {
        Self::from_row(row, NodeLabel::Conference, "conferenceID")
    }

    pub fn workshop_from_row(row: &Row) -> Result<Self, RowError> {
        Self::from_row(row, NodeLabel::Workshop, "workshopID")
    }

    fn from_row(row: &Row, label: NodeLabel, id_column: &str) -> Result<Self, RowError> {
        Ok(Self {
            venue: NodeRef::new(label, row.text(id_column)?),
            policy: row.text("reviewerPolicy")?,
        })
    }
}

impl LoadRecord for ReviewerPolicyRecord {
    fn steps(&self) -> Vec<Step> {
        vec![Step {
            kind: StepKind::Enrichment,
            statement: Statement::SetNodeProperties {
                node: self.venue.clone(),
                properties: properties([("reviewerPolicy", Some(json!(self.policy)))]),
            },
        }]
    }
}
