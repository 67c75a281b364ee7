//! Load task catalog
//!
//! One task per source file. Tasks carry their phase and the labels they
//! produce and depend on, which is what plan validation checks.

use crate::error::RowError;
use crate::evolve::{ReviewDetailsRecord, ReviewerPolicyRecord};
use crate::loader::Row;
use crate::schema::{
    AffiliationRecord, AuthorRecord, CitesRecord, EventSeriesRecord, JournalRecord, KeywordRecord,
    LoadRecord, NodeLabel, OrganizationRecord, PaperKeywordRecord, PaperRecord, ProceedingsRecord,
    PublishedInRecord, ReviewsRecord, Step, VolumeRecord, WritesRecord, YearRecord,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Entities and relationships
    Create,
    /// Attribute evolution on what Create loaded
    Enrich,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Create => "create",
            Stage::Enrich => "enrich",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dependency phase. Tasks of a later phase never run before an earlier one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Phase {
    BaseEntities,
    DependentEntities,
    Relationships,
    Enrichment,
}

impl Phase {
    pub fn stage(&self) -> Stage {
        match self {
            Phase::Enrichment => Stage::Enrich,
            _ => Stage::Create,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadTask {
    Authors,
    Years,
    Journals,
    Conferences,
    Workshops,
    Keywords,
    Organizations,
    Papers,
    Volumes,
    Proceedings,
    Writes,
    Cites,
    Reviews,
    PaperVolume,
    PaperProceedings,
    PaperKeywords,
    Affiliations,
    ReviewDetails,
    JournalPolicies,
    ConferencePolicies,
    WorkshopPolicies,
}

impl LoadTask {
    /// All tasks in canonical execution order
    pub const ALL: [LoadTask; 21] = [
        LoadTask::Authors,
        LoadTask::Years,
        LoadTask::Journals,
        LoadTask::Conferences,
        LoadTask::Workshops,
        LoadTask::Keywords,
        LoadTask::Organizations,
        LoadTask::Papers,
        LoadTask::Volumes,
        LoadTask::Proceedings,
        LoadTask::Writes,
        LoadTask::Cites,
        LoadTask::Reviews,
        LoadTask::PaperVolume,
        LoadTask::PaperProceedings,
        LoadTask::PaperKeywords,
        LoadTask::Affiliations,
        LoadTask::ReviewDetails,
        LoadTask::JournalPolicies,
        LoadTask::ConferencePolicies,
        LoadTask::WorkshopPolicies,
    ];

    /// Key used in configuration (`csv_paths`)
    pub fn key(&self) -> &'static str {
        match self {
            LoadTask::Authors => "authors",
            LoadTask::Years => "years",
            LoadTask::Journals => "journals",
            LoadTask::Conferences => "conferences",
            LoadTask::Workshops => "workshops",
            LoadTask::Keywords => "keywords",
            LoadTask::Organizations => "organizations",
            LoadTask::Papers => "papers",
            LoadTask::Volumes => "volumes",
            LoadTask::Proceedings => "proceedings",
            LoadTask::Writes => "writes",
            LoadTask::Cites => "cites",
            LoadTask::Reviews => "reviews",
            LoadTask::PaperVolume => "paper_volume",
            LoadTask::PaperProceedings => "paper_proceedings",
            LoadTask::PaperKeywords => "paper_keywords",
            LoadTask::Affiliations => "affiliations",
            LoadTask::ReviewDetails => "review_details",
            LoadTask::JournalPolicies => "journal_policies",
            LoadTask::ConferencePolicies => "conference_policies",
            LoadTask::WorkshopPolicies => "workshop_policies",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        LoadTask::ALL.into_iter().find(|task| task.key() == key)
    }

    pub fn phase(&self) -> Phase {
        match self {
            LoadTask::Authors
            | LoadTask::Years
            | LoadTask::Journals
            | LoadTask::Conferences
            | LoadTask::Workshops
            | LoadTask::Keywords
            | LoadTask::Organizations => Phase::BaseEntities,
            LoadTask::Papers | LoadTask::Volumes | LoadTask::Proceedings => {
                Phase::DependentEntities
            }
            LoadTask::Writes
            | LoadTask::Cites
            | LoadTask::Reviews
            | LoadTask::PaperVolume
            | LoadTask::PaperProceedings
            | LoadTask::PaperKeywords
            | LoadTask::Affiliations => Phase::Relationships,
            LoadTask::ReviewDetails
            | LoadTask::JournalPolicies
            | LoadTask::ConferencePolicies
            | LoadTask::WorkshopPolicies => Phase::Enrichment,
        }
    }

    pub fn stage(&self) -> Stage {
        self.phase().stage()
    }

    /// Labels this task upserts
    pub fn produces(&self) -> &'static [NodeLabel] {
        match self {
            LoadTask::Authors => &[NodeLabel::Author],
            LoadTask::Years => &[NodeLabel::Year],
            LoadTask::Journals => &[NodeLabel::Journal],
            LoadTask::Conferences => &[NodeLabel::Conference],
            LoadTask::Workshops => &[NodeLabel::Workshop],
            LoadTask::Keywords | LoadTask::PaperKeywords => &[NodeLabel::Keyword],
            LoadTask::Organizations => &[NodeLabel::Organization],
            LoadTask::Papers => &[NodeLabel::Paper, NodeLabel::Year],
            LoadTask::Volumes => &[NodeLabel::Volume],
            LoadTask::Proceedings => &[NodeLabel::Proceedings],
            _ => &[],
        }
    }

    /// Labels this task resolves by key and expects to exist already
    pub fn requires(&self) -> &'static [NodeLabel] {
        match self {
            LoadTask::Volumes => &[NodeLabel::Journal],
            LoadTask::Proceedings => &[NodeLabel::Conference, NodeLabel::Workshop],
            LoadTask::Writes | LoadTask::Reviews | LoadTask::ReviewDetails => {
                &[NodeLabel::Author, NodeLabel::Paper]
            }
            LoadTask::Cites | LoadTask::PaperKeywords => &[NodeLabel::Paper],
            LoadTask::PaperVolume => &[NodeLabel::Paper, NodeLabel::Volume],
            LoadTask::PaperProceedings => &[NodeLabel::Paper, NodeLabel::Proceedings],
            LoadTask::Affiliations => &[NodeLabel::Author, NodeLabel::Organization],
            LoadTask::JournalPolicies => &[NodeLabel::Journal],
            LoadTask::ConferencePolicies => &[NodeLabel::Conference],
            LoadTask::WorkshopPolicies => &[NodeLabel::Workshop],
            _ => &[],
        }
    }

    /// Parse a row into the steps that load it
    pub fn plan_row(&self, row: &Row) -> Result<Vec<Step>, RowError> {
        Ok(match self {
            LoadTask::Authors => AuthorRecord::from_row(row)?.steps(),
            LoadTask::Years => YearRecord::from_row(row)?.steps(),
            LoadTask::Journals => JournalRecord::from_row(row)?.steps(),
            LoadTask::Conferences => EventSeriesRecord::conference_from_row(row)?.steps(),
            LoadTask::Workshops => EventSeriesRecord::workshop_from_row(row)?.steps(),
            LoadTask::Keywords => KeywordRecord::from_row(row)?.steps(),
            LoadTask::Organizations => OrganizationRecord::from_row(row)?.steps(),
            LoadTask::Papers => PaperRecord::from_row(row)?.steps(),
            LoadTask::Volumes => VolumeRecord::from_row(row)?.steps(),
            LoadTask::Proceedings => ProceedingsRecord::from_row(row)?.steps(),
            LoadTask::Writes => WritesRecord::from_row(row)?.steps(),
            LoadTask::Cites => CitesRecord::from_row(row)?.steps(),
            LoadTask::Reviews => ReviewsRecord::from_row(row)?.steps(),
            LoadTask::PaperVolume => PublishedInRecord::volume_from_row(row)?.steps(),
            LoadTask::PaperProceedings => PublishedInRecord::proceedings_from_row(row)?.steps(),
            LoadTask::PaperKeywords => PaperKeywordRecord::from_row(row)?.steps(),
            LoadTask::Affiliations => AffiliationRecord::from_row(row)?.steps(),
            LoadTask::ReviewDetails => ReviewDetailsRecord::from_row(row)?.steps(),
            LoadTask::JournalPolicies => ReviewerPolicyRecord::journal_from_row(row)?.steps(),
            LoadTask::ConferencePolicies => ReviewerPolicyRecord::conference_from_row(row)?.steps(),
            LoadTask::WorkshopPolicies => ReviewerPolicyRecord::workshop_from_row(row)?.steps(),
        })
    }
}

impl fmt::Display for LoadTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}
