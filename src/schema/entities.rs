//! Entity records

use super::{properties, relate, upsert, LoadRecord, NodeLabel, NodeRef, PropertyMap, RelType, Step};
use crate::error::RowError;
use crate::loader::Row;
use chrono::{Datelike, NaiveDate};
use serde_json::{json, Value};

fn text(value: &Option<String>) -> Option<Value> {
    value.as_ref().map(|v| json!(v))
}

fn date(value: &Option<NaiveDate>) -> Option<Value> {
    value.map(|d| json!(d.format("%Y-%m-%d").to_string()))
}

#[derive(Debug, Clone, PartialEq)]
pub struct AuthorRecord {
    pub id: String,
    pub name: Option<String>,
}

impl AuthorRecord {
    pub fn from_row(row: &Row) -> Result<Self, RowError> {
        Ok(Self {
            id: row.text("authorID")?,
            name: row.optional_text("name"),
        })
    }
}

impl LoadRecord for AuthorRecord {
    fn steps(&self) -> Vec<Step> {
        vec![upsert(
            NodeRef::new(NodeLabel::Author, self.id.as_str()),
            properties([("name", text(&self.name))]),
            PropertyMap::new(),
        )]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearRecord {
    pub value: i64,
}

impl YearRecord {
    pub fn from_row(row: &Row) -> Result<Self, RowError> {
        Ok(Self {
            value: row.integer("year")?,
        })
    }
}

impl LoadRecord for YearRecord {
    fn steps(&self) -> Vec<Step> {
        vec![upsert(
            NodeRef::new(NodeLabel::Year, self.value),
            PropertyMap::new(),
            PropertyMap::new(),
        )]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct JournalRecord {
    pub id: String,
    pub name: Option<String>,
    pub issn: Option<String>,
    pub editor: Option<String>,
}

impl JournalRecord {
    pub fn from_row(row: &Row) -> Result<Self, RowError> {
        Ok(Self {
            id: row.text("journalID")?,
            name: row.optional_text("name"),
            issn: row.optional_text("issn"),
            editor: row.optional_text("editor"),
        })
    }
}

impl LoadRecord for JournalRecord {
    fn steps(&self) -> Vec<Step> {
        vec![upsert(
            NodeRef::new(NodeLabel::Journal, self.id.as_str()),
            properties([
                ("name", text(&self.name)),
                ("issn", text(&self.issn)),
                ("editor", text(&self.editor)),
            ]),
            PropertyMap::new(),
        )]
    }
}

/// Conference or workshop series
#[derive(Debug, Clone, PartialEq)]
pub struct EventSeriesRecord {
    pub label: NodeLabel,
    pub id: String,
    pub name: Option<String>,
    pub chair: Option<String>,
}

impl EventSeriesRecord {
    pub fn conference_from_row(row: &Row) -> Result<Self, RowError> {
        Self::from_row(row, NodeLabel::Conference, "conferenceID")
    }

    pub fn workshop_from_row(row: &Row) -> Result<Self, RowError> {
        Self::from_row(row, NodeLabel::Workshop, "workshopID")
    }

    fn from_row(row: &Row, label: NodeLabel, id_column: &str) -> Result<Self, RowError> {
        Ok(Self {
            label,
            id: row.text(id_column)?,
            name: row.optional_text("name"),
            chair: row.optional_text("chair"),
        })
    }
}

impl LoadRecord for EventSeriesRecord {
    fn steps(&self) -> Vec<Step> {
        vec![upsert(
            NodeRef::new(self.label, self.id.as_str()),
            properties([("name", text(&self.name)), ("chair", text(&self.chair))]),
            PropertyMap::new(),
        )]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct KeywordRecord {
    pub text: String,
}

impl KeywordRecord {
    pub fn from_row(row: &Row) -> Result<Self, RowError> {
        Ok(Self {
            text: row.text("keyword")?,
        })
    }
}

impl LoadRecord for KeywordRecord {
    fn steps(&self) -> Vec<Step> {
        vec![upsert(
            NodeRef::new(NodeLabel::Keyword, self.text.as_str()),
            PropertyMap::new(),
            PropertyMap::new(),
        )]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrganizationRecord {
    pub id: String,
    pub name: Option<String>,
    pub kind: Option<String>,
}

impl OrganizationRecord {
    pub fn from_row(row: &Row) -> Result<Self, RowError> {
        Ok(Self {
            id: row.text("orgID")?,
            name: row.optional_text("name"),
            kind: row.optional_text("type"),
        })
    }
}

impl LoadRecord for OrganizationRecord {
    fn steps(&self) -> Vec<Step> {
        vec![upsert(
            NodeRef::new(NodeLabel::Organization, self.id.as_str()),
            properties([("name", text(&self.name)), ("type", text(&self.kind))]),
            PropertyMap::new(),
        )]
    }
}

/// Paper, plus its IN_YEAR link when a year is known
#[derive(Debug, Clone, PartialEq)]
pub struct PaperRecord {
    pub id: String,
    pub title: Option<String>,
    pub abstract_text: Option<String>,
    pub publication_date: Option<NaiveDate>,
    pub year: Option<i64>,
}

impl PaperRecord {
    /// Without a `year` column the year of `publicationDate` is used.
    pub fn from_row(row: &Row) -> Result<Self, RowError> {
        let publication_date = row.optional_date("publicationDate")?;
        let year = match row.optional_integer("year")? {
            Some(year) => Some(year),
            None => publication_date.map(|d| i64::from(d.year())),
        };

        Ok(Self {
            id: row.text("paperID")?,
            title: row.optional_text("title"),
            abstract_text: row.optional_text("abstract"),
            publication_date,
            year,
        })
    }
}

impl LoadRecord for PaperRecord {
    fn steps(&self) -> Vec<Step> {
        let paper = NodeRef::new(NodeLabel::Paper, self.id.as_str());
        let mut steps = vec![upsert(
            paper.clone(),
            properties([
                ("title", text(&self.title)),
                ("abstract", text(&self.abstract_text)),
            ]),
            properties([("publicationDate", date(&self.publication_date))]),
        )];

        if let Some(year) = self.year {
            let year = NodeRef::new(NodeLabel::Year, year);
            steps.push(upsert(year.clone(), PropertyMap::new(), PropertyMap::new()));
            steps.push(relate(RelType::InYear, paper, year, PropertyMap::new()));
        }
        steps
    }
}

/// Journal volume, plus PRESENTED_IN its journal
#[derive(Debug, Clone, PartialEq)]
pub struct VolumeRecord {
    pub id: String,
    pub number: i64,
    pub journal_id: String,
}

impl VolumeRecord {
    pub fn from_row(row: &Row) -> Result<Self, RowError> {
        Ok(Self {
            id: row.text("volID")?,
            number: row.integer("volNumber")?,
            journal_id: row.text("journalID")?,
        })
    }
}

impl LoadRecord for VolumeRecord {
    fn steps(&self) -> Vec<Step> {
        let volume = NodeRef::new(NodeLabel::Volume, self.id.as_str());
        vec![
            upsert(
                volume.clone(),
                properties([
                    ("number", Some(json!(self.number))),
                    ("journalId", Some(json!(self.journal_id))),
                ]),
                PropertyMap::new(),
            ),
            relate(
                RelType::PresentedIn,
                volume,
                NodeRef::new(NodeLabel::Journal, self.journal_id.as_str()),
                PropertyMap::new(),
            ),
        ]
    }
}

/// Whether proceedings belong to a conference or a workshop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProceedingsKind {
    Conference,
    Workshop,
}

impl ProceedingsKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProceedingsKind::Conference => "conference",
            ProceedingsKind::Workshop => "workshop",
        }
    }

    pub fn venue_label(&self) -> NodeLabel {
        match self {
            ProceedingsKind::Conference => NodeLabel::Conference,
            ProceedingsKind::Workshop => NodeLabel::Workshop,
        }
    }
}

/// Proceedings edition, plus PRESENTED_IN its conference or workshop
#[derive(Debug, Clone, PartialEq)]
pub struct ProceedingsRecord {
    pub id: String,
    pub edition: i64,
    pub venue_id: String,
    pub kind: ProceedingsKind,
    pub venue: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl ProceedingsRecord {
    pub fn from_row(row: &Row) -> Result<Self, RowError> {
        let raw_kind = row.required("type")?;
        let kind = if raw_kind.eq_ignore_ascii_case("conference") {
            ProceedingsKind::Conference
        } else if raw_kind.eq_ignore_ascii_case("workshop") {
            ProceedingsKind::Workshop
        } else {
            return Err(row.error(
                "type",
                format!("must be 'conference' or 'workshop', got '{}'", raw_kind),
            ));
        };

        Ok(Self {
            id: row.text("proceedingsID")?,
            edition: row.integer("edition")?,
            venue_id: row.text("conferenceID")?,
            kind,
            venue: row.optional_text("venue"),
            start_date: row.optional_date("startDate")?,
            end_date: row.optional_date("endDate")?,
        })
    }
}

impl LoadRecord for ProceedingsRecord {
    fn steps(&self) -> Vec<Step> {
        let proceedings = NodeRef::new(NodeLabel::Proceedings, self.id.as_str());
        vec![
            upsert(
                proceedings.clone(),
                properties([
                    ("edition", Some(json!(self.edition))),
                    ("type", Some(json!(self.kind.as_str()))),
                    ("venue", text(&self.venue)),
                    ("venueId", Some(json!(self.venue_id))),
                ]),
                properties([
                    ("startDate", date(&self.start_date)),
                    ("endDate", date(&self.end_date)),
                ]),
            ),
            relate(
                RelType::PresentedIn,
                proceedings,
                NodeRef::new(self.kind.venue_label(), self.venue_id.as_str()),
                PropertyMap::new(),
            ),
        ]
    }
}
