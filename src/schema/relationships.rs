//! Relationship records
//!
//! Both endpoints are resolved by natural key. A row whose endpoint does not
//! exist matches nothing; the loader counts it as unmatched.

use super::{properties, relate, upsert, LoadRecord, NodeLabel, NodeRef, PropertyMap, RelType, Step};
use crate::error::RowError;
use crate::loader::Row;
use serde_json::json;

#[derive(Debug, Clone, PartialEq)]
pub struct WritesRecord {
    pub author_id: String,
    pub paper_id: String,
    pub corresponding: bool,
}

impl WritesRecord {
    pub fn from_row(row: &Row) -> Result<Self, RowError> {
        Ok(Self {
            author_id: row.text("authorID")?,
            paper_id: row.text("paperID")?,
            corresponding: row.flag("corresponds"),
        })
    }
}

impl LoadRecord for WritesRecord {
    fn steps(&self) -> Vec<Step> {
        vec![relate(
            RelType::Writes,
            NodeRef::new(NodeLabel::Author, self.author_id.as_str()),
            NodeRef::new(NodeLabel::Paper, self.paper_id.as_str()),
            properties([("corresponding", Some(json!(self.corresponding)))]),
        )]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CitesRecord {
    pub paper_id: String,
    pub reference_id: String,
}

impl CitesRecord {
    /// Self-citations are rejected; longer cycles are accepted as data.
    pub fn from_row(row: &Row) -> Result<Self, RowError> {
        let paper_id = row.text("paperID")?;
        let reference_id = row.text("referenceID")?;
        if paper_id == reference_id {
            return Err(row.error("referenceID", format!("paper '{}' cites itself", paper_id)));
        }
        Ok(Self {
            paper_id,
            reference_id,
        })
    }
}

impl LoadRecord for CitesRecord {
    fn steps(&self) -> Vec<Step> {
        vec![relate(
            RelType::Cites,
            NodeRef::new(NodeLabel::Paper, self.paper_id.as_str()),
            NodeRef::new(NodeLabel::Paper, self.reference_id.as_str()),
            PropertyMap::new(),
        )]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReviewsRecord {
    pub author_id: String,
    pub paper_id: String,
}

impl ReviewsRecord {
    pub fn from_row(row: &Row) -> Result<Self, RowError> {
        Ok(Self {
            author_id: row.text("authorID")?,
            paper_id: row.text("paperID")?,
        })
    }
}

impl LoadRecord for ReviewsRecord {
    fn steps(&self) -> Vec<Step> {
        vec![relate(
            RelType::Reviews,
            NodeRef::new(NodeLabel::Author, self.author_id.as_str()),
            NodeRef::new(NodeLabel::Paper, self.paper_id.as_str()),
            PropertyMap::new(),
        )]
    }
}

/// Paper PUBLISHED_IN a volume or proceedings
#[derive(Debug, Clone, PartialEq)]
pub struct PublishedInRecord {
    pub paper_id: String,
    pub container: NodeRef,
}

impl PublishedInRecord {
    pub fn volume_from_row(row: &Row) -> Result<Self, RowError> {
        Ok(Self {
            paper_id: row.text("paperID")?,
            container: NodeRef::new(NodeLabel::Volume, row.text("volID")?),
        })
    }

    pub fn proceedings_from_row(row: &Row) -> Result<Self, RowError> {
        Ok(Self {
            paper_id: row.text("paperID")?,
            container: NodeRef::new(NodeLabel::Proceedings, row.text("proceedingsID")?),
        })
    }
}

impl LoadRecord for PublishedInRecord {
    fn steps(&self) -> Vec<Step> {
        vec![relate(
            RelType::PublishedIn,
            NodeRef::new(NodeLabel::Paper, self.paper_id.as_str()),
            self.container.clone(),
            PropertyMap::new(),
        )]
    }
}

/// Keyword upsert, then Paper CONTAINS Keyword
#[derive(Debug, Clone, PartialEq)]
pub struct PaperKeywordRecord {
    pub paper_id: String,
    /// None for rows with an empty keyword; those load nothing
    pub keyword: Option<String>,
}

impl PaperKeywordRecord {
    pub fn from_row(row: &Row) -> Result<Self, RowError> {
        Ok(Self {
            paper_id: row.text("paperID")?,
            keyword: row.optional_text("keyword"),
        })
    }
}

impl LoadRecord for PaperKeywordRecord {
    fn steps(&self) -> Vec<Step> {
        let Some(keyword) = &self.keyword else {
            return Vec::new();
        };
        let keyword = NodeRef::new(NodeLabel::Keyword, keyword.as_str());
        vec![
            upsert(keyword.clone(), PropertyMap::new(), PropertyMap::new()),
            relate(
                RelType::Contains,
                NodeRef::new(NodeLabel::Paper, self.paper_id.as_str()),
                keyword,
                PropertyMap::new(),
            ),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AffiliationRecord {
    pub author_id: String,
    pub organization_id: String,
}

impl AffiliationRecord {
    pub fn from_row(row: &Row) -> Result<Self, RowError> {
        Ok(Self {
            author_id: row.text("authorID")?,
            organization_id: row.text("affiliation")?,
        })
    }
}

impl LoadRecord for AffiliationRecord {
    fn steps(&self) -> Vec<Step> {
        vec![relate(
            RelType::AffiliatedTo,
            NodeRef::new(NodeLabel::Author, self.author_id.as_str()),
            NodeRef::new(NodeLabel::Organization, self.organization_id.as_str()),
            PropertyMap::new(),
        )]
    }
}
