//! Closed vocabularies of the publication graph
//!
//! Labels, relationship types and tags are only ever rendered into Cypher from
//! these enums, never from row data.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Ordered property map carried by statements and stored on nodes/edges
pub type PropertyMap = IndexMap<String, Value>;

/// Node labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NodeLabel {
    Author,
    Paper,
    Journal,
    Volume,
    Conference,
    Workshop,
    Proceedings,
    Keyword,
    Organization,
    Year,
    Community,
}

impl NodeLabel {
    pub const ALL: [NodeLabel; 11] = [
        NodeLabel::Author,
        NodeLabel::Paper,
        NodeLabel::Journal,
        NodeLabel::Volume,
        NodeLabel::Conference,
        NodeLabel::Workshop,
        NodeLabel::Proceedings,
        NodeLabel::Keyword,
        NodeLabel::Organization,
        NodeLabel::Year,
        NodeLabel::Community,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeLabel::Author => "Author",
            NodeLabel::Paper => "Paper",
            NodeLabel::Journal => "Journal",
            NodeLabel::Volume => "Volume",
            NodeLabel::Conference => "Conference",
            NodeLabel::Workshop => "Workshop",
            NodeLabel::Proceedings => "Proceedings",
            NodeLabel::Keyword => "Keyword",
            NodeLabel::Organization => "Organization",
            NodeLabel::Year => "Year",
            NodeLabel::Community => "Community",
        }
    }

    /// Property holding the natural key
    pub fn key_property(&self) -> &'static str {
        match self {
            NodeLabel::Keyword => "text",
            NodeLabel::Year => "value",
            NodeLabel::Community => "name",
            _ => "id",
        }
    }

    /// Journals, conferences and workshops
    pub fn is_venue(&self) -> bool {
        matches!(
            self,
            NodeLabel::Journal | NodeLabel::Conference | NodeLabel::Workshop
        )
    }

    pub fn parse(name: &str) -> Option<Self> {
        NodeLabel::ALL
            .into_iter()
            .find(|label| label.as_str().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for NodeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Relationship types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RelType {
    Writes,
    Cites,
    Reviews,
    PublishedIn,
    PresentedIn,
    Contains,
    AffiliatedTo,
    InYear,
    PartOf,
    PotentialReviewerFor,
    GuruFor,
}

impl RelType {
    pub const ALL: [RelType; 11] = [
        RelType::Writes,
        RelType::Cites,
        RelType::Reviews,
        RelType::PublishedIn,
        RelType::PresentedIn,
        RelType::Contains,
        RelType::AffiliatedTo,
        RelType::InYear,
        RelType::PartOf,
        RelType::PotentialReviewerFor,
        RelType::GuruFor,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RelType::Writes => "WRITES",
            RelType::Cites => "CITES",
            RelType::Reviews => "REVIEWS",
            RelType::PublishedIn => "PUBLISHED_IN",
            RelType::PresentedIn => "PRESENTED_IN",
            RelType::Contains => "CONTAINS",
            RelType::AffiliatedTo => "AFFILIATED_TO",
            RelType::InYear => "IN_YEAR",
            RelType::PartOf => "PART_OF",
            RelType::PotentialReviewerFor => "POTENTIAL_REVIEWER_FOR",
            RelType::GuruFor => "GURU_FOR",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        RelType::ALL
            .into_iter()
            .find(|rel| rel.as_str().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for RelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Secondary labels attached by the recommender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tag {
    /// Venue whose papers are predominantly in the community
    GraphSpecific,
    /// One of the most-cited papers of the community's venues
    Top100,
}

impl Tag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tag::GraphSpecific => "GraphSpecific",
            Tag::Top100 => "Top100",
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Relationship orientation of a projection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Natural,
    Reverse,
    Undirected,
}

impl Orientation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Orientation::Natural => "NATURAL",
            Orientation::Reverse => "REVERSE",
            Orientation::Undirected => "UNDIRECTED",
        }
    }
}

/// Natural-key value of a node
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    Text(String),
    Int(i64),
}

impl Key {
    pub fn to_value(&self) -> Value {
        match self {
            Key::Text(text) => Value::String(text.clone()),
            Key::Int(n) => Value::from(*n),
        }
    }

    /// Keys read back from stored properties. Floats and nulls are not keys.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(text) => Some(Key::Text(text.clone())),
            Value::Number(n) => n.as_i64().map(Key::Int),
            _ => None,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Text(text) => f.write_str(text),
            Key::Int(n) => write!(f, "{}", n),
        }
    }
}

impl From<&str> for Key {
    fn from(text: &str) -> Self {
        Key::Text(text.to_string())
    }
}

impl From<String> for Key {
    fn from(text: String) -> Self {
        Key::Text(text)
    }
}

impl From<i64> for Key {
    fn from(n: i64) -> Self {
        Key::Int(n)
    }
}

/// A node addressed by label and natural key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeRef {
    pub label: NodeLabel,
    pub key: Key,
}

impl NodeRef {
    pub fn new(label: NodeLabel, key: impl Into<Key>) -> Self {
        Self {
            label,
            key: key.into(),
        }
    }

    pub fn key_property(&self) -> &'static str {
        self.label.key_property()
    }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}:{} '{}')", self.label, self.label.key_property(), self.key)
    }
}
