//! Scholargraph
//!
//! Schema, bulk loader and analytical query catalog for a property graph of
//! academic publications: authors, papers, journals, conferences, workshops,
//! keywords and the citations between them.
//!
//! # Architecture
//!
//! - `schema`: closed node/relationship vocabulary and typed load records
//! - `statement`: every query the crate issues, as a typed value
//! - `client`: the `GraphClient` seam, with a Neo4j HTTP client and an
//!   in-process `MemoryClient`
//! - `loader`: CSV row sources, load plans and the two-stage pipeline
//! - `evolve`: second-pass enrichment records
//! - `analytics`, `community`, `algorithms`: the read-side catalogs
//! - `export`: CSV output of every analytical table

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod algorithms;
pub mod analytics;
pub mod client;
pub mod community;
pub mod config;
pub mod error;
pub mod evolve;
pub mod export;
pub mod graph;
pub mod loader;
pub mod schema;
pub mod statement;

// Re-export main types for convenience
pub use algorithms::{Algorithm, AlgorithmPlan, AlgorithmRunner, AlgorithmScore, Projection};

pub use analytics::AnalyticsReport;

pub use client::{Connection, GraphClient, MemoryClient, Neo4jHttpClient, QueryResult, Session};

pub use community::{CommunityConfig, CommunityReport, Recommender};

pub use config::{Config, ConnectionConfig};

pub use error::{RowError, ScholarError, ScholarResult};

pub use loader::{
    CsvRowSource, LoadPlan, LoadReport, LoadTask, Phase, Pipeline, Row, SchemaVariant, Stage,
    TaskReport,
};

pub use schema::{Key, NodeLabel, NodeRef, Orientation, PropertyMap, RelType, Tag};

pub use statement::Statement;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}
