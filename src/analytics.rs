//! Analytical query catalog
//!
//! Every query is a read. The statement fetches per-entity aggregates and the
//! domain reductions (h-index, impact factor, top-N) happen here.

use crate::client::{Connection, QueryResult};
use crate::config::AnalyticsConfig;
use crate::error::ScholarResult;
use crate::statement::Statement;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::info;

/// h-index of a set of per-paper citation counts
pub fn h_index(citations: &[u64]) -> u64 {
    let mut sorted = citations.to_vec();
    sorted.sort_unstable_by(|a, b| b.cmp(a));
    sorted
        .iter()
        .enumerate()
        .take_while(|(idx, count)| **count >= *idx as u64 + 1)
        .count() as u64
}

/// Citations per window paper; zero papers gives zero
pub fn impact_factor(citations: u64, papers: u64) -> f64 {
    if papers == 0 {
        0.0
    } else {
        citations as f64 / papers as f64
    }
}

/// Keep the `n` most cited, ties by paper id ascending
pub fn rank_papers<T>(mut papers: Vec<(String, u64, T)>, n: usize) -> Vec<(String, u64, T)> {
    papers.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    papers.truncate(n);
    papers
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConferencePaper {
    pub conference_id: String,
    pub conference: String,
    pub rank: usize,
    pub paper_id: String,
    pub title: Option<String>,
    pub citations: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConferenceCommunity {
    pub conference_id: String,
    pub conference: String,
    /// Sorted author names
    pub authors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JournalImpact {
    pub journal_id: String,
    pub journal: String,
    pub year: i64,
    pub papers: u64,
    pub citations: u64,
    pub impact_factor: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthorHIndex {
    pub author_id: String,
    pub author: String,
    pub papers: u64,
    pub h_index: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnalyticsReport {
    pub top_papers: Vec<ConferencePaper>,
    pub communities: Vec<ConferenceCommunity>,
    pub impact_factors: Vec<JournalImpact>,
    pub h_indexes: Vec<AuthorHIndex>,
}

async fn fetch(connection: &Connection, statement: Statement) -> ScholarResult<QueryResult> {
    let session = connection.session(statement.name());
    session.run(&statement).await
}

/// Top `n` cited papers of each conference, conferences by name
pub async fn top_cited_papers_per_conference(
    connection: &Connection,
    n: usize,
) -> ScholarResult<Vec<ConferencePaper>> {
    let result = fetch(connection, Statement::ConferencePaperCitations).await?;

    let mut by_conference: BTreeMap<(String, String), Vec<(String, u64, Option<String>)>> =
        BTreeMap::new();
    for row in result.rows() {
        let conference = (row.opt_text("conference").unwrap_or_default(), row.text("conferenceId")?);
        by_conference.entry(conference).or_default().push((
            row.text("paperId")?,
            row.count("citations")?,
            row.opt_text("title"),
        ));
    }

    let mut out = Vec::new();
    for ((name, id), papers) in by_conference {
        for (idx, (paper_id, citations, title)) in rank_papers(papers, n).into_iter().enumerate() {
            out.push(ConferencePaper {
                conference_id: id.clone(),
                conference: name.clone(),
                rank: idx + 1,
                paper_id,
                title,
                citations,
            });
        }
    }
    Ok(out)
}

/// Authors with papers in at least `min_editions` distinct editions of a conference
pub async fn conference_communities(
    connection: &Connection,
    min_editions: u64,
) -> ScholarResult<Vec<ConferenceCommunity>> {
    let result = fetch(connection, Statement::ConferenceAuthorEditions).await?;

    let mut by_conference: BTreeMap<(String, String), Vec<String>> = BTreeMap::new();
    for row in result.rows() {
        if row.count("editions")? < min_editions {
            continue;
        }
        let conference = (row.opt_text("conference").unwrap_or_default(), row.text("conferenceId")?);
        let author = row
            .opt_text("author")
            .map_or_else(|| row.text("authorId"), Ok)?;
        by_conference.entry(conference).or_default().push(author);
    }

    Ok(by_conference
        .into_iter()
        .map(|((conference, conference_id), mut authors)| {
            authors.sort();
            ConferenceCommunity {
                conference_id,
                conference,
                authors,
            }
        })
        .collect())
}

/// Impact factor of every journal for `target_year`
pub async fn journal_impact_factors(
    connection: &Connection,
    target_year: i64,
) -> ScholarResult<Vec<JournalImpact>> {
    let statement = Statement::JournalWindowCitations {
        window: vec![target_year - 2, target_year - 1],
        target_year,
    };
    let result = fetch(connection, statement).await?;

    let mut journals: BTreeMap<String, (String, u64, u64)> = BTreeMap::new();
    for row in result.rows() {
        let entry = journals
            .entry(row.text("journalId")?)
            .or_insert_with(|| (row.opt_text("journal").unwrap_or_default(), 0, 0));
        // A journal without window papers comes back as one null-paper row
        if row.opt_text("paperId").is_some() {
            entry.1 += 1;
            entry.2 += row.count("citations")?;
        }
    }

    let mut out: Vec<JournalImpact> = journals
        .into_iter()
        .map(|(journal_id, (journal, papers, citations))| JournalImpact {
            journal_id,
            journal,
            year: target_year,
            papers,
            citations,
            impact_factor: impact_factor(citations, papers),
        })
        .collect();
    out.sort_by(|a, b| {
        b.impact_factor
            .total_cmp(&a.impact_factor)
            .then_with(|| a.journal.cmp(&b.journal))
            .then_with(|| a.journal_id.cmp(&b.journal_id))
    });
    Ok(out)
}

/// h-index of every author with at least one paper
pub async fn author_h_indexes(connection: &Connection) -> ScholarResult<Vec<AuthorHIndex>> {
    let result = fetch(connection, Statement::AuthorPaperCitations).await?;

    let mut authors: BTreeMap<String, (String, Vec<u64>)> = BTreeMap::new();
    for row in result.rows() {
        authors
            .entry(row.text("authorId")?)
            .or_insert_with(|| (row.opt_text("author").unwrap_or_default(), Vec::new()))
            .1
            .push(row.count("citations")?);
    }

    let mut out: Vec<AuthorHIndex> = authors
        .into_iter()
        .map(|(author_id, (author, citations))| AuthorHIndex {
            author_id,
            author,
            papers: citations.len() as u64,
            h_index: h_index(&citations),
        })
        .collect();
    out.sort_by(|a, b| {
        b.h_index
            .cmp(&a.h_index)
            .then_with(|| a.author.cmp(&b.author))
            .then_with(|| a.author_id.cmp(&b.author_id))
    });
    Ok(out)
}

/// Run the whole catalog
pub async fn run_all(connection: &Connection, config: &AnalyticsConfig) -> ScholarResult<AnalyticsReport> {
    let report = AnalyticsReport {
        top_papers: top_cited_papers_per_conference(connection, 3).await?,
        communities: conference_communities(connection, config.min_editions).await?,
        impact_factors: journal_impact_factors(connection, config.impact_year).await?,
        h_indexes: author_h_indexes(connection).await?,
    };
    info!(
        "Analytics: {} top papers, {} conference communities, {} journals, {} authors",
        report.top_papers.len(),
        report.communities.len(),
        report.impact_factors.len(),
        report.h_indexes.len()
    );
    Ok(report)
}
