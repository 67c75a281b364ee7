//! Tabular output: one CSV file per analytical table

use crate::algorithms::AlgorithmScore;
use crate::analytics::{AnalyticsReport, ConferencePaper, JournalImpact, AuthorHIndex};
use crate::community::{CommunityReport, Guru, TaggedVenue, TopPaper};
use crate::error::ScholarResult;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

pub const TOP_PAPERS_FILE: &str = "top3_papers_per_conference.csv";
pub const CONFERENCE_COMMUNITY_FILE: &str = "conference_community.csv";
pub const IMPACT_FACTORS_FILE: &str = "impact_factors.csv";
pub const H_INDEXES_FILE: &str = "h_indexes.csv";
pub const TAGGED_VENUES_FILE: &str = "tagged_venues.csv";
pub const TOP_CITED_PAPERS_FILE: &str = "top_cited_papers.csv";
pub const GURUS_FILE: &str = "gurus.csv";
pub const ALGORITHM_SCORES_FILE: &str = "algorithm_scores.csv";

/// One (conference, author) pair of a conference community
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommunityMember<'a> {
    pub conference_id: &'a str,
    pub conference: &'a str,
    pub author: &'a str,
}

/// Write rows with a header line. An empty table still gets its header.
pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> ScholarResult<()> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir)?;
        }
    }
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    info!("Wrote {} rows to {}", rows.len(), path.display());
    Ok(())
}

fn write_table<T: Serialize>(dir: &Path, file: &str, rows: &[T], headers: &[&str]) -> ScholarResult<PathBuf> {
    let path = dir.join(file);
    if rows.is_empty() {
        // serde-driven headers need at least one record
        std::fs::create_dir_all(dir)?;
        let mut writer = csv::Writer::from_path(&path)?;
        writer.write_record(headers)?;
        writer.flush()?;
        info!("Wrote 0 rows to {}", path.display());
    } else {
        write_csv(&path, rows)?;
    }
    Ok(path)
}

pub fn write_analytics(dir: &Path, report: &AnalyticsReport) -> ScholarResult<Vec<PathBuf>> {
    let members: Vec<CommunityMember<'_>> = report
        .communities
        .iter()
        .flat_map(|c| {
            c.authors.iter().map(move |author| CommunityMember {
                conference_id: &c.conference_id,
                conference: &c.conference,
                author,
            })
        })
        .collect();

    Ok(vec![
        write_table::<ConferencePaper>(
            dir,
            TOP_PAPERS_FILE,
            &report.top_papers,
            &["conference_id", "conference", "rank", "paper_id", "title", "citations"],
        )?,
        write_table(
            dir,
            CONFERENCE_COMMUNITY_FILE,
            &members,
            &["conference_id", "conference", "author"],
        )?,
        write_table::<JournalImpact>(
            dir,
            IMPACT_FACTORS_FILE,
            &report.impact_factors,
            &["journal_id", "journal", "year", "papers", "citations", "impact_factor"],
        )?,
        write_table::<AuthorHIndex>(
            dir,
            H_INDEXES_FILE,
            &report.h_indexes,
            &["author_id", "author", "papers", "h_index"],
        )?,
    ])
}

pub fn write_community(dir: &Path, report: &CommunityReport) -> ScholarResult<Vec<PathBuf>> {
    Ok(vec![
        write_table::<TaggedVenue>(
            dir,
            TAGGED_VENUES_FILE,
            &report.tagged_venues,
            &["label", "venue_id", "venue", "papers", "community_papers"],
        )?,
        write_table::<TopPaper>(
            dir,
            TOP_CITED_PAPERS_FILE,
            &report.top_papers,
            &["rank", "paper_id", "title", "citations"],
        )?,
        write_table::<Guru>(dir, GURUS_FILE, &report.gurus, &["author_id", "author", "top_papers"])?,
    ])
}

pub fn write_algorithm_scores(dir: &Path, scores: &[AlgorithmScore]) -> ScholarResult<PathBuf> {
    write_table(
        dir,
        ALGORITHM_SCORES_FILE,
        scores,
        &["algorithm", "projection", "rank", "paper_id", "score"],
    )
}
