//! Evaluation of the read statements over the in-memory store
//!
//! Each function mirrors the Cypher text of the matching statement: same
//! columns, same DISTINCT semantics, same treatment of missing properties.

use super::node::Node;
use super::store::GraphStore;
use super::types::NodeId;
use crate::client::QueryResult;
use crate::schema::{Key, NodeLabel, RelType, Tag};
use serde_json::{json, Value};
use std::collections::{BTreeMap, BTreeSet};

fn id_of(node: &Node) -> Value {
    node.property_or_null("id")
}

fn name_of(node: &Node) -> Value {
    node.property_or_null("name")
}

/// Distinct papers citing `paper`
fn citing_papers(store: &GraphStore, paper: NodeId) -> BTreeSet<NodeId> {
    store
        .sources(paper, RelType::Cites)
        .filter(|n| n.label == NodeLabel::Paper)
        .map(|n| n.id)
        .collect()
}

fn is_conference_proceedings(node: &Node) -> bool {
    node.label == NodeLabel::Proceedings && node.text("type") == Some("conference")
}

/// (conference, proceedings) pairs for conference-type proceedings
fn conference_proceedings(store: &GraphStore) -> Vec<(&Node, &Node)> {
    store
        .nodes_with_label(NodeLabel::Conference)
        .flat_map(move |conference| {
            store
                .sources(conference.id, RelType::PresentedIn)
                .filter(|pr| is_conference_proceedings(pr))
                .map(move |pr| (conference, pr))
        })
        .collect()
}

/// Papers PUBLISHED_IN something PRESENTED_IN `venue`
fn venue_papers(store: &GraphStore, venue: NodeId) -> BTreeSet<NodeId> {
    store
        .sources(venue, RelType::PresentedIn)
        .flat_map(move |container| store.sources(container.id, RelType::PublishedIn))
        .filter(|n| n.label == NodeLabel::Paper)
        .map(|n| n.id)
        .collect()
}

fn year_of(store: &GraphStore, paper: NodeId) -> impl Iterator<Item = i64> + '_ {
    store
        .targets(paper, RelType::InYear)
        .filter(|n| n.label == NodeLabel::Year)
        .filter_map(|n| n.get_property("value").and_then(Value::as_i64))
}

pub fn count_nodes(store: &GraphStore, label: NodeLabel) -> QueryResult {
    QueryResult::single(&["count"], vec![json!(store.label_count(label))])
}

pub fn count_edges(store: &GraphStore, rel: RelType) -> QueryResult {
    QueryResult::single(&["count"], vec![json!(store.rel_count(rel))])
}

pub fn conference_paper_citations(store: &GraphStore) -> QueryResult {
    let mut result = QueryResult::new(&["conferenceId", "conference", "paperId", "title", "citations"]);
    let mut pairs = BTreeSet::new();
    for (conference, proceedings) in conference_proceedings(store) {
        for paper in store.sources(proceedings.id, RelType::PublishedIn) {
            if paper.label == NodeLabel::Paper {
                pairs.insert((conference.id, paper.id));
            }
        }
    }

    for (conference, paper) in pairs {
        let (Some(c), Some(p)) = (store.get_node(conference), store.get_node(paper)) else {
            continue;
        };
        result.push(vec![
            id_of(c),
            name_of(c),
            id_of(p),
            p.property_or_null("title"),
            json!(citing_papers(store, paper).len()),
        ]);
    }
    result
}

pub fn conference_author_editions(store: &GraphStore) -> QueryResult {
    let mut result = QueryResult::new(&["conferenceId", "conference", "authorId", "author", "editions"]);
    // count(DISTINCT pr.edition) ignores nulls
    let mut editions: BTreeMap<(NodeId, NodeId), BTreeSet<String>> = BTreeMap::new();
    for (conference, proceedings) in conference_proceedings(store) {
        let edition = proceedings.get_property("edition").filter(|v| !v.is_null());
        for paper in store.sources(proceedings.id, RelType::PublishedIn) {
            if paper.label != NodeLabel::Paper {
                continue;
            }
            for author in store.sources(paper.id, RelType::Writes) {
                if author.label != NodeLabel::Author {
                    continue;
                }
                let seen = editions.entry((conference.id, author.id)).or_default();
                if let Some(edition) = edition {
                    seen.insert(edition.to_string());
                }
            }
        }
    }

    for ((conference, author), seen) in editions {
        let (Some(c), Some(a)) = (store.get_node(conference), store.get_node(author)) else {
            continue;
        };
        result.push(vec![id_of(c), name_of(c), id_of(a), name_of(a), json!(seen.len())]);
    }
    result
}

pub fn journal_window_citations(store: &GraphStore, window: &[i64], target_year: i64) -> QueryResult {
    let mut result = QueryResult::new(&["journalId", "journal", "paperId", "citations"]);
    for journal in store.nodes_with_label(NodeLabel::Journal) {
        let papers: BTreeSet<NodeId> = store
            .sources(journal.id, RelType::PresentedIn)
            .filter(|n| n.label == NodeLabel::Volume)
            .flat_map(move |volume| store.sources(volume.id, RelType::PublishedIn))
            .filter(|n| n.label == NodeLabel::Paper)
            .filter(|paper| year_of(store, paper.id).any(|y| window.contains(&y)))
            .map(|paper| paper.id)
            .collect();

        if papers.is_empty() {
            result.push(vec![id_of(journal), name_of(journal), Value::Null, json!(0)]);
            continue;
        }

        for paper in papers {
            let Some(p) = store.get_node(paper) else {
                continue;
            };
            let citations = citing_papers(store, paper)
                .into_iter()
                .filter(|citing| year_of(store, *citing).any(|y| y == target_year))
                .count();
            result.push(vec![id_of(journal), name_of(journal), id_of(p), json!(citations)]);
        }
    }
    result
}

pub fn author_paper_citations(store: &GraphStore) -> QueryResult {
    let mut result = QueryResult::new(&["authorId", "author", "paperId", "citations"]);
    for author in store.nodes_with_label(NodeLabel::Author) {
        let papers: BTreeSet<NodeId> = store
            .targets(author.id, RelType::Writes)
            .filter(|n| n.label == NodeLabel::Paper)
            .map(|n| n.id)
            .collect();
        for paper in papers {
            let Some(p) = store.get_node(paper) else {
                continue;
            };
            result.push(vec![
                id_of(author),
                name_of(author),
                id_of(p),
                json!(citing_papers(store, paper).len()),
            ]);
        }
    }
    result
}

pub fn venue_keyword_coverage(store: &GraphStore, community: &str) -> QueryResult {
    let mut result = QueryResult::new(&["venueLabel", "venueId", "venue", "papers", "communityPapers"]);
    let community = store.find_node(NodeLabel::Community, &Key::from(community));

    let is_relevant = |paper: NodeId| -> bool {
        let Some(community) = community else {
            return false;
        };
        store
            .targets(paper, RelType::Contains)
            .filter(|k| k.label == NodeLabel::Keyword)
            .any(|keyword| {
                store
                    .targets(keyword.id, RelType::PartOf)
                    .any(|c| c.id == community)
            })
    };

    for label in [NodeLabel::Journal, NodeLabel::Conference, NodeLabel::Workshop] {
        for venue in store.nodes_with_label(label) {
            let papers = venue_papers(store, venue.id);
            if papers.is_empty() {
                continue;
            }
            let relevant = papers.iter().filter(|p| is_relevant(**p)).count();
            result.push(vec![
                json!(label.as_str()),
                id_of(venue),
                name_of(venue),
                json!(papers.len()),
                json!(relevant),
            ]);
        }
    }
    result
}

pub fn community_venue_citations(store: &GraphStore) -> QueryResult {
    let mut result = QueryResult::new(&["paperId", "title", "citations"]);
    let specific: BTreeSet<NodeId> = store
        .nodes_with_tag(Tag::GraphSpecific)
        .flat_map(|venue| venue_papers(store, venue.id))
        .collect();

    for &paper in &specific {
        let citations = citing_papers(store, paper)
            .into_iter()
            .filter(|citing| specific.contains(citing))
            .count();
        if citations == 0 {
            continue;
        }
        let Some(p) = store.get_node(paper) else {
            continue;
        };
        result.push(vec![id_of(p), p.property_or_null("title"), json!(citations)]);
    }
    result
}

pub fn author_top_paper_counts(store: &GraphStore) -> QueryResult {
    let mut result = QueryResult::new(&["authorId", "author", "topPapers"]);
    for author in store.nodes_with_label(NodeLabel::Author) {
        let top: BTreeSet<NodeId> = store
            .targets(author.id, RelType::Writes)
            .filter(|p| p.has_tag(Tag::Top100))
            .map(|p| p.id)
            .collect();
        if !top.is_empty() {
            result.push(vec![id_of(author), name_of(author), json!(top.len())]);
        }
    }
    result
}
