//! Community-influence recommender
//!
//! Derives venue tags, top papers and reviewer relations for one research
//! community from the base graph. Every run clears the previous derivation
//! first, so the outcome only depends on the base graph.

use crate::analytics::rank_papers;
use crate::client::{Connection, Session};
use crate::error::{ScholarError, ScholarResult};
use crate::schema::{Key, NodeLabel, NodeRef, PropertyMap, RelType, Tag};
use crate::statement::Statement;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

const THRESHOLD_SCALE: f64 = 1_000_000.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommunityConfig {
    pub name: String,
    pub keywords: Vec<String>,
    /// Minimum share of community papers for a venue to be tagged
    pub threshold: f64,
    pub top_papers: usize,
    /// Top papers an author needs to be a guru
    pub guru_min_papers: u64,
}

impl Default for CommunityConfig {
    fn default() -> Self {
        Self {
            name: "Graph".to_string(),
            keywords: [
                "graph",
                "graph neural",
                "knowledge graphs",
                "knowledge graph",
                "bipartite graphs",
                "graph convolutional",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            threshold: 0.9,
            top_papers: 100,
            guru_min_papers: 2,
        }
    }
}

/// `community / papers >= threshold`, evaluated on integers.
///
/// The threshold is fixed to six decimal places so 0.9 compares exactly.
pub fn meets_threshold(community: u64, papers: u64, threshold: f64) -> bool {
    if papers == 0 {
        return false;
    }
    let scaled = (threshold * THRESHOLD_SCALE).round().max(0.0) as u128;
    community as u128 * THRESHOLD_SCALE as u128 >= scaled * papers as u128
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaggedVenue {
    pub label: String,
    pub venue_id: String,
    pub venue: String,
    pub papers: u64,
    pub community_papers: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopPaper {
    pub rank: usize,
    pub paper_id: String,
    pub title: Option<String>,
    pub citations: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Guru {
    pub author_id: String,
    pub author: String,
    pub top_papers: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CommunityReport {
    pub community: String,
    pub tagged_venues: Vec<TaggedVenue>,
    pub top_papers: Vec<TopPaper>,
    pub reviewers: usize,
    pub gurus: Vec<Guru>,
}

pub struct Recommender<'c> {
    connection: &'c Connection,
    config: CommunityConfig,
}

impl<'c> Recommender<'c> {
    pub fn new(connection: &'c Connection, config: CommunityConfig) -> Self {
        Self { connection, config }
    }

    pub async fn run(&self) -> ScholarResult<CommunityReport> {
        let session = self.connection.session(format!("community:{}", self.config.name));
        let community = self.config.name.clone();

        self.define(&session).await?;
        self.clear(&session).await?;
        let tagged_venues = self.tag_venues(&session).await?;
        let top_papers = self.tag_top_papers(&session).await?;
        let (reviewers, gurus) = self.link_authors(&session).await?;

        info!(
            "Community '{}': {} venues tagged, {} top papers, {} reviewers, {} gurus",
            community,
            tagged_venues.len(),
            top_papers.len(),
            reviewers,
            gurus.len()
        );
        Ok(CommunityReport {
            community,
            tagged_venues,
            top_papers,
            reviewers,
            gurus,
        })
    }

    fn community_ref(&self) -> NodeRef {
        NodeRef::new(NodeLabel::Community, self.config.name.as_str())
    }

    async fn define(&self, session: &Session<'_>) -> ScholarResult<()> {
        session
            .run(&Statement::UpsertNode {
                node: self.community_ref(),
                properties: PropertyMap::new(),
                dates: PropertyMap::new(),
            })
            .await?;
        for keyword in &self.config.keywords {
            let linked = session
                .run(&Statement::LinkKeywordToCommunity {
                    keyword: keyword.clone(),
                    community: self.config.name.clone(),
                })
                .await?;
            if linked.matched() == 0 {
                return Err(ScholarError::UnexpectedResult(format!(
                    "keyword '{}' was not linked to community '{}'",
                    keyword, self.config.name
                )));
            }
        }
        Ok(())
    }

    async fn clear(&self, session: &Session<'_>) -> ScholarResult<()> {
        for tag in [Tag::GraphSpecific, Tag::Top100] {
            let cleared = session.run(&Statement::ClearTag { tag }).await?.matched();
            debug!("Cleared {} from {} nodes", tag, cleared);
        }
        for rel in [RelType::PotentialReviewerFor, RelType::GuruFor] {
            let cleared = session
                .run(&Statement::ClearCommunityEdges {
                    rel,
                    community: self.config.name.clone(),
                })
                .await?
                .matched();
            debug!("Deleted {} {} relationships", cleared, rel);
        }
        Ok(())
    }

    async fn tag_venues(&self, session: &Session<'_>) -> ScholarResult<Vec<TaggedVenue>> {
        let coverage = session
            .run(&Statement::VenueKeywordCoverage {
                community: self.config.name.clone(),
            })
            .await?;

        let mut tagged = Vec::new();
        for row in coverage.rows() {
            let papers = row.count("papers")?;
            let community_papers = row.count("communityPapers")?;
            if !meets_threshold(community_papers, papers, self.config.threshold) {
                continue;
            }

            let label_name = row.text("venueLabel")?;
            let label = NodeLabel::parse(&label_name)
                .filter(NodeLabel::is_venue)
                .ok_or_else(|| {
                    ScholarError::UnexpectedResult(format!("'{}' is not a venue label", label_name))
                })?;
            let venue_id = row.text("venueId")?;
            session
                .run(&Statement::TagNode {
                    node: NodeRef::new(label, venue_id.as_str()),
                    tag: Tag::GraphSpecific,
                })
                .await?;
            tagged.push(TaggedVenue {
                label: label_name,
                venue: row.opt_text("venue").unwrap_or_default(),
                venue_id,
                papers,
                community_papers,
            });
        }
        tagged.sort_by(|a, b| a.venue.cmp(&b.venue).then_with(|| a.venue_id.cmp(&b.venue_id)));
        Ok(tagged)
    }

    async fn tag_top_papers(&self, session: &Session<'_>) -> ScholarResult<Vec<TopPaper>> {
        let citations = session.run(&Statement::CommunityVenueCitations).await?;
        let mut papers = Vec::with_capacity(citations.len());
        for row in citations.rows() {
            papers.push((row.text("paperId")?, row.count("citations")?, row.opt_text("title")));
        }

        let mut top = Vec::new();
        for (idx, (paper_id, citations, title)) in rank_papers(papers, self.config.top_papers)
            .into_iter()
            .enumerate()
        {
            session
                .run(&Statement::TagNode {
                    node: NodeRef::new(NodeLabel::Paper, Key::from(paper_id.as_str())),
                    tag: Tag::Top100,
                })
                .await?;
            top.push(TopPaper {
                rank: idx + 1,
                paper_id,
                title,
                citations,
            });
        }
        Ok(top)
    }

    async fn link_authors(&self, session: &Session<'_>) -> ScholarResult<(usize, Vec<Guru>)> {
        let counts = session.run(&Statement::AuthorTopPaperCounts).await?;
        let community = self.community_ref();

        let mut reviewers = 0;
        let mut gurus = Vec::new();
        for row in counts.rows() {
            let top_papers = row.count("topPapers")?;
            if top_papers == 0 {
                continue;
            }
            let author_id = row.text("authorId")?;
            let author = NodeRef::new(NodeLabel::Author, author_id.as_str());

            session
                .run(&Statement::MergeEdge {
                    rel: RelType::PotentialReviewerFor,
                    from: author.clone(),
                    to: community.clone(),
                    properties: PropertyMap::new(),
                })
                .await?;
            reviewers += 1;

            if top_papers >= self.config.guru_min_papers {
                session
                    .run(&Statement::MergeEdge {
                        rel: RelType::GuruFor,
                        from: author,
                        to: community.clone(),
                        properties: PropertyMap::new(),
                    })
                    .await?;
                gurus.push(Guru {
                    author: row.opt_text("author").unwrap_or_default(),
                    author_id,
                    top_papers,
                });
            }
        }
        gurus.sort_by(|a, b| {
            b.top_papers
                .cmp(&a.top_papers)
                .then_with(|| a.author.cmp(&b.author))
                .then_with(|| a.author_id.cmp(&b.author_id))
        });
        Ok((reviewers, gurus))
    }
}
