//! Graph-algorithm invocation catalog
//!
//! Algorithms run on named projections. A projection is created on first use
//! and reused afterwards; nothing drops it unless asked to.

use crate::client::Connection;
use crate::error::{ScholarError, ScholarResult};
use crate::schema::{NodeLabel, Orientation, RelType};
use crate::statement::Statement;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use tracing::{info, warn};

/// Named, oriented subgraph materialised for algorithm execution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Projection {
    pub name: String,
    pub label: NodeLabel,
    pub relationship: RelType,
    pub orientation: Orientation,
}

impl Projection {
    pub fn new(
        name: impl Into<String>,
        label: NodeLabel,
        relationship: RelType,
        orientation: Orientation,
    ) -> Self {
        Self {
            name: name.into(),
            label,
            relationship,
            orientation,
        }
    }

    /// Paper nodes connected by CITES
    pub fn citations(name: impl Into<String>, orientation: Orientation) -> Self {
        Self::new(name, NodeLabel::Paper, RelType::Cites, orientation)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    PageRank,
    Betweenness,
    Closeness,
    TriangleCount,
    Louvain,
    StronglyConnectedComponents,
    WeaklyConnectedComponents,
}

impl Algorithm {
    pub const ALL: [Algorithm; 7] = [
        Algorithm::PageRank,
        Algorithm::Betweenness,
        Algorithm::Closeness,
        Algorithm::TriangleCount,
        Algorithm::Louvain,
        Algorithm::StronglyConnectedComponents,
        Algorithm::WeaklyConnectedComponents,
    ];

    /// GDS procedure name (`gds.<procedure>.stream`)
    pub fn procedure(&self) -> &'static str {
        match self {
            Algorithm::PageRank => "pageRank",
            Algorithm::Betweenness => "betweenness",
            Algorithm::Closeness => "closeness",
            Algorithm::TriangleCount => "triangleCount",
            Algorithm::Louvain => "louvain",
            Algorithm::StronglyConnectedComponents => "scc",
            Algorithm::WeaklyConnectedComponents => "wcc",
        }
    }

    /// Column the stream procedure yields its value in
    pub fn yield_column(&self) -> &'static str {
        match self {
            Algorithm::PageRank | Algorithm::Betweenness | Algorithm::Closeness => "score",
            Algorithm::TriangleCount => "triangleCount",
            Algorithm::Louvain => "communityId",
            Algorithm::StronglyConnectedComponents | Algorithm::WeaklyConnectedComponents => {
                "componentId"
            }
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        let wanted = name.to_ascii_lowercase().replace(['-', '_'], "");
        Algorithm::ALL.into_iter().find(|algorithm| {
            algorithm.procedure().to_ascii_lowercase() == wanted
                || format!("{:?}", algorithm).to_ascii_lowercase() == wanted
        })
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.procedure())
    }
}

/// One ranked result row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlgorithmScore {
    pub algorithm: Algorithm,
    pub projection: String,
    pub rank: usize,
    pub paper_id: String,
    pub score: f64,
}

/// Algorithms with the projection each runs on
#[derive(Debug, Clone, PartialEq)]
pub struct AlgorithmPlan {
    pub steps: Vec<(Algorithm, Projection)>,
}

impl Default for AlgorithmPlan {
    /// Directed citation graph for the centralities, undirected for the rest
    fn default() -> Self {
        let directed = Projection::citations("paper_cites", Orientation::Natural);
        let undirected = Projection::citations("paper_cites_undirected", Orientation::Undirected);
        Self {
            steps: vec![
                (Algorithm::PageRank, directed.clone()),
                (Algorithm::Betweenness, directed.clone()),
                (Algorithm::Closeness, directed),
                (Algorithm::TriangleCount, undirected.clone()),
                (Algorithm::Louvain, undirected.clone()),
                (Algorithm::StronglyConnectedComponents, undirected.clone()),
                (Algorithm::WeaklyConnectedComponents, undirected),
            ],
        }
    }
}

/// Top-N ranking: value descending, ties by paper id
pub fn rank_scores(scores: &mut Vec<(String, f64)>, limit: usize) {
    scores.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    scores.truncate(limit);
}

/// Runs algorithms through a connection, creating projections on demand
pub struct AlgorithmRunner<'c> {
    connection: &'c Connection,
    limit: usize,
    known: HashSet<String>,
}

impl<'c> AlgorithmRunner<'c> {
    pub fn new(connection: &'c Connection, limit: usize) -> Self {
        Self {
            connection,
            limit,
            known: HashSet::new(),
        }
    }

    /// Create the projection unless it already exists. Returns true if it was created.
    pub async fn ensure_projection(&mut self, projection: &Projection) -> ScholarResult<bool> {
        if self.known.contains(&projection.name) {
            return Ok(false);
        }

        let session = self.connection.session(format!("projection:{}", projection.name));
        let exists = session
            .run(&Statement::ProjectionExists {
                name: projection.name.clone(),
            })
            .await?
            .rows()
            .next()
            .map(|row| row.flag("exists"))
            .transpose()?
            .unwrap_or(false);

        if exists {
            info!("Reusing projection '{}'", projection.name);
            self.known.insert(projection.name.clone());
            return Ok(false);
        }

        let created = session
            .run(&Statement::ProjectGraph {
                projection: projection.clone(),
            })
            .await?;
        if let Some(row) = created.rows().next() {
            info!(
                "Projected '{}': {} nodes, {} relationships ({})",
                projection.name,
                row.count("nodeCount").unwrap_or(0),
                row.count("relationshipCount").unwrap_or(0),
                projection.orientation.as_str()
            );
        }
        self.known.insert(projection.name.clone());
        Ok(true)
    }

    /// Drop a projection. Returns true if it existed.
    pub async fn drop_projection(&mut self, name: &str) -> ScholarResult<bool> {
        let session = self.connection.session(format!("projection:{}", name));
        let dropped = session
            .run(&Statement::DropProjection {
                name: name.to_string(),
            })
            .await?;
        self.known.remove(name);
        Ok(!dropped.is_empty())
    }

    /// Run one algorithm and return its top rows
    pub async fn run(&mut self, algorithm: Algorithm, projection: &Projection) -> ScholarResult<Vec<AlgorithmScore>> {
        self.ensure_projection(projection).await?;

        let session = self.connection.session(format!("algorithm:{}", algorithm));
        let result = session
            .run(&Statement::StreamAlgorithm {
                algorithm,
                projection: projection.clone(),
                limit: self.limit,
            })
            .await?;

        let mut scores = Vec::with_capacity(result.len());
        for row in result.rows() {
            scores.push((row.text("paperId")?, row.float("score")?));
        }
        rank_scores(&mut scores, self.limit);

        Ok(scores
            .into_iter()
            .enumerate()
            .map(|(idx, (paper_id, score))| AlgorithmScore {
                algorithm,
                projection: projection.name.clone(),
                rank: idx + 1,
                paper_id,
                score,
            })
            .collect())
    }

    /// Run a plan. A failing algorithm is logged and skipped; fatal errors stop the run.
    pub async fn run_plan(&mut self, plan: &AlgorithmPlan) -> ScholarResult<Vec<AlgorithmScore>> {
        let mut all = Vec::new();
        for (algorithm, projection) in &plan.steps {
            match self.run(*algorithm, projection).await {
                Ok(scores) => {
                    info!("{} on '{}': {} rows", algorithm, projection.name, scores.len());
                    all.extend(scores);
                }
                Err(e) if e.is_fatal() => return Err(e),
                Err(ScholarError::Query { statement, message }) => {
                    warn!("{} on '{}' failed in {}: {}", algorithm, projection.name, statement, message);
                }
                Err(e) => warn!("{} on '{}' failed: {}", algorithm, projection.name, e),
            }
        }
        Ok(all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_plan_orientations() {
        let plan = AlgorithmPlan::default();
        assert_eq!(plan.steps.len(), 7);
        for (algorithm, projection) in &plan.steps {
            let expected = match algorithm {
                Algorithm::PageRank | Algorithm::Betweenness | Algorithm::Closeness => {
                    Orientation::Natural
                }
                _ => Orientation::Undirected,
            };
            assert_eq!(projection.orientation, expected, "{}", algorithm);
        }
    }

    #[test]
    fn test_rank_scores_ties_by_paper_id() {
        let mut scores = vec![
            ("p9".to_string(), 0.5),
            ("p2".to_string(), 0.9),
            ("p1".to_string(), 0.5),
            ("p3".to_string(), 0.1),
        ];
        rank_scores(&mut scores, 3);
        let ids: Vec<_> = scores.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["p2", "p1", "p9"]);
    }

    #[test]
    fn test_parse_algorithm_names() {
        assert_eq!(Algorithm::parse("pagerank"), Some(Algorithm::PageRank));
        assert_eq!(Algorithm::parse("triangle_count"), Some(Algorithm::TriangleCount));
        assert_eq!(Algorithm::parse("scc"), Some(Algorithm::StronglyConnectedComponents));
        assert_eq!(Algorithm::parse("dijkstra"), None);
    }
}
