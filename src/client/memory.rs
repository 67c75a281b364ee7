//! MemoryClient: in-process graph client
//!
//! Evaluates typed statements directly on a `GraphStore`, no network needed.
//! Used by the test suite and by `--backend memory`.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::client::{GraphClient, QueryResult};
use crate::error::{ScholarError, ScholarResult};
use crate::graph::{projection, reads, GraphStore, ProjectedGraph};
use crate::schema::{Key, NodeLabel, NodeRef, RelType};
use crate::statement::Statement;

/// In-process client that wraps a GraphStore directly.
pub struct MemoryClient {
    store: Arc<RwLock<GraphStore>>,
    projections: RwLock<BTreeMap<String, ProjectedGraph>>,
}

impl Default for MemoryClient {
    fn default() -> Self {
        Self::new()
    }
}

fn matched(count: usize) -> QueryResult {
    QueryResult::single(&["matched"], vec![json!(count)])
}

fn find(store: &GraphStore, node: &NodeRef) -> Option<crate::graph::NodeId> {
    store.find_node(node.label, &node.key)
}

impl MemoryClient {
    /// Create a new MemoryClient with a fresh empty graph store
    pub fn new() -> Self {
        Self::with_store(Arc::new(RwLock::new(GraphStore::new())))
    }

    /// Create a MemoryClient wrapping an existing store
    pub fn with_store(store: Arc<RwLock<GraphStore>>) -> Self {
        Self {
            store,
            projections: RwLock::new(BTreeMap::new()),
        }
    }

    /// Get a reference to the underlying store
    pub fn store(&self) -> &Arc<RwLock<GraphStore>> {
        &self.store
    }

    /// Acquire a read lock on the store for direct inspection.
    pub async fn store_read(&self) -> tokio::sync::RwLockReadGuard<'_, GraphStore> {
        self.store.read().await
    }

    /// Names of the projections currently held
    pub async fn projection_names(&self) -> Vec<String> {
        self.projections.read().await.keys().cloned().collect()
    }

    async fn write(&self, statement: &Statement) -> ScholarResult<QueryResult> {
        let mut store = self.store.write().await;
        let failed = |e: crate::graph::GraphError| ScholarError::query(statement.name(), e.to_string());

        let count = match statement {
            Statement::UpsertNode {
                node,
                properties,
                dates,
            } => {
                let id = store.merge_node(node.label, &node.key);
                if let Some(n) = store.get_node_mut(id) {
                    n.merge_properties(properties);
                    // Dates are stored in their ISO form
                    n.merge_properties(dates);
                }
                1
            }

            Statement::MergeEdge {
                rel,
                from,
                to,
                properties,
            } => match (find(&store, from), find(&store, to)) {
                (Some(a), Some(b)) => {
                    let edge = store.merge_edge(a, b, *rel).map_err(failed)?;
                    if let Some(e) = store.get_edge_mut(edge) {
                        e.merge_properties(properties);
                    }
                    1
                }
                _ => 0,
            },

            Statement::SetNodeProperties { node, properties } => {
                match find(&store, node).and_then(|id| store.get_node_mut(id)) {
                    Some(n) => {
                        n.merge_properties(properties);
                        1
                    }
                    None => 0,
                }
            }

            Statement::SetEdgeProperties {
                rel,
                from,
                to,
                properties,
            } => {
                let edge = match (find(&store, from), find(&store, to)) {
                    (Some(a), Some(b)) => store.find_edge(a, b, *rel),
                    _ => None,
                };
                match edge.and_then(|id| store.get_edge_mut(id)) {
                    Some(e) => {
                        e.merge_properties(properties);
                        1
                    }
                    None => 0,
                }
            }

            Statement::LinkKeywordToCommunity { keyword, community } => {
                let keyword = store.merge_node(NodeLabel::Keyword, &Key::from(keyword.as_str()));
                match store.find_node(NodeLabel::Community, &Key::from(community.as_str())) {
                    Some(community) => {
                        store
                            .merge_edge(keyword, community, RelType::PartOf)
                            .map_err(failed)?;
                        1
                    }
                    None => 0,
                }
            }

            Statement::TagNode { node, tag } => match find(&store, node) {
                Some(id) => {
                    store.add_tag(id, *tag).map_err(failed)?;
                    1
                }
                None => 0,
            },

            Statement::ClearTag { tag } => store.clear_tag(*tag),

            Statement::ClearCommunityEdges { rel, community } => {
                match store.find_node(NodeLabel::Community, &Key::from(community.as_str())) {
                    Some(community) => {
                        let doomed: Vec<_> = store
                            .incoming(community, *rel)
                            .filter(|edge| {
                                store
                                    .get_node(edge.source)
                                    .is_some_and(|n| n.label == NodeLabel::Author)
                            })
                            .map(|edge| edge.id)
                            .collect();
                        for id in &doomed {
                            store.delete_edge(*id).map_err(failed)?;
                        }
                        doomed.len()
                    }
                    None => 0,
                }
            }

            other => {
                return Err(ScholarError::query(other.name(), "not a write statement"));
            }
        };

        Ok(matched(count))
    }

    async fn read(&self, statement: &Statement) -> ScholarResult<QueryResult> {
        let store = self.store.read().await;
        Ok(match statement {
            Statement::Ping => QueryResult::single(&["ok"], vec![json!(1)]),
            Statement::CountNodes { label } => reads::count_nodes(&store, *label),
            Statement::CountEdges { rel } => reads::count_edges(&store, *rel),
            Statement::ConferencePaperCitations => reads::conference_paper_citations(&store),
            Statement::ConferenceAuthorEditions => reads::conference_author_editions(&store),
            Statement::JournalWindowCitations {
                window,
                target_year,
            } => reads::journal_window_citations(&store, window, *target_year),
            Statement::AuthorPaperCitations => reads::author_paper_citations(&store),
            Statement::VenueKeywordCoverage { community } => {
                reads::venue_keyword_coverage(&store, community)
            }
            Statement::CommunityVenueCitations => reads::community_venue_citations(&store),
            Statement::AuthorTopPaperCounts => reads::author_top_paper_counts(&store),
            other => return Err(ScholarError::query(other.name(), "not a read statement")),
        })
    }

    async fn algorithm(&self, statement: &Statement) -> ScholarResult<QueryResult> {
        match statement {
            Statement::ProjectionExists { name } => {
                let exists = self.projections.read().await.contains_key(name);
                Ok(QueryResult::single(&["exists"], vec![json!(exists)]))
            }

            Statement::ProjectGraph { projection: requested } => {
                let mut projections = self.projections.write().await;
                if projections.contains_key(&requested.name) {
                    return Err(ScholarError::query(
                        statement.name(),
                        format!("A graph with name '{}' already exists.", requested.name),
                    ));
                }
                let graph = projection::project(&*self.store.read().await, requested);
                let row = vec![
                    json!(requested.name),
                    json!(graph.node_count()),
                    json!(graph.relationship_count()),
                ];
                projections.insert(requested.name.clone(), graph);
                Ok(QueryResult::single(statement.columns(), row))
            }

            Statement::DropProjection { name } => {
                let mut result = QueryResult::new(statement.columns());
                if self.projections.write().await.remove(name).is_some() {
                    result.push(vec![Value::String(name.clone())]);
                }
                Ok(result)
            }

            Statement::StreamAlgorithm {
                algorithm,
                projection: requested,
                limit,
            } => {
                let projections = self.projections.read().await;
                let graph = projections.get(&requested.name).ok_or_else(|| {
                    ScholarError::query(
                        statement.name(),
                        format!("Graph with name '{}' does not exist.", requested.name),
                    )
                })?;
                Ok(projection::stream(graph, *algorithm, *limit))
            }

            other => Err(ScholarError::query(other.name(), "not an algorithm statement")),
        }
    }
}

#[async_trait]
impl GraphClient for MemoryClient {
    async fn execute(&self, statement: &Statement) -> ScholarResult<QueryResult> {
        match statement {
            Statement::ProjectionExists { .. }
            | Statement::ProjectGraph { .. }
            | Statement::DropProjection { .. }
            | Statement::StreamAlgorithm { .. } => self.algorithm(statement).await,
            s if s.is_write() => self.write(s).await,
            s => self.read(s).await,
        }
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
