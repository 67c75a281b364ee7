//! Named projections and in-process algorithm execution
//!
//! A projection is a snapshot: later writes to the store do not change it,
//! matching how GDS in-memory graphs behave.

use super::store::GraphStore;
use crate::algorithms::{Algorithm, Projection};
use crate::client::QueryResult;
use crate::schema::Orientation;
use scholargraph_algorithms::{
    betweenness_centrality, closeness_centrality, louvain, page_rank, strongly_connected_components,
    triangles_per_node, weakly_connected_components, GraphView, LouvainConfig, PageRankConfig,
};
use serde_json::{json, Value};
use std::collections::HashMap;

/// A projected subgraph ready for algorithm runs
#[derive(Debug, Clone)]
pub struct ProjectedGraph {
    pub projection: Projection,
    pub view: GraphView,
    /// Store node id -> natural key of the node
    keys: HashMap<u64, Value>,
    relationship_count: usize,
}

impl ProjectedGraph {
    pub fn node_count(&self) -> usize {
        self.view.node_count
    }

    /// Relationships in the projection; undirected ones count in both directions
    pub fn relationship_count(&self) -> usize {
        self.relationship_count
    }
}

/// Snapshot the nodes of the projection's label and its relationships
pub fn project(store: &GraphStore, projection: &Projection) -> ProjectedGraph {
    let key_property = projection.label.key_property();
    let mut nodes = Vec::new();
    let mut keys = HashMap::new();
    for node in store.nodes_with_label(projection.label) {
        nodes.push(node.id.as_u64());
        keys.insert(node.id.as_u64(), node.property_or_null(key_property));
    }

    let mut edges = Vec::new();
    for edge in store.edges_of_type(projection.relationship) {
        let (source, target) = (edge.source.as_u64(), edge.target.as_u64());
        if !keys.contains_key(&source) || !keys.contains_key(&target) {
            continue;
        }
        match projection.orientation {
            Orientation::Natural => edges.push((source, target)),
            Orientation::Reverse => edges.push((target, source)),
            Orientation::Undirected => {
                edges.push((source, target));
                edges.push((target, source));
            }
        }
    }

    ProjectedGraph {
        projection: projection.clone(),
        view: GraphView::from_edges(&nodes, &edges),
        keys,
        relationship_count: edges.len(),
    }
}

/// Run an algorithm and return its top `limit` (paperId, score) rows,
/// score descending then key ascending.
pub fn stream(graph: &ProjectedGraph, algorithm: Algorithm, limit: usize) -> QueryResult {
    let view = &graph.view;
    let scores: Vec<(u64, Value)> = match algorithm {
        Algorithm::PageRank => page_rank(view, PageRankConfig::default())
            .into_iter()
            .map(|(node, score)| (node, json!(score)))
            .collect(),
        Algorithm::Betweenness => betweenness_centrality(view)
            .into_iter()
            .map(|(node, score)| (node, json!(score)))
            .collect(),
        Algorithm::Closeness => closeness_centrality(view)
            .into_iter()
            .map(|(node, score)| (node, json!(score)))
            .collect(),
        Algorithm::TriangleCount => triangles_per_node(view)
            .into_iter()
            .map(|(node, count)| (node, json!(count)))
            .collect(),
        Algorithm::Louvain => louvain(view, LouvainConfig::default())
            .into_iter()
            .map(|(node, community)| (node, json!(community)))
            .collect(),
        Algorithm::StronglyConnectedComponents => strongly_connected_components(view)
            .node_component
            .into_iter()
            .map(|(node, component)| (node, json!(component)))
            .collect(),
        Algorithm::WeaklyConnectedComponents => weakly_connected_components(view)
            .node_component
            .into_iter()
            .map(|(node, component)| (node, json!(component)))
            .collect(),
    };

    let mut rows: Vec<(String, f64, Value, Value)> = scores
        .into_iter()
        .map(|(node, score)| {
            let key = graph.keys.get(&node).cloned().unwrap_or(Value::Null);
            let sort_key = match &key {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (sort_key, score.as_f64().unwrap_or(0.0), key, score)
        })
        .collect();
    rows.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    let mut result = QueryResult::new(&["paperId", "score"]);
    for (_, _, key, score) in rows.into_iter().take(limit) {
        result.push(vec![key, score]);
    }
    result
}
