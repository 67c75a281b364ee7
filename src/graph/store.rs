//! In-memory graph storage
//!
//! Arena-allocated nodes and edges with adjacency lists, plus the indices the
//! statement catalog needs: label, natural key, and a merge index keyed by
//! (source, target, type) so MERGE never duplicates a relationship.

use super::edge::Edge;
use super::node::Node;
use super::types::{EdgeId, NodeId};
use crate::schema::{Key, NodeLabel, RelType, Tag};
use rustc_hash::FxHashMap;
use std::collections::BTreeSet;
use thiserror::Error;

/// Errors that can occur during graph operations
#[derive(Error, Debug, PartialEq)]
pub enum GraphError {
    #[error("Node {0} not found")]
    NodeNotFound(NodeId),

    #[error("Edge {0} not found")]
    EdgeNotFound(EdgeId),

    #[error("Invalid edge: source node {0} does not exist")]
    InvalidEdgeSource(NodeId),

    #[error("Invalid edge: target node {0} does not exist")]
    InvalidEdgeTarget(NodeId),
}

pub type GraphResult<T> = Result<T, GraphError>;

#[derive(Debug, Default)]
pub struct GraphStore {
    /// Node arena; nodes are never deleted
    nodes: Vec<Node>,

    /// Edge arena; deleted edges leave a hole
    edges: Vec<Option<Edge>>,

    /// Outgoing edges for each node (adjacency list)
    outgoing: Vec<Vec<EdgeId>>,

    /// Incoming edges for each node (adjacency list)
    incoming: Vec<Vec<EdgeId>>,

    /// Label index, insertion order
    label_index: FxHashMap<NodeLabel, Vec<NodeId>>,

    /// (label, natural key) -> node
    key_index: FxHashMap<(NodeLabel, Key), NodeId>,

    /// (source, target, type) -> edge
    merge_index: FxHashMap<(NodeId, NodeId, RelType), EdgeId>,

    /// Edge type index, ordered by id
    edge_type_index: FxHashMap<RelType, BTreeSet<EdgeId>>,
}

impl GraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.merge_index.len()
    }

    pub fn find_node(&self, label: NodeLabel, key: &Key) -> Option<NodeId> {
        self.key_index.get(&(label, key.clone())).copied()
    }

    /// Node with this key, created if absent
    pub fn merge_node(&mut self, label: NodeLabel, key: &Key) -> NodeId {
        if let Some(id) = self.find_node(label, key) {
            return id;
        }

        let id = NodeId::new(self.nodes.len() as u64);
        self.nodes.push(Node::new(id, label, key));
        self.outgoing.push(Vec::new());
        self.incoming.push(Vec::new());
        self.label_index.entry(label).or_default().push(id);
        self.key_index.insert((label, key.clone()), id);
        id
    }

    pub fn get_node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn get_node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    pub fn nodes_with_label(&self, label: NodeLabel) -> impl Iterator<Item = &Node> + '_ {
        self.label_index
            .get(&label)
            .into_iter()
            .flatten()
            .filter_map(move |id| self.get_node(*id))
    }

    pub fn label_count(&self, label: NodeLabel) -> usize {
        self.label_index.get(&label).map_or(0, Vec::len)
    }

    pub fn nodes_with_tag(&self, tag: Tag) -> impl Iterator<Item = &Node> + '_ {
        self.nodes.iter().filter(move |node| node.has_tag(tag))
    }

    pub fn add_tag(&mut self, id: NodeId, tag: Tag) -> GraphResult<()> {
        let node = self.get_node_mut(id).ok_or(GraphError::NodeNotFound(id))?;
        node.tags.insert(tag);
        Ok(())
    }

    /// Remove a tag from every node; returns how many carried it.
    pub fn clear_tag(&mut self, tag: Tag) -> usize {
        self.nodes
            .iter_mut()
            .map(|node| node.tags.remove(&tag))
            .filter(|removed| *removed)
            .count()
    }

    /// Relationship of this type between the two nodes, created if absent
    pub fn merge_edge(&mut self, source: NodeId, target: NodeId, rel: RelType) -> GraphResult<EdgeId> {
        if self.get_node(source).is_none() {
            return Err(GraphError::InvalidEdgeSource(source));
        }
        if self.get_node(target).is_none() {
            return Err(GraphError::InvalidEdgeTarget(target));
        }
        if let Some(id) = self.find_edge(source, target, rel) {
            return Ok(id);
        }

        let id = EdgeId::new(self.edges.len() as u64);
        self.edges.push(Some(Edge::new(id, source, target, rel)));
        self.outgoing[source.index()].push(id);
        self.incoming[target.index()].push(id);
        self.merge_index.insert((source, target, rel), id);
        self.edge_type_index.entry(rel).or_default().insert(id);
        Ok(id)
    }

    pub fn find_edge(&self, source: NodeId, target: NodeId, rel: RelType) -> Option<EdgeId> {
        self.merge_index.get(&(source, target, rel)).copied()
    }

    pub fn get_edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id.index()).and_then(Option::as_ref)
    }

    pub fn get_edge_mut(&mut self, id: EdgeId) -> Option<&mut Edge> {
        self.edges.get_mut(id.index()).and_then(Option::as_mut)
    }

    pub fn delete_edge(&mut self, id: EdgeId) -> GraphResult<Edge> {
        let edge = self
            .edges
            .get_mut(id.index())
            .and_then(Option::take)
            .ok_or(GraphError::EdgeNotFound(id))?;

        self.outgoing[edge.source.index()].retain(|e| *e != id);
        self.incoming[edge.target.index()].retain(|e| *e != id);
        self.merge_index.remove(&(edge.source, edge.target, edge.rel));
        if let Some(ids) = self.edge_type_index.get_mut(&edge.rel) {
            ids.remove(&id);
        }
        Ok(edge)
    }

    /// Outgoing edges of one type
    pub fn outgoing(&self, node: NodeId, rel: RelType) -> impl Iterator<Item = &Edge> + '_ {
        self.outgoing
            .get(node.index())
            .into_iter()
            .flatten()
            .filter_map(move |id| self.get_edge(*id))
            .filter(move |edge| edge.rel == rel)
    }

    /// Incoming edges of one type
    pub fn incoming(&self, node: NodeId, rel: RelType) -> impl Iterator<Item = &Edge> + '_ {
        self.incoming
            .get(node.index())
            .into_iter()
            .flatten()
            .filter_map(move |id| self.get_edge(*id))
            .filter(move |edge| edge.rel == rel)
    }

    /// Nodes reached over outgoing edges of one type
    pub fn targets(&self, node: NodeId, rel: RelType) -> impl Iterator<Item = &Node> + '_ {
        self.outgoing(node, rel)
            .filter_map(move |edge| self.get_node(edge.target))
    }

    /// Nodes pointing at this one over edges of one type
    pub fn sources(&self, node: NodeId, rel: RelType) -> impl Iterator<Item = &Node> + '_ {
        self.incoming(node, rel)
            .filter_map(move |edge| self.get_node(edge.source))
    }

    pub fn edges_of_type(&self, rel: RelType) -> impl Iterator<Item = &Edge> + '_ {
        self.edge_type_index
            .get(&rel)
            .into_iter()
            .flatten()
            .filter_map(move |id| self.get_edge(*id))
    }

    pub fn rel_count(&self, rel: RelType) -> usize {
        self.edge_type_index.get(&rel).map_or(0, BTreeSet::len)
    }
}
