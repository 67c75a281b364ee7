//! Community detection algorithms
//!
//! Weakly/strongly connected components and single-level Louvain modularity optimisation.

use super::common::{GraphView, NodeId};
use std::collections::{BTreeMap, HashMap};

/// Result of a component algorithm
#[derive(Debug, Clone, Default)]
pub struct ComponentResult {
    /// Map of Component ID -> List of NodeIds
    pub components: HashMap<NodeId, Vec<NodeId>>,
    /// Map of NodeId -> Component ID
    pub node_component: HashMap<NodeId, NodeId>,
}

impl ComponentResult {
    /// Component ids are the smallest member NodeId, so results are stable across runs.
    fn from_assignment(view: &GraphView, assignment: &[usize]) -> Self {
        let mut smallest: HashMap<usize, NodeId> = HashMap::new();
        for (idx, &group) in assignment.iter().enumerate() {
            let node = view.index_to_node[idx];
            smallest
                .entry(group)
                .and_modify(|current| *current = (*current).min(node))
                .or_insert(node);
        }

        let mut result = ComponentResult::default();
        for (idx, group) in assignment.iter().enumerate() {
            let node = view.index_to_node[idx];
            let component = smallest[group];
            result.components.entry(component).or_default().push(node);
            result.node_component.insert(node, component);
        }
        result
    }
}

/// Union-Find data structure
struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<usize>,
}

impl UnionFind {
    fn new(size: usize) -> Self {
        UnionFind {
            parent: (0..size).collect(),
            rank: vec![0; size],
        }
    }

    fn find(&mut self, i: usize) -> usize {
        let mut root = i;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        // Path compression
        let mut current = i;
        while self.parent[current] != root {
            let next = self.parent[current];
            self.parent[current] = root;
            current = next;
        }
        root
    }

    fn union(&mut self, i: usize, j: usize) {
        let root_i = self.find(i);
        let root_j = self.find(j);

        if root_i != root_j {
            if self.rank[root_i] < self.rank[root_j] {
                self.parent[root_i] = root_j;
            } else if self.rank[root_i] > self.rank[root_j] {
                self.parent[root_j] = root_i;
            } else {
                self.parent[root_j] = root_i;
                self.rank[root_i] += 1;
            }
        }
    }
}

/// Weakly Connected Components (WCC)
///
/// Finds all disjoint subgraphs in the graph. Ignores edge direction.
pub fn weakly_connected_components(view: &GraphView) -> ComponentResult {
    let n = view.node_count;
    let mut uf = UnionFind::new(n);

    for u_idx in 0..n {
        for &v_idx in view.successors(u_idx) {
            uf.union(u_idx, v_idx);
        }
    }

    let assignment: Vec<usize> = (0..n).map(|i| uf.find(i)).collect();
    ComponentResult::from_assignment(view, &assignment)
}

/// Strongly Connected Components (SCC)
///
/// Iterative Tarjan, so deep citation chains do not overflow the stack.
pub fn strongly_connected_components(view: &GraphView) -> ComponentResult {
    const UNVISITED: usize = usize::MAX;

    let n = view.node_count;
    let mut index = vec![UNVISITED; n];
    let mut lowlink = vec![0; n];
    let mut on_stack = vec![false; n];
    let mut stack = Vec::new();
    let mut assignment = vec![0; n];
    let mut next_index = 0;
    let mut next_component = 0;

    for root in 0..n {
        if index[root] != UNVISITED {
            continue;
        }

        // (node, position in its successor list)
        let mut work = vec![(root, 0usize)];
        index[root] = next_index;
        lowlink[root] = next_index;
        next_index += 1;
        stack.push(root);
        on_stack[root] = true;

        while let Some(&(v, pos)) = work.last() {
            let successors = view.successors(v);
            if pos < successors.len() {
                let w = successors[pos];
                let top = work.len() - 1;
                work[top].1 += 1;
                if index[w] == UNVISITED {
                    index[w] = next_index;
                    lowlink[w] = next_index;
                    next_index += 1;
                    stack.push(w);
                    on_stack[w] = true;
                    work.push((w, 0));
                } else if on_stack[w] {
                    lowlink[v] = lowlink[v].min(index[w]);
                }
                continue;
            }

            work.pop();
            if let Some(&(parent, _)) = work.last() {
                lowlink[parent] = lowlink[parent].min(lowlink[v]);
            }

            if lowlink[v] == index[v] {
                while let Some(member) = stack.pop() {
                    on_stack[member] = false;
                    assignment[member] = next_component;
                    if member == v {
                        break;
                    }
                }
                next_component += 1;
            }
        }
    }

    ComponentResult::from_assignment(view, &assignment)
}

/// Louvain configuration
#[derive(Debug, Clone, Copy)]
pub struct LouvainConfig {
    /// Maximum number of local-moving passes over all nodes
    pub max_passes: usize,
    /// Minimum modularity gain for a move to count
    pub min_gain: f64,
}

impl Default for LouvainConfig {
    fn default() -> Self {
        Self {
            max_passes: 50,
            min_gain: 1e-12,
        }
    }
}

/// Louvain community detection (single level).
///
/// Expects a symmetric view (every edge stored in both directions). Nodes are visited
/// in index order and candidate communities in ascending order, so the result is
/// deterministic. Community ids are the smallest member NodeId.
pub fn louvain(view: &GraphView, config: LouvainConfig) -> HashMap<NodeId, NodeId> {
    let n = view.node_count;
    if n == 0 {
        return HashMap::new();
    }

    let two_m = view.edge_count() as f64;
    let degree: Vec<f64> = (0..n).map(|i| view.out_degree(i) as f64).collect();
    let mut community: Vec<usize> = (0..n).collect();
    let mut total: Vec<f64> = degree.clone();

    if two_m > 0.0 {
        for _ in 0..config.max_passes {
            let mut moved = false;

            for i in 0..n {
                let current = community[i];
                let mut links: BTreeMap<usize, f64> = BTreeMap::new();
                for &j in view.successors(i) {
                    if j != i {
                        *links.entry(community[j]).or_insert(0.0) += 1.0;
                    }
                }

                total[current] -= degree[i];
                let gain = |c: usize, weight: f64| weight - total[c] * degree[i] / two_m;

                let mut best = current;
                let mut best_gain = gain(current, links.get(&current).copied().unwrap_or(0.0));
                for (&candidate, &weight) in &links {
                    let candidate_gain = gain(candidate, weight);
                    if candidate_gain > best_gain + config.min_gain {
                        best = candidate;
                        best_gain = candidate_gain;
                    }
                }

                total[best] += degree[i];
                if best != current {
                    community[i] = best;
                    moved = true;
                }
            }

            if !moved {
                break;
            }
        }
    }

    ComponentResult::from_assignment(view, &community).node_component
}
