//! Graph topology analysis algorithms

use super::common::{GraphView, NodeId};
use std::collections::{BTreeSet, HashMap};

fn undirected_neighbors(view: &GraphView, idx: usize) -> BTreeSet<usize> {
    view.successors(idx)
        .iter()
        .chain(view.predecessors(idx).iter())
        .copied()
        .filter(|&other| other != idx)
        .collect()
}

/// Triangles each node participates in.
///
/// Direction is ignored and parallel edges collapse, so a symmetric view and its
/// directed original give the same answer.
pub fn triangles_per_node(view: &GraphView) -> HashMap<NodeId, u64> {
    let neighbors: Vec<BTreeSet<usize>> = (0..view.node_count)
        .map(|idx| undirected_neighbors(view, idx))
        .collect();
    let mut counts = vec![0u64; view.node_count];

    // Only consider u < v < w so each triangle is found once
    for u in 0..view.node_count {
        for &v in neighbors[u].range(u + 1..) {
            for &w in neighbors[v].range(v + 1..) {
                if neighbors[u].contains(&w) {
                    counts[u] += 1;
                    counts[v] += 1;
                    counts[w] += 1;
                }
            }
        }
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(idx, count)| (view.index_to_node[idx], count))
        .collect()
}

/// Total number of triangles in the graph.
pub fn count_triangles(view: &GraphView) -> u64 {
    triangles_per_node(view).values().sum::<u64>() / 3
}
