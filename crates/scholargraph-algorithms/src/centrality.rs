//! Path-based centrality measures
//!
//! Unweighted, following edge direction as stored in the view.

use super::common::{GraphView, NodeId};
use std::collections::{HashMap, VecDeque};

/// Betweenness centrality (Brandes).
///
/// Scores are raw pair-dependency sums; a symmetric view counts each undirected
/// path once per direction.
pub fn betweenness_centrality(view: &GraphView) -> HashMap<NodeId, f64> {
    let n = view.node_count;
    let mut centrality = vec![0.0; n];

    let mut stack = Vec::with_capacity(n);
    let mut predecessors: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut sigma = vec![0.0f64; n];
    let mut distance = vec![-1i64; n];
    let mut delta = vec![0.0f64; n];
    let mut queue = VecDeque::new();

    for source in 0..n {
        stack.clear();
        for list in predecessors.iter_mut() {
            list.clear();
        }
        sigma.iter_mut().for_each(|s| *s = 0.0);
        distance.iter_mut().for_each(|d| *d = -1);
        delta.iter_mut().for_each(|d| *d = 0.0);

        sigma[source] = 1.0;
        distance[source] = 0;
        queue.push_back(source);

        while let Some(v) = queue.pop_front() {
            stack.push(v);
            for &w in view.successors(v) {
                if distance[w] < 0 {
                    distance[w] = distance[v] + 1;
                    queue.push_back(w);
                }
                if distance[w] == distance[v] + 1 {
                    sigma[w] += sigma[v];
                    predecessors[w].push(v);
                }
            }
        }

        while let Some(w) = stack.pop() {
            for &v in &predecessors[w] {
                delta[v] += sigma[v] / sigma[w] * (1.0 + delta[w]);
            }
            if w != source {
                centrality[w] += delta[w];
            }
        }
    }

    centrality
        .into_iter()
        .enumerate()
        .map(|(idx, score)| (view.index_to_node[idx], score))
        .collect()
}

/// Closeness centrality.
///
/// `reachable / sum(distances)` over the nodes reachable from each node;
/// nodes that reach nothing score 0.
pub fn closeness_centrality(view: &GraphView) -> HashMap<NodeId, f64> {
    let n = view.node_count;
    let mut result = HashMap::with_capacity(n);
    let mut distance = vec![usize::MAX; n];
    let mut queue = VecDeque::new();

    for source in 0..n {
        distance.iter_mut().for_each(|d| *d = usize::MAX);
        distance[source] = 0;
        queue.push_back(source);

        let mut reachable = 0usize;
        let mut total_distance = 0usize;
        while let Some(v) = queue.pop_front() {
            for &w in view.successors(v) {
                if distance[w] == usize::MAX {
                    distance[w] = distance[v] + 1;
                    reachable += 1;
                    total_distance += distance[w];
                    queue.push_back(w);
                }
            }
        }

        let score = if total_distance > 0 {
            reachable as f64 / total_distance as f64
        } else {
            0.0
        };
        result.insert(view.index_to_node[source], score);
    }

    result
}
