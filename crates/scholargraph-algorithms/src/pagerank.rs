//! PageRank over a citation view
//!
//! Follows the GDS `pageRank.stream` defaults: damping 0.85, at most 20
//! iterations, unnormalised scores starting from 1.0.

use super::common::{GraphView, NodeId};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy)]
pub struct PageRankConfig {
    pub damping_factor: f64,
    /// Upper bound on iterations
    pub iterations: usize,
    /// Converged once the summed absolute score change falls below this
    pub tolerance: f64,
}

impl Default for PageRankConfig {
    fn default() -> Self {
        Self {
            damping_factor: 0.85,
            iterations: 20,
            tolerance: 0.0000001,
        }
    }
}

/// Score every node of the view.
///
/// Each round a paper passes `score / out_degree` to every paper it cites;
/// papers that cite nothing pass nothing on. A paper's new score is
/// `(1 - d) + d * received`.
pub fn page_rank(view: &GraphView, config: PageRankConfig) -> HashMap<NodeId, f64> {
    let n = view.node_count;
    if n == 0 {
        return HashMap::new();
    }

    let d = config.damping_factor;
    let mut scores = vec![1.0; n];
    let mut shares = vec![0.0; n];

    for _ in 0..config.iterations {
        for (idx, share) in shares.iter_mut().enumerate() {
            let out_degree = view.out_degree(idx);
            *share = if out_degree == 0 {
                0.0
            } else {
                scores[idx] / out_degree as f64
            };
        }

        let mut delta = 0.0;
        for (idx, score) in scores.iter_mut().enumerate() {
            let received: f64 = view.predecessors(idx).iter().map(|&src| shares[src]).sum();
            let updated = (1.0 - d) + d * received;
            delta += (updated - *score).abs();
            *score = updated;
        }

        if delta < config.tolerance {
            break;
        }
    }

    view.index_to_node.iter().copied().zip(scores).collect()
}
