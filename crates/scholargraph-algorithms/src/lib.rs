pub mod centrality;
pub mod common;
pub mod community;
pub mod pagerank;
pub mod topology;

pub use centrality::{betweenness_centrality, closeness_centrality};
pub use common::{GraphView, NodeId};
pub use community::{
    louvain, strongly_connected_components, weakly_connected_components, ComponentResult,
    LouvainConfig,
};
pub use pagerank::{page_rank, PageRankConfig};
pub use topology::{count_triangles, triangles_per_node};
