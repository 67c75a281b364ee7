//! In-memory property graph backing `MemoryClient`
//!
//! Nodes carry one label from the schema plus derived tags; edges are
//! directed and typed, at most one per (source, target, type).

pub mod edge;
pub mod node;
pub mod projection;
pub mod reads;
pub mod store;
pub mod types;

// Re-export main types
pub use edge::Edge;
pub use node::Node;
pub use projection::ProjectedGraph;
pub use store::{GraphError, GraphResult, GraphStore};
pub use types::{EdgeId, NodeId};
