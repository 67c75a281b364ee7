//! Directed, typed edge of the in-memory publication graph

use super::types::{EdgeId, NodeId};
use crate::schema::{PropertyMap, RelType};

#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub id: EdgeId,
    /// Edge goes FROM this node
    pub source: NodeId,
    /// Edge goes TO this node
    pub target: NodeId,
    pub rel: RelType,
    pub properties: PropertyMap,
}

impl Edge {
    pub fn new(id: EdgeId, source: NodeId, target: NodeId, rel: RelType) -> Self {
        Edge {
            id,
            source,
            target,
            rel,
            properties: PropertyMap::new(),
        }
    }

    /// `SET r += map` semantics: null values remove the property.
    pub fn merge_properties(&mut self, update: &PropertyMap) {
        for (key, value) in update {
            if value.is_null() {
                self.properties.shift_remove(key);
            } else {
                self.properties.insert(key.clone(), value.clone());
            }
        }
    }
}
