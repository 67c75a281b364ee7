//! Node of the in-memory publication graph

use super::types::NodeId;
use crate::schema::{Key, NodeLabel, PropertyMap, Tag};
use serde_json::Value;
use std::collections::BTreeSet;

/// A node: one primary label, optional derived tags, properties
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub label: NodeLabel,
    /// Secondary labels added by the recommender
    pub tags: BTreeSet<Tag>,
    pub properties: PropertyMap,
}

impl Node {
    /// Create a node holding only its natural key
    pub fn new(id: NodeId, label: NodeLabel, key: &Key) -> Self {
        let mut properties = PropertyMap::new();
        properties.insert(label.key_property().to_string(), key.to_value());
        Node {
            id,
            label,
            tags: BTreeSet::new(),
            properties,
        }
    }

    pub fn key(&self) -> Option<Key> {
        self.properties
            .get(self.label.key_property())
            .and_then(Key::from_value)
    }

    pub fn get_property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    /// Property as a JSON value, `null` when absent
    pub fn property_or_null(&self, key: &str) -> Value {
        self.properties.get(key).cloned().unwrap_or(Value::Null)
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        self.properties.get(key).and_then(Value::as_str)
    }

    /// `SET n += map` semantics: null values remove the property.
    pub fn merge_properties(&mut self, update: &PropertyMap) {
        for (key, value) in update {
            if value.is_null() {
                self.properties.shift_remove(key);
            } else {
                self.properties.insert(key.clone(), value.clone());
            }
        }
    }

    pub fn has_tag(&self, tag: Tag) -> bool {
        self.tags.contains(&tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_node_carries_key() {
        let node = Node::new(NodeId(0), NodeLabel::Year, &Key::Int(2021));
        assert_eq!(node.key(), Some(Key::Int(2021)));
        assert_eq!(node.get_property("value"), Some(&json!(2021)));
    }

    #[test]
    fn test_merge_properties() {
        let mut node = Node::new(NodeId(1), NodeLabel::Paper, &Key::from("p1"));
        let mut update = PropertyMap::new();
        update.insert("title".into(), json!("Graphs"));
        node.merge_properties(&update);
        assert_eq!(node.text("title"), Some("Graphs"));

        update.insert("title".into(), Value::Null);
        node.merge_properties(&update);
        assert_eq!(node.text("title"), None);
        assert_eq!(node.property_or_null("title"), Value::Null);
    }
}
