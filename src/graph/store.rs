//! Graph data structures for resource relationships
//!
//! Nodes are deduplicated by object identity; edges are deduplicated by
//! (parent, label, child).

use std::collections::{HashMap, HashSet};

use kube::core::DynamicObject;
use serde::Serialize;

use crate::kube::ObjectKey;

/// Handle to a node in a [`ResourceGraph`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NodeId(pub usize);

/// A node in the resource graph
#[derive(Debug, Clone, Serialize)]
pub struct GraphNode {
    pub id: NodeId,
    #[serde(flatten)]
    pub key: ObjectKey,
    /// The object the node was first created from
    #[serde(skip)]
    pub object: DynamicObject,
}

/// A directed, labeled edge; the label is the child's kind
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct GraphEdge {
    pub from: NodeId,
    pub to: NodeId,
    pub label: String,
}

/// Node/edge store consumed by the graph builder
pub trait GraphSink {
    /// Get or create the node for an object; the same identity always yields the same handle
    fn node(&mut self, obj: &DynamicObject) -> NodeId;

    /// Add a labeled edge; inserting the same triple twice has no further effect
    fn relationship(&mut self, parent: NodeId, label: &str, child: NodeId);
}

/// A graph representing resource relationships
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResourceGraph {
    /// All nodes in the graph, indexed by `NodeId`
    pub nodes: Vec<GraphNode>,
    /// All edges in insertion order
    pub edges: Vec<GraphEdge>,
    #[serde(skip)]
    node_index: HashMap<ObjectKey, NodeId>,
    #[serde(skip)]
    edge_index: HashSet<GraphEdge>,
}

impl ResourceGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: NodeId) -> Option<&GraphNode> {
        self.nodes.get(id.0)
    }

    pub fn find(&self, key: &ObjectKey) -> Option<NodeId> {
        self.node_index.get(key).copied()
    }

    /// Outgoing edges of a node as (label, child) pairs
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = (&str, NodeId)> {
        self.edges
            .iter()
            .filter(move |e| e.from == id)
            .map(|e| (e.label.as_str(), e.to))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}

impl GraphSink for ResourceGraph {
    fn node(&mut self, obj: &DynamicObject) -> NodeId {
        let key = ObjectKey::of(obj);
        if let Some(id) = self.node_index.get(&key) {
            return *id;
        }
        let id = NodeId(self.nodes.len());
        self.node_index.insert(key.clone(), id);
        self.nodes.push(GraphNode {
            id,
            key,
            object: obj.clone(),
        });
        id
    }

    fn relationship(&mut self, parent: NodeId, label: &str, child: NodeId) {
        let edge = GraphEdge {
            from: parent,
            to: child,
            label: label.to_string(),
        };
        if self.edge_index.insert(edge.clone()) {
            self.edges.push(edge);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(kind: &str, name: &str) -> DynamicObject {
        serde_json::from_value(json!({
            "apiVersion": "v1",
            "kind": kind,
            "metadata": { "name": name, "namespace": "default" }
        }))
        .unwrap()
    }

    #[test]
    fn test_graph_creation() {
        let graph = ResourceGraph::new();
        assert_eq!(graph.node_count(), 0);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_node_is_deduplicated_by_identity() {
        let mut graph = ResourceGraph::new();
        let first = graph.node(&object("ConfigMap", "cm"));
        let second = graph.node(&object("ConfigMap", "cm"));
        let other = graph.node(&object("Secret", "cm"));
        assert_eq!(first, second);
        assert_ne!(first, other);
        assert_eq!(graph.node_count(), 2);
    }

    #[test]
    fn test_relationship_is_idempotent() {
        let mut graph = ResourceGraph::new();
        let parent = graph.node(&object("ConfigMap", "a"));
        let child = graph.node(&object("Secret", "b"));
        graph.relationship(parent, "Secret", child);
        graph.relationship(parent, "Secret", child);
        assert_eq!(graph.edge_count(), 1);

        graph.relationship(parent, "Other", child);
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.children(parent).count(), 2);
    }

    #[test]
    fn test_serialization_flattens_identity() {
        let mut graph = ResourceGraph::new();
        let parent = graph.node(&object("ConfigMap", "a"));
        let child = graph.node(&object("Secret", "b"));
        graph.relationship(parent, "Secret", child);

        let value = serde_json::to_value(&graph).unwrap();
        assert_eq!(value["nodes"][0]["kind"], "ConfigMap");
        assert_eq!(value["nodes"][0]["namespace"], "default");
        assert_eq!(value["nodes"][1]["id"], 1);
        assert_eq!(value["edges"][0]["label"], "Secret");
        assert!(value.get("node_index").is_none());
    }
}
