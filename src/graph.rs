//! In-memory snapshot of the diagram graph.

use crate::store::StoreError;
use crate::types::{GraphEdge, GraphNode};
use eyre::Result;
use std::collections::HashMap;

/// Nodes and directed edges, in the order they were supplied.
///
/// Node names are the join key. When two nodes share a name, lookups by
/// name resolve to the first one.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: Vec<GraphNode>,
    edges: Vec<GraphEdge>,
    index: HashMap<String, usize>,
}

impl Graph {
    /// Build a graph, checking that every edge endpoint is a known node.
    pub fn new(nodes: Vec<GraphNode>, edges: Vec<GraphEdge>) -> Result<Self> {
        let mut index = HashMap::with_capacity(nodes.len());
        for (i, node) in nodes.iter().enumerate() {
            index.entry(node.name.clone()).or_insert(i);
        }

        for edge in &edges {
            for end in [&edge.source, &edge.target] {
                if !index.contains_key(end) {
                    return Err(eyre::eyre!(StoreError::NodeNotFound(end.clone())));
                }
            }
        }

        Ok(Self { nodes, edges, index })
    }

    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[GraphEdge] {
        &self.edges
    }

    pub fn node(&self, name: &str) -> Option<&GraphNode> {
        self.index.get(name).map(|&i| &self.nodes[i])
    }

    /// Category of the named node.
    pub fn category_of(&self, name: &str) -> Option<&str> {
        self.node(name).map(|n| n.category.as_str())
    }

    /// Edges leaving the named node, in edge order.
    pub fn outgoing<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a GraphEdge> + 'a {
        self.edges.iter().filter(move |e| e.source == name)
    }

    /// Edges arriving at the named node, in edge order.
    pub fn incoming<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a GraphEdge> + 'a {
        self.edges.iter().filter(move |e| e.target == name)
    }

    /// Nodes of the given category, in node order.
    pub fn nodes_in<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a GraphNode> + 'a {
        self.nodes.iter().filter(move |n| n.category == category)
    }
}
