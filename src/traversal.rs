//! Typed multi-hop traversal between two node categories.
//!
//! Starting from every node of the source category, edges are followed
//! breadth-first through nodes of any category. Each node of the target
//! category that is reached yields one link `source -> target`, with the
//! intermediate hops collapsed away. Traversal carries on past target nodes,
//! so `Person -> System -> System` links the person to both systems.
//!
//! A visited set per start node stops cycles; `max_hops` caps the chain
//! length and is a safety bound, not part of the result's meaning. When the
//! bound cuts a chain short the links found so far are still returned.

use crate::graph::Graph;
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};

/// Default cap on the number of edges in one chain.
pub const DEFAULT_MAX_HOPS: usize = 15;

/// A logical edge between a source-category and a target-category node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Link {
    pub source: String,
    pub target: String,
}

impl Link {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

/// Result of a multi-hop traversal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Traversal {
    /// Distinct links, by source node order then discovery order.
    pub links: Vec<Link>,
    /// True if some chain was longer than the hop bound.
    pub truncated: bool,
}

/// Collect all links from `source_category` nodes to `target_category` nodes.
pub fn multi_hop(graph: &Graph, source_category: &str, target_category: &str, max_hops: usize) -> Traversal {
    let mut links = Vec::new();
    let mut seen_links: HashSet<(&str, &str)> = HashSet::new();
    let mut seen_starts: HashSet<&str> = HashSet::new();
    let mut truncated = false;

    for start in graph.nodes_in(source_category) {
        let start = start.name.as_str();
        if !seen_starts.insert(start) {
            continue;
        }

        let mut visited: HashSet<&str> = HashSet::from([start]);
        let mut queue: VecDeque<(&str, usize)> = VecDeque::from([(start, 0)]);

        while let Some((node, depth)) = queue.pop_front() {
            if depth >= max_hops {
                if graph.outgoing(node).any(|e| !visited.contains(e.target.as_str())) {
                    truncated = true;
                }
                continue;
            }

            for edge in graph.outgoing(node) {
                let next = edge.target.as_str();
                if !visited.insert(next) {
                    continue;
                }
                if graph.category_of(next) == Some(target_category) && seen_links.insert((start, next)) {
                    links.push(Link::new(start, next));
                }
                queue.push_back((next, depth + 1));
            }
        }
    }

    if truncated {
        log::warn!(
            "Traversal {} -> {} stopped at {} hop(s); results may be incomplete",
            source_category,
            target_category,
            max_hops
        );
    }

    Traversal { links, truncated }
}
