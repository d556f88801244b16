//! Import of nodes and edges from a YAML or JSON model document.
//!
//! ```yaml
//! nodes:
//!   - name: Customer
//!     category: Person
//!   - name: Internet Banking
//!     category: Software System
//!     children: [Web App]
//!   - name: Web App
//!     category: Container
//! edges:
//!   - source: Customer
//!     target: Web App
//!     label: uses
//! ```

use crate::store::Store;
use crate::types::{GraphEdge, GraphNode};
use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// A whole model as written in a document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDocument {
    #[serde(default)]
    pub nodes: Vec<GraphNode>,
    #[serde(default)]
    pub edges: Vec<GraphEdge>,
}

impl ModelDocument {
    /// Parse a document; `.json` files as JSON, anything else as YAML.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let document: ModelDocument = if is_json {
            serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))?
        } else {
            serde_yaml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))?
        };
        Ok(document)
    }
}

/// Result of an import.
#[derive(Debug, Default)]
pub struct ImportResult {
    /// Names of nodes that were added.
    pub nodes: Vec<String>,
    /// Number of edges added (identical edges count once).
    pub edges: usize,
    /// Failures as (position in document section, error message).
    pub node_errors: Vec<(usize, String)>,
    pub child_errors: Vec<(String, String)>,
    pub edge_errors: Vec<(usize, String)>,
}

impl ImportResult {
    pub fn is_clean(&self) -> bool {
        self.node_errors.is_empty() && self.child_errors.is_empty() && self.edge_errors.is_empty()
    }
}

/// Extension trait for importing documents into a Store.
pub trait StoreImportExt {
    /// Add every node, nesting link and edge of `document`.
    ///
    /// Nodes go first so that nesting and edges may refer to nodes defined
    /// later in the document. A failing entry is recorded and skipped.
    fn import(&mut self, document: &ModelDocument) -> ImportResult;

    /// Load and import a document file.
    fn import_file(&mut self, path: &Path) -> Result<ImportResult>;
}

impl StoreImportExt for Store {
    fn import(&mut self, document: &ModelDocument) -> ImportResult {
        let mut result = ImportResult::default();

        let mut added = vec![false; document.nodes.len()];
        for (i, node) in document.nodes.iter().enumerate() {
            match self.add_node(&node.name, &node.category, node.description.as_deref()) {
                Ok(node) => {
                    added[i] = true;
                    result.nodes.push(node.name);
                }
                Err(e) => result.node_errors.push((i, e.to_string())),
            }
        }

        // Rejected entries must not nest anything into a node of the same name
        for (node, _) in document.nodes.iter().zip(&added).filter(|(_, added)| **added) {
            for child in &node.children {
                if let Err(e) = self.add_child(&node.name, child) {
                    result.child_errors.push((format!("{} > {}", node.name, child), e.to_string()));
                }
            }
        }

        for (i, edge) in document.edges.iter().enumerate() {
            match self.add_edge(&edge.source, &edge.target, edge.label.as_deref()) {
                Ok(_) => result.edges += 1,
                Err(e) => result.edge_errors.push((i, e.to_string())),
            }
        }

        log::info!(
            "Imported {} node(s) and {} edge(s), {} failure(s)",
            result.nodes.len(),
            result.edges,
            result.node_errors.len() + result.child_errors.len() + result.edge_errors.len()
        );
        result
    }

    fn import_file(&mut self, path: &Path) -> Result<ImportResult> {
        let document = ModelDocument::load(path)?;
        Ok(self.import(&document))
    }
}
