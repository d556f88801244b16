//! High-level store API for the SELT model.

use crate::graph::Graph;
use crate::repository::{FileRepository, FileWriter};
use crate::storage::Storage;
use crate::types::{FileReference, GraphEdge, GraphNode, ValidationError};
use eyre::{Context, Result};
use std::path::Path;

/// Errors that can occur during store operations.
#[derive(Debug)]
pub enum StoreError {
    /// Node not found.
    NodeNotFound(String),
    /// File reference not found.
    FileReferenceNotFound(String),
    /// A node with this name already exists.
    DuplicateNode(String),
    /// A node cannot be nested inside itself.
    SelfContainment(String),
    /// Validation error.
    Validation(ValidationError),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::NodeNotFound(name) => write!(f, "node not found: {}", name),
            StoreError::FileReferenceNotFound(id) => write!(f, "file reference not found: {}", id),
            StoreError::DuplicateNode(name) => write!(f, "node already exists: {}", name),
            StoreError::SelfContainment(name) => write!(f, "node {} cannot contain itself", name),
            StoreError::Validation(e) => write!(f, "validation error: {}", e),
        }
    }
}

impl std::error::Error for StoreError {}

/// The model store: graph elements and file references of one model directory.
pub struct Store {
    storage: Storage,
}

impl Store {
    /// Initialize a new store in the given directory.
    pub fn init(root: &Path) -> Result<Self> {
        let storage = Storage::init(root)?;
        Ok(Self { storage })
    }

    /// Open an existing store.
    pub fn open(root: &Path) -> Result<Self> {
        let storage = Storage::open(root)?;
        Ok(Self { storage })
    }

    /// The model directory.
    pub fn root(&self) -> &Path {
        self.storage.root()
    }

    // ---------------------------------------------------------------------
    // Graph
    // ---------------------------------------------------------------------

    /// Add a node.
    pub fn add_node(&mut self, name: &str, category: &str, description: Option<&str>) -> Result<GraphNode> {
        let node = GraphNode {
            name: name.to_string(),
            category: category.to_string(),
            description: description.map(String::from),
            children: vec![],
        };

        node.validate().map_err(|e| eyre::eyre!(StoreError::Validation(e)))?;

        if self.storage.node_exists(name)? {
            return Err(eyre::eyre!(StoreError::DuplicateNode(name.to_string())));
        }

        self.storage.insert_node(&node).context("Failed to persist node")?;
        log::info!("Added node '{}' ({})", node.name, node.category);

        Ok(node)
    }

    /// Get a node by name.
    pub fn get_node(&self, name: &str) -> Result<Option<GraphNode>> {
        self.storage.get_node(name)
    }

    /// List all nodes in insertion order.
    pub fn nodes(&self) -> Result<Vec<GraphNode>> {
        self.storage.list_nodes()
    }

    /// Remove a node together with its edges and nesting links.
    pub fn remove_node(&mut self, name: &str) -> Result<()> {
        if !self.storage.delete_node(name)? {
            return Err(eyre::eyre!(StoreError::NodeNotFound(name.to_string())));
        }
        log::info!("Removed node '{}'", name);
        Ok(())
    }

    /// Nest `child` inside `parent`.
    pub fn add_child(&mut self, parent: &str, child: &str) -> Result<()> {
        if parent == child {
            return Err(eyre::eyre!(StoreError::SelfContainment(parent.to_string())));
        }
        self.require_node(parent)?;
        self.require_node(child)?;

        self.storage
            .insert_child(parent, child)
            .context("Failed to persist nesting")?;
        Ok(())
    }

    /// Add a dependency edge. Adding an identical edge twice is a no-op.
    pub fn add_edge(&mut self, source: &str, target: &str, label: Option<&str>) -> Result<GraphEdge> {
        self.require_node(source)?;
        self.require_node(target)?;

        let edge = GraphEdge {
            source: source.to_string(),
            target: target.to_string(),
            label: label.map(String::from),
        };

        if self.storage.edge_exists(&edge)? {
            return Ok(edge);
        }

        self.storage.insert_edge(&edge).context("Failed to persist edge")?;
        log::info!("Added edge '{}' -> '{}'", source, target);

        Ok(edge)
    }

    /// Remove every edge from `source` to `target`. Returns how many were removed.
    pub fn remove_edge(&mut self, source: &str, target: &str) -> Result<usize> {
        let removed = self
            .storage
            .delete_edges(source, target)
            .context("Failed to remove edge")?;
        Ok(removed)
    }

    /// List all edges in insertion order.
    pub fn edges(&self) -> Result<Vec<GraphEdge>> {
        self.storage.list_edges()
    }

    /// Snapshot of the whole graph for export.
    pub fn graph(&self) -> Result<Graph> {
        let nodes = self.storage.list_nodes()?;
        let edges = self.storage.list_edges()?;
        Graph::new(nodes, edges).context("Stored graph is inconsistent")
    }

    fn require_node(&self, name: &str) -> Result<()> {
        if !self.storage.node_exists(name)? {
            return Err(eyre::eyre!(StoreError::NodeNotFound(name.to_string())));
        }
        Ok(())
    }

    // ---------------------------------------------------------------------
    // File references
    // ---------------------------------------------------------------------

    /// Get a file reference by ID.
    pub fn get_file(&self, id: &str) -> Result<Option<FileReference>> {
        self.storage.get_file(id)
    }

    /// List file references, optionally only the ones flagged as modified.
    pub fn files(&self, modified_only: bool) -> Result<Vec<FileReference>> {
        let files = self.storage.list_files()?;
        Ok(files.into_iter().filter(|f| !modified_only || f.modified).collect())
    }

    /// Remove a file reference. The file itself is left alone.
    pub fn detach(&mut self, id: &str) -> Result<()> {
        if !self.storage.delete_file(id)? {
            return Err(eyre::eyre!(StoreError::FileReferenceNotFound(id.to_string())));
        }
        log::info!("Detached file reference {}", id);
        Ok(())
    }
}

impl FileRepository for Store {
    fn select_files(&self, predicate: &dyn Fn(&FileReference) -> bool) -> Result<Vec<FileReference>> {
        let files = self.storage.list_files()?;
        Ok(files.into_iter().filter(|f| predicate(f)).collect())
    }

    fn transaction<F>(&mut self, work: F) -> Result<()>
    where
        F: FnOnce(&mut dyn FileWriter) -> Result<()>,
    {
        self.storage.transaction(work)
    }
}
