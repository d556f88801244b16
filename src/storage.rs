//! Storage layer for the SELT model: a SQLite database under `.selt/`.

use crate::repository::FileWriter;
use crate::types::{FileReference, GraphEdge, GraphNode};
use eyre::{Context, Result};
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Storage directory name.
pub(crate) const SELT_DIR: &str = ".selt";

/// SQLite database file.
const DB_FILE: &str = "model.db";

/// Current schema version, recorded in the meta table.
const SCHEMA_VERSION: &str = "1";

/// Storage handle for reading/writing model data.
pub struct Storage {
    root: PathBuf,
    db: Connection,
}

impl Storage {
    /// Initialize storage in the given directory.
    pub fn init(root: &Path) -> Result<Self> {
        let selt_dir = root.join(SELT_DIR);
        fs::create_dir_all(&selt_dir).context("Failed to create .selt directory")?;

        let db = Connection::open(selt_dir.join(DB_FILE)).context("Failed to open SQLite database")?;
        let storage = Self {
            root: root.to_path_buf(),
            db,
        };
        storage.init_schema()?;

        log::info!("Initialized model store in {}", root.display());
        Ok(storage)
    }

    /// Open existing storage.
    pub fn open(root: &Path) -> Result<Self> {
        let selt_dir = root.join(SELT_DIR);
        if !selt_dir.exists() {
            eyre::bail!("No .selt directory found. Run 'selt init' first.");
        }

        let db = Connection::open(selt_dir.join(DB_FILE)).context("Failed to open SQLite database")?;
        let storage = Self {
            root: root.to_path_buf(),
            db,
        };
        storage.init_schema()?;

        Ok(storage)
    }

    /// The model directory this storage lives in.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Initialize SQLite schema.
    fn init_schema(&self) -> Result<()> {
        self.db
            .execute_batch(
                r#"
                PRAGMA foreign_keys = ON;

                CREATE TABLE IF NOT EXISTS files (
                    id TEXT PRIMARY KEY,
                    name TEXT NOT NULL,
                    path TEXT NOT NULL,
                    last_modified INTEGER NOT NULL,
                    modified INTEGER NOT NULL DEFAULT 0 CHECK (modified IN (0, 1))
                );

                CREATE TABLE IF NOT EXISTS nodes (
                    name TEXT NOT NULL UNIQUE,
                    category TEXT NOT NULL,
                    description TEXT
                );
                CREATE INDEX IF NOT EXISTS idx_nodes_category ON nodes(category);

                CREATE TABLE IF NOT EXISTS children (
                    parent TEXT NOT NULL REFERENCES nodes(name) ON DELETE CASCADE,
                    child TEXT NOT NULL REFERENCES nodes(name) ON DELETE CASCADE,
                    position INTEGER NOT NULL,
                    PRIMARY KEY (parent, child)
                );

                CREATE TABLE IF NOT EXISTS edges (
                    source TEXT NOT NULL REFERENCES nodes(name) ON DELETE CASCADE,
                    target TEXT NOT NULL REFERENCES nodes(name) ON DELETE CASCADE,
                    label TEXT
                );
                CREATE INDEX IF NOT EXISTS idx_edges_source ON edges(source);
                CREATE INDEX IF NOT EXISTS idx_edges_target ON edges(target);

                CREATE TABLE IF NOT EXISTS meta (
                    key TEXT PRIMARY KEY,
                    value TEXT NOT NULL
                );
            "#,
            )
            .context("Failed to initialize schema")?;

        self.db.execute(
            "INSERT OR IGNORE INTO meta (key, value) VALUES ('schema_version', ?)",
            params![SCHEMA_VERSION],
        )?;

        Ok(())
    }

    /// Run `work` inside a SQLite transaction.
    ///
    /// The transaction commits only if `work` returns `Ok`; any error rolls
    /// back every write made through the writer.
    pub fn transaction<T, F>(&mut self, work: F) -> Result<T>
    where
        F: FnOnce(&mut dyn FileWriter) -> Result<T>,
    {
        let tx = self.db.transaction().context("Failed to begin transaction")?;
        let out = {
            let mut writer = SqlFileWriter { conn: &tx };
            work(&mut writer)?
        };
        tx.commit().context("Failed to commit transaction")?;
        Ok(out)
    }

    // ---------------------------------------------------------------------
    // File references
    // ---------------------------------------------------------------------

    /// Insert or update a file reference, keeping its original insertion order.
    pub fn save_file(&self, file: &FileReference) -> Result<()> {
        upsert_file(&self.db, file)
    }

    /// Get a file reference by ID.
    pub fn get_file(&self, id: &str) -> Result<Option<FileReference>> {
        let file = self
            .db
            .query_row(
                "SELECT id, name, path, last_modified, modified FROM files WHERE id = ?",
                params![id],
                Self::row_to_file,
            )
            .optional()?;
        Ok(file)
    }

    /// List all file references in attachment order.
    pub fn list_files(&self) -> Result<Vec<FileReference>> {
        let mut stmt = self
            .db
            .prepare("SELECT id, name, path, last_modified, modified FROM files ORDER BY rowid ASC")?;
        let files = stmt
            .query_map([], Self::row_to_file)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(files)
    }

    /// Delete a file reference. Returns true if a row was removed.
    pub fn delete_file(&self, id: &str) -> Result<bool> {
        let n = self.db.execute("DELETE FROM files WHERE id = ?", params![id])?;
        Ok(n > 0)
    }

    fn row_to_file(row: &Row<'_>) -> rusqlite::Result<FileReference> {
        Ok(FileReference {
            id: row.get(0)?,
            name: row.get(1)?,
            path: row.get(2)?,
            last_modified: row.get(3)?,
            modified: row.get::<_, i64>(4)? != 0,
        })
    }

    // ---------------------------------------------------------------------
    // Nodes
    // ---------------------------------------------------------------------

    /// Insert a node. Fails if a node with the same name exists.
    pub fn insert_node(&self, node: &GraphNode) -> Result<()> {
        self.db.execute(
            "INSERT INTO nodes (name, category, description) VALUES (?, ?, ?)",
            params![node.name, node.category, node.description],
        )?;
        for child in &node.children {
            self.insert_child(&node.name, child)?;
        }
        Ok(())
    }

    /// Check whether a node exists.
    pub fn node_exists(&self, name: &str) -> Result<bool> {
        let count: i64 = self
            .db
            .query_row("SELECT COUNT(*) FROM nodes WHERE name = ?", params![name], |row| {
                row.get(0)
            })?;
        Ok(count > 0)
    }

    /// Get a node by name, including its children.
    pub fn get_node(&self, name: &str) -> Result<Option<GraphNode>> {
        let node = self
            .db
            .query_row(
                "SELECT name, category, description FROM nodes WHERE name = ?",
                params![name],
                Self::row_to_node,
            )
            .optional()?;

        match node {
            Some(mut node) => {
                let mut stmt = self
                    .db
                    .prepare("SELECT child FROM children WHERE parent = ? ORDER BY position ASC")?;
                node.children = stmt
                    .query_map(params![name], |row| row.get(0))?
                    .collect::<rusqlite::Result<Vec<String>>>()?;
                Ok(Some(node))
            }
            None => Ok(None),
        }
    }

    /// List all nodes in insertion order, including their children.
    pub fn list_nodes(&self) -> Result<Vec<GraphNode>> {
        let mut stmt = self
            .db
            .prepare("SELECT name, category, description FROM nodes ORDER BY rowid ASC")?;
        let mut nodes = stmt
            .query_map([], Self::row_to_node)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut children: HashMap<String, Vec<String>> = HashMap::new();
        let mut child_stmt = self
            .db
            .prepare("SELECT parent, child FROM children ORDER BY parent, position ASC")?;
        let rows = child_stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?;
        for row in rows {
            let (parent, child) = row?;
            children.entry(parent).or_default().push(child);
        }

        for node in &mut nodes {
            node.children = children.remove(&node.name).unwrap_or_default();
        }

        Ok(nodes)
    }

    /// Delete a node; its edges and child links go with it.
    pub fn delete_node(&self, name: &str) -> Result<bool> {
        let n = self.db.execute("DELETE FROM nodes WHERE name = ?", params![name])?;
        Ok(n > 0)
    }

    /// Append a child to a parent's nesting list. Existing links are left in place.
    pub fn insert_child(&self, parent: &str, child: &str) -> Result<()> {
        self.db.execute(
            r#"
            INSERT OR IGNORE INTO children (parent, child, position)
            VALUES (?1, ?2, (SELECT COALESCE(MAX(position), -1) + 1 FROM children WHERE parent = ?1))
            "#,
            params![parent, child],
        )?;
        Ok(())
    }

    fn row_to_node(row: &Row<'_>) -> rusqlite::Result<GraphNode> {
        Ok(GraphNode {
            name: row.get(0)?,
            category: row.get(1)?,
            description: row.get(2)?,
            children: vec![],
        })
    }

    // ---------------------------------------------------------------------
    // Edges
    // ---------------------------------------------------------------------

    /// Append an edge.
    pub fn insert_edge(&self, edge: &GraphEdge) -> Result<()> {
        self.db.execute(
            "INSERT INTO edges (source, target, label) VALUES (?, ?, ?)",
            params![edge.source, edge.target, edge.label],
        )?;
        Ok(())
    }

    /// Check if an identical edge exists.
    pub fn edge_exists(&self, edge: &GraphEdge) -> Result<bool> {
        let count: i64 = self.db.query_row(
            "SELECT COUNT(*) FROM edges WHERE source = ? AND target = ? AND label IS ?",
            params![edge.source, edge.target, edge.label],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Delete every edge from `source` to `target`. Returns the number removed.
    pub fn delete_edges(&self, source: &str, target: &str) -> Result<usize> {
        let n = self.db.execute(
            "DELETE FROM edges WHERE source = ? AND target = ?",
            params![source, target],
        )?;
        Ok(n)
    }

    /// List all edges in insertion order.
    pub fn list_edges(&self) -> Result<Vec<GraphEdge>> {
        let mut stmt = self
            .db
            .prepare("SELECT source, target, label FROM edges ORDER BY rowid ASC")?;
        let edges = stmt
            .query_map([], |row| {
                Ok(GraphEdge {
                    source: row.get(0)?,
                    target: row.get(1)?,
                    label: row.get(2)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(edges)
    }
}

/// Writes file references through an open transaction.
struct SqlFileWriter<'a> {
    conn: &'a Connection,
}

impl FileWriter for SqlFileWriter<'_> {
    fn save_file(&mut self, file: &FileReference) -> Result<()> {
        upsert_file(self.conn, file)
    }
}

fn upsert_file(conn: &Connection, file: &FileReference) -> Result<()> {
    conn.execute(
        r#"
        INSERT INTO files (id, name, path, last_modified, modified)
        VALUES (?, ?, ?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET
            name = excluded.name,
            path = excluded.path,
            last_modified = excluded.last_modified,
            modified = excluded.modified
        "#,
        params![file.id, file.name, file.path, file.last_modified, file.modified as i64],
    )
    .with_context(|| format!("Failed to save file reference {}", file.id))?;
    Ok(())
}
