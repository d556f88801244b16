//! Shared test infrastructure for seltmodel integration tests.
//!
//! Provides TestEnv helper for consistent test setup/teardown.

#![allow(dead_code)]

use seltmodel::{FileReference, GraphNode, RecordingNotifier, Store, Tracker};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::{Duration, UNIX_EPOCH};
use tempfile::TempDir;

/// Test environment with automatic cleanup.
pub struct TestEnv {
    pub temp_dir: TempDir,
    pub store: Store,
    pub notifier: RecordingNotifier,
}

impl TestEnv {
    /// Create a new test environment with an initialized store.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = Store::init(temp_dir.path()).expect("Failed to init store");
        Self {
            temp_dir,
            store,
            notifier: RecordingNotifier::new(),
        }
    }

    /// The model directory.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Write a file under the model directory with the given mtime (seconds).
    pub fn write_file(&self, rel: &str, mtime: i64) -> PathBuf {
        write_file_at(self.root(), rel, mtime)
    }

    /// Change a file's mtime.
    pub fn touch(&self, rel: &str, mtime: i64) {
        set_mtime(&self.root().join(rel), mtime);
    }

    /// Remove a file under the model directory.
    pub fn remove_file(&self, rel: &str) {
        fs::remove_file(self.root().join(rel)).expect("Failed to remove file");
    }

    /// Attach a file under the model directory.
    pub fn attach(&mut self, rel: &str) -> FileReference {
        let selected = self.root().join(rel);
        let tracker = Tracker::new(self.temp_dir.path(), &self.notifier);
        tracker
            .attach(&mut self.store, &selected)
            .expect("Failed to attach file")
    }

    /// Add a node with no description.
    pub fn add_node(&mut self, name: &str, category: &str) -> GraphNode {
        self.store
            .add_node(name, category, None)
            .expect("Failed to add node")
    }

    /// Add an unlabeled edge.
    pub fn add_edge(&mut self, source: &str, target: &str) {
        self.store
            .add_edge(source, target, None)
            .expect("Failed to add edge");
    }

    /// Fetch a file reference that must exist.
    pub fn file(&self, id: &str) -> FileReference {
        self.store
            .get_file(id)
            .expect("Failed to get file")
            .expect("File reference should exist")
    }

    /// Assert that a file reference is flagged as modified.
    pub fn assert_modified(&self, id: &str) {
        assert!(
            self.file(id).modified,
            "Expected {} to be modified, but it wasn't",
            id
        );
    }

    /// Assert that a file reference is NOT flagged as modified.
    pub fn assert_unmodified(&self, id: &str) {
        assert!(
            !self.file(id).modified,
            "Expected {} to NOT be modified, but it was",
            id
        );
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

/// Write a file (creating parent directories) with the given mtime.
pub fn write_file_at(dir: &Path, rel: &str, mtime: i64) -> PathBuf {
    let path = dir.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create parent dir");
    }
    File::create(&path).expect("Failed to create file");
    set_mtime(&path, mtime);
    path
}

pub fn set_mtime(path: &Path, mtime: i64) {
    let file = File::options()
        .write(true)
        .open(path)
        .expect("Failed to open file");
    file.set_modified(UNIX_EPOCH + Duration::from_secs(mtime as u64))
        .expect("Failed to set mtime");
}
