//! Model configuration, read from `.selt/config.yaml`.

use crate::export::ExportFormat;
use crate::storage::SELT_DIR;
use crate::traversal::DEFAULT_MAX_HOPS;
use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration file name within the .selt directory.
const CONFIG_FILE: &str = "config.yaml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Longest chain of edges followed by the multi-hop export.
    pub max_hops: usize,

    /// Format used by `export` when none is given.
    pub table_format: ExportFormat,

    /// Push missing files to the notification channel, not just the log.
    pub notify_missing: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_hops: DEFAULT_MAX_HOPS,
            table_format: ExportFormat::Csv,
            notify_missing: true,
        }
    }
}

impl Config {
    /// Create a new config with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_hops(mut self, hops: usize) -> Self {
        self.max_hops = hops;
        self
    }

    pub fn table_format(mut self, format: ExportFormat) -> Self {
        self.table_format = format;
        self
    }

    pub fn notify_missing(mut self, notify: bool) -> Self {
        self.notify_missing = notify;
        self
    }

    /// Path of the config file for a model directory.
    pub fn path(root: &Path) -> PathBuf {
        root.join(SELT_DIR).join(CONFIG_FILE)
    }

    /// Load the model directory's config, falling back to defaults if there is none.
    pub fn load(root: &Path) -> Result<Self> {
        let path = Self::path(root);
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Config =
            serde_yaml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))?;
        if config.table_format.table_style().is_none() {
            eyre::bail!(
                "{}: table_format must be csv, tsv or txt, not {}",
                path.display(),
                config.table_format
            );
        }
        Ok(config)
    }

    /// Write this config into the model directory.
    pub fn save(&self, root: &Path) -> Result<()> {
        let path = Self::path(root);
        let content = serde_yaml::to_string(self).context("Failed to serialize config")?;
        fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }
}
