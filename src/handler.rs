//! Single-threaded dispatch of host events to the tracker and exporter.

use crate::config::Config;
use crate::events::{Event, Outcome};
use crate::export::{self, ExportRequest};
use crate::notify::Notifier;
use crate::store::Store;
use crate::tracker::Tracker;
use eyre::Result;
use std::path::{Path, PathBuf};

/// Handles events one at a time against a model store.
pub struct Handler<'a> {
    store: Store,
    config: Config,
    notifier: &'a dyn Notifier,
}

impl<'a> Handler<'a> {
    pub fn new(store: Store, config: Config, notifier: &'a dyn Notifier) -> Self {
        Self {
            store,
            config,
            notifier,
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut Store {
        &mut self.store
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Directory that attached paths are relative to after saving as `filename`.
    ///
    /// Without a filename the model directory itself is used.
    pub fn base_dir_for(&self, filename: Option<&Path>) -> PathBuf {
        match filename.and_then(Path::parent) {
            Some(parent) if parent.as_os_str().is_empty() => PathBuf::from("."),
            Some(parent) => parent.to_path_buf(),
            None => self.store.root().to_path_buf(),
        }
    }

    fn tracker(&self, base_dir: PathBuf) -> Tracker<'a> {
        Tracker::new(base_dir, self.notifier).notify_missing(self.config.notify_missing)
    }

    /// Handle a single event.
    pub fn handle(&mut self, event: Event) -> Outcome {
        log::debug!("Handling {:?}", event);
        match event {
            Event::ModelSaved { filename } => {
                let base_dir = self.base_dir_for(filename.as_deref());
                match self.tracker(base_dir).reconcile(&mut self.store) {
                    Ok(report) => report.into(),
                    Err(e) => self.fail(e),
                }
            }

            Event::AcknowledgeRequested { id } => {
                let base_dir = self.store.root().to_path_buf();
                match self.tracker(base_dir).acknowledge(&mut self.store, &id) {
                    Ok(file) => Outcome::Acknowledged { file },
                    Err(e) => Outcome::error(format!("{:#}", e)),
                }
            }

            Event::ExportRequested { request } => match self.export(&request) {
                Ok(bytes) => Outcome::Exported {
                    path: request.path,
                    bytes,
                },
                Err(e) => self.fail(e),
            },
        }
    }

    fn export(&self, request: &ExportRequest) -> Result<usize> {
        let graph = self.store.graph()?;
        export::export(&graph, request, self.config.max_hops)
    }

    fn fail(&self, e: eyre::Report) -> Outcome {
        let message = format!("{:#}", e);
        log::error!("{}", message);
        self.notifier.notify(&message);
        Outcome::error(message)
    }
}
