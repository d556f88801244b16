//! SELT model: attached-file tracking and diagram graph export.
//!
//! The model store keeps diagram elements (typed nodes and their dependency
//! edges) and file references attached to them. Two things happen on top:
//!
//! - reconciliation flags file references whose file changed or vanished
//!   since it was last acknowledged, relative to a movable model directory;
//! - export writes the graph as JSON (flat or per node) or as a table of
//!   links between two node categories, following edges across hops.
//!
//! # Example
//!
//! ```no_run
//! use seltmodel::{Config, Event, Handler, LogNotifier, Store};
//! use seltmodel::export::{ExportFormat, ExportRequest};
//! use std::path::Path;
//!
//! let mut store = Store::init(Path::new(".")).unwrap();
//! store.add_node("Customer", "Person", None).unwrap();
//! store.add_node("Internet Banking", "Software System", None).unwrap();
//! store.add_edge("Customer", "Internet Banking", Some("uses")).unwrap();
//!
//! let notifier = LogNotifier;
//! let mut handler = Handler::new(store, Config::default(), &notifier);
//!
//! // The model was saved: flag attached files that changed on disk
//! handler.handle(Event::ModelSaved { filename: None });
//!
//! // Export person -> system links as CSV
//! let request = ExportRequest::new(ExportFormat::Csv, "links.csv")
//!     .categories("Person", "Software System");
//! handler.handle(Event::ExportRequested { request });
//! ```

mod id;
mod storage;
mod store;
mod types;

pub mod config;
pub mod error;
pub mod events;
pub mod export;
pub mod graph;
pub mod handler;
pub mod import;
pub mod notify;
pub mod repository;
pub mod table;
pub mod tracker;
pub mod traversal;

// Re-export public API
pub use config::Config;
pub use error::FileError;
pub use events::{Event, Outcome};
pub use graph::Graph;
pub use handler::Handler;
pub use import::{ModelDocument, StoreImportExt};
pub use notify::{LogNotifier, Notifier, RecordingNotifier};
pub use repository::{FileRepository, FileWriter, MemoryRepository};
pub use store::{Store, StoreError};
pub use tracker::{FileState, ReconcileReport, Tracker};
pub use traversal::{DEFAULT_MAX_HOPS, Link};
pub use types::{FileReference, GraphEdge, GraphNode, ValidationError};
