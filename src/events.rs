//! Messages delivered to the model handler, and what it answers.

use crate::export::ExportRequest;
use crate::tracker::ReconcileReport;
use crate::types::FileReference;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Something that happened in the host that the model has to react to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// The model document was saved, possibly under a new location.
    ModelSaved { filename: Option<PathBuf> },

    /// The user accepted the current state of an attached file.
    AcknowledgeRequested { id: String },

    /// The user asked for an export document.
    ExportRequested { request: ExportRequest },
}

/// Result of handling one event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Outcome {
    /// Reconciliation ran.
    Reconciled {
        checked: usize,
        changed: Vec<String>,
        missing: Vec<String>,
        skipped: Vec<String>,
        failed: Vec<String>,
    },

    /// A file reference after acknowledgement.
    Acknowledged { file: FileReference },

    /// An export document was written.
    Exported { path: PathBuf, bytes: usize },

    /// The event could not be handled.
    Error { message: String },
}

impl Outcome {
    /// Create an error outcome.
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }
}

impl From<ReconcileReport> for Outcome {
    fn from(report: ReconcileReport) -> Self {
        Outcome::Reconciled {
            checked: report.checked,
            changed: report.changed,
            missing: report.missing.into_iter().map(|(id, _)| id).collect(),
            skipped: report.skipped,
            failed: report.errors.into_iter().map(|(id, _)| id).collect(),
        }
    }
}
