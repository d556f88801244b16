//! Errors raised while touching attached files or writing export documents.

use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum FileError {
    /// The resolved path does not exist.
    FileNotFound(PathBuf),
    /// Permission or other I/O failure while reading metadata.
    FileSystemError { path: PathBuf, source: io::Error },
    /// The reference carries an empty or unresolvable path.
    InvalidPath(String),
    /// An output document could not be produced or written.
    SerializationError(String),
}

impl FileError {
    /// Classify an I/O error raised for `path`.
    pub fn from_io(path: &Path, err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::NotFound {
            Self::FileNotFound(path.to_path_buf())
        } else {
            Self::FileSystemError {
                path: path.to_path_buf(),
                source: err,
            }
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::FileNotFound(_))
    }
}

impl std::fmt::Display for FileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FileNotFound(path) => write!(f, "file not found at path {}", path.display()),
            Self::FileSystemError { path, source } => {
                write!(f, "cannot access {}: {}", path.display(), source)
            }
            Self::InvalidPath(path) => write!(f, "invalid file path '{}'", path),
            Self::SerializationError(msg) => write!(f, "serialization error: {}", msg),
        }
    }
}

impl std::error::Error for FileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::FileSystemError { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for FileError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}
