//! Core data types for the SELT model.

use serde::{Deserialize, Serialize};

/// A file attached to a diagram element, tracked for changes on disk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FileReference {
    /// Unique identifier: "sf-" + 10 hex chars
    pub id: String,

    /// Display name (base name of the attached file)
    pub name: String,

    /// Path relative to the model directory (absolute if attached from elsewhere)
    pub path: String,

    /// Last reconciled modification time, whole seconds since the epoch
    pub last_modified: i64,

    /// Set when the file on disk disagrees with `last_modified` or is gone
    #[serde(default)]
    pub modified: bool,
}

/// A typed element of the diagram graph.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GraphNode {
    /// Display identifier, used as the join key for export
    pub name: String,

    /// Type tag such as a stereotype ("Person", "Software System")
    pub category: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Names of nested nodes, in nesting order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<String>,
}

impl GraphNode {
    pub fn new(name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            description: None,
            children: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.children = children.into_iter().map(Into::into).collect();
        self
    }
}

/// A directed dependency between two nodes, referenced by name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct GraphEdge {
    pub source: String,

    pub target: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl GraphEdge {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// Validation errors for model elements.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    EmptyName,
    NameTooLong,
    InvalidCharacters,
    EmptyCategory,
    EmptyPath,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::EmptyName => write!(f, "name cannot be empty"),
            ValidationError::NameTooLong => write!(f, "name exceeds 500 characters"),
            ValidationError::InvalidCharacters => write!(f, "name contains control characters"),
            ValidationError::EmptyCategory => write!(f, "category cannot be empty"),
            ValidationError::EmptyPath => write!(f, "file path cannot be empty"),
        }
    }
}

impl std::error::Error for ValidationError {}

fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    if name.len() > 500 {
        return Err(ValidationError::NameTooLong);
    }
    if name.chars().any(|c| c.is_control()) {
        return Err(ValidationError::InvalidCharacters);
    }
    Ok(())
}

impl GraphNode {
    /// Validate the node's fields.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_name(&self.name)?;
        if self.category.trim().is_empty() {
            return Err(ValidationError::EmptyCategory);
        }
        if self.category.chars().any(|c| c.is_control()) {
            return Err(ValidationError::InvalidCharacters);
        }
        Ok(())
    }
}

impl FileReference {
    /// Validate the reference's fields.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.path.trim().is_empty() {
            return Err(ValidationError::EmptyPath);
        }
        validate_name(&self.name)
    }
}
