//! Export of the diagram graph to JSON documents and link tables.

use crate::error::FileError;
use crate::graph::Graph;
use crate::table::{Table, TableStyle};
use crate::traversal::multi_hop;
use crate::types::GraphEdge;
use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tempfile::NamedTempFile;

/// Indentation used for every JSON document.
const JSON_INDENT: &[u8] = b"    ";

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Flat list of `{source, target, label}` records.
    #[default]
    Json,
    /// One record per node with its incoming and outgoing edges.
    Adjacency,
    /// Multi-hop links as comma-separated values.
    Csv,
    /// Multi-hop links as tab-separated values.
    Tsv,
    /// Multi-hop links as an aligned plain-text table.
    Txt,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json | ExportFormat::Adjacency => "json",
            ExportFormat::Csv => "csv",
            ExportFormat::Tsv => "tsv",
            ExportFormat::Txt => "txt",
        }
    }

    /// The table layout, for the tabular formats.
    pub fn table_style(&self) -> Option<TableStyle> {
        match self {
            ExportFormat::Csv => Some(TableStyle::Csv),
            ExportFormat::Tsv => Some(TableStyle::Tsv),
            ExportFormat::Txt => Some(TableStyle::Text),
            ExportFormat::Json | ExportFormat::Adjacency => None,
        }
    }

    /// Default output file: `export.<ext>` in the working directory.
    pub fn default_path(&self) -> PathBuf {
        PathBuf::from("export").with_extension(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "adjacency" => Ok(ExportFormat::Adjacency),
            "csv" => Ok(ExportFormat::Csv),
            "tsv" => Ok(ExportFormat::Tsv),
            "txt" | "text" => Ok(ExportFormat::Txt),
            other => Err(format!(
                "unknown export format '{}' (expected json, adjacency, csv, tsv or txt)",
                other
            )),
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ExportFormat::Json => "json",
            ExportFormat::Adjacency => "adjacency",
            ExportFormat::Csv => "csv",
            ExportFormat::Tsv => "tsv",
            ExportFormat::Txt => "txt",
        };
        f.write_str(name)
    }
}

/// Everything needed to produce one export document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRequest {
    pub format: ExportFormat,
    pub path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_category: Option<String>,
}

impl ExportRequest {
    pub fn new(format: ExportFormat, path: impl Into<PathBuf>) -> Self {
        Self {
            format,
            path: path.into(),
            source_category: None,
            target_category: None,
        }
    }

    pub fn categories(mut self, source: impl Into<String>, target: impl Into<String>) -> Self {
        self.source_category = Some(source.into());
        self.target_category = Some(target.into());
        self
    }
}

/// Per-node adjacency record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRecord {
    pub name: String,
    pub description: Option<String>,
    pub children: Vec<String>,
    pub incoming_edges: Vec<GraphEdge>,
    pub outgoing_edges: Vec<GraphEdge>,
}

/// Every edge, in edge order.
pub fn flat(graph: &Graph) -> Vec<GraphEdge> {
    graph.edges().to_vec()
}

/// One record per node, in node order.
pub fn adjacency(graph: &Graph) -> Vec<NodeRecord> {
    graph
        .nodes()
        .iter()
        .map(|node| NodeRecord {
            name: node.name.clone(),
            description: node.description.clone(),
            children: node.children.clone(),
            incoming_edges: graph.incoming(&node.name).cloned().collect(),
            outgoing_edges: graph.outgoing(&node.name).cloned().collect(),
        })
        .collect()
}

/// Serialize with 4-space indentation and a trailing newline.
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, FileError> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(JSON_INDENT);
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    buf.push(b'\n');
    String::from_utf8(buf).map_err(|e| FileError::SerializationError(e.to_string()))
}

/// Render the document for a request without writing it.
pub fn render(graph: &Graph, request: &ExportRequest, max_hops: usize) -> Result<String> {
    let document = match request.format.table_style() {
        None if request.format == ExportFormat::Adjacency => to_json(&adjacency(graph))?,
        None => to_json(&flat(graph))?,
        Some(style) => {
            let (Some(source), Some(target)) = (&request.source_category, &request.target_category) else {
                eyre::bail!("{} export needs both a source and a target category", request.format);
            };
            let traversal = multi_hop(graph, source, target, max_hops);
            Table::from_links(source, target, &traversal.links).render(style)
        }
    };
    Ok(document)
}

/// Replace `path` with `contents` in one step.
///
/// The data goes to a temporary file next to the target and is renamed over
/// it, so readers never see a half-written document.
pub fn write_atomic(path: &Path, contents: &str) -> Result<(), FileError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| FileError::from_io(dir, e))?;
    tmp.write_all(contents.as_bytes())
        .map_err(|e| FileError::from_io(tmp.path(), e))?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| FileError::from_io(path, e))?;
    tmp.persist(path).map_err(|e| FileError::from_io(path, e.error))?;
    Ok(())
}

/// Render and write an export document. Returns the number of bytes written.
pub fn export(graph: &Graph, request: &ExportRequest, max_hops: usize) -> Result<usize> {
    let document = render(graph, request, max_hops)?;
    write_atomic(&request.path, &document)
        .with_context(|| format!("Failed to write {}", request.path.display()))?;

    log::info!(
        "Exported {} ({} bytes) to {}",
        request.format,
        document.len(),
        request.path.display()
    );
    Ok(document.len())
}
