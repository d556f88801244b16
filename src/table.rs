//! Two-column tables of category-to-category links.

use crate::traversal::Link;
use std::collections::HashSet;
use std::fmt::Write;

/// Delimited or plain-text table layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableStyle {
    Csv,
    Tsv,
    Text,
}

/// A table headed by the source and target category names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub headers: [String; 2],
    pub rows: Vec<[String; 2]>,
}

impl Table {
    /// Build a table from links, dropping duplicate rows.
    pub fn from_links(source_category: &str, target_category: &str, links: &[Link]) -> Self {
        let mut seen = HashSet::new();
        let rows = links
            .iter()
            .filter(|l| seen.insert((l.source.as_str(), l.target.as_str())))
            .map(|l| [l.source.clone(), l.target.clone()])
            .collect();

        Self {
            headers: [source_category.to_string(), target_category.to_string()],
            rows,
        }
    }

    pub fn render(&self, style: TableStyle) -> String {
        match style {
            TableStyle::Csv => self.render_delimited(',', csv_field),
            TableStyle::Tsv => self.render_delimited('\t', tsv_field),
            TableStyle::Text => self.render_text(),
        }
    }

    fn render_delimited(&self, delimiter: char, field: fn(&str) -> String) -> String {
        let mut out = String::new();
        for row in std::iter::once(&self.headers).chain(self.rows.iter()) {
            out.push_str(&field(&row[0]));
            out.push(delimiter);
            out.push_str(&field(&row[1]));
            out.push('\n');
        }
        out
    }

    fn render_text(&self) -> String {
        let width = std::iter::once(&self.headers)
            .chain(self.rows.iter())
            .map(|row| row[0].chars().count())
            .max()
            .unwrap_or(0);
        let rule = std::iter::once(&self.headers)
            .chain(self.rows.iter())
            .map(|row| row[1].chars().count())
            .max()
            .unwrap_or(0);

        let mut out = String::new();
        let _ = writeln!(out, "{:<width$}  {}", self.headers[0], self.headers[1]);
        let _ = writeln!(out, "{}  {}", "-".repeat(width), "-".repeat(rule));
        for row in &self.rows {
            let _ = writeln!(out, "{:<width$}  {}", row[0], row[1]);
        }
        out
    }
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn tsv_field(value: &str) -> String {
    value.replace(['\t', '\n', '\r'], " ")
}
