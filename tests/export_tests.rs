//! Integration tests for graph export.
//!
//! Tests flat and adjacency JSON documents, multi-hop category tables,
//! and how export files are written.

mod common;

use common::TestEnv;
use seltmodel::export::{self, ExportFormat, ExportRequest};
use seltmodel::traversal::multi_hop;
use seltmodel::{DEFAULT_MAX_HOPS, Link};
use std::fs;

fn c4_model(env: &mut TestEnv) {
    env.add_node("Customer", "Person");
    env.add_node("Web App", "Container");
    env.add_node("API", "Container");
    env.add_node("Banking", "Software System");
    env.add_node("Mail", "Software System");
    env.store.add_child("Banking", "Web App").unwrap();
    env.store.add_child("Banking", "API").unwrap();

    env.store.add_edge("Customer", "Web App", Some("uses")).unwrap();
    env.add_edge("Web App", "API");
    env.add_edge("API", "Banking");
    env.add_edge("Banking", "Mail");
}

// =============================================================================
// JSON Export Tests
// =============================================================================

#[test]
fn test_flat_export_is_byte_identical_across_runs() {
    let mut env = TestEnv::new();
    c4_model(&mut env);
    let graph = env.store.graph().unwrap();
    let path = env.root().join("export.json");
    let request = ExportRequest::new(ExportFormat::Json, &path);

    export::export(&graph, &request, DEFAULT_MAX_HOPS).unwrap();
    let first = fs::read(&path).unwrap();
    export::export(&graph, &request, DEFAULT_MAX_HOPS).unwrap();
    let second = fs::read(&path).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_flat_export_lists_edges_in_order() {
    let mut env = TestEnv::new();
    c4_model(&mut env);
    let graph = env.store.graph().unwrap();

    let document = export::render(&graph, &ExportRequest::new(ExportFormat::Json, "x.json"), 15).unwrap();
    let records: Vec<serde_json::Value> = serde_json::from_str(&document).unwrap();

    assert_eq!(records.len(), 4);
    assert_eq!(records[0]["source"], "Customer");
    assert_eq!(records[0]["target"], "Web App");
    assert_eq!(records[0]["label"], "uses");
    assert_eq!(records[3]["source"], "Banking");
    assert_eq!(records[3]["target"], "Mail");
    assert!(document.starts_with("[\n    {\n        \"source\""));
}

#[test]
fn test_graph_without_edges() {
    let mut env = TestEnv::new();
    env.add_node("Lonely", "Person");
    let graph = env.store.graph().unwrap();

    let flat = export::render(&graph, &ExportRequest::new(ExportFormat::Json, "x.json"), 15).unwrap();
    assert_eq!(flat, "[]\n");

    let adjacency = export::render(&graph, &ExportRequest::new(ExportFormat::Adjacency, "x.json"), 15).unwrap();
    let records: Vec<serde_json::Value> = serde_json::from_str(&adjacency).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["name"], "Lonely");
    assert_eq!(records[0]["incomingEdges"], serde_json::json!([]));
    assert_eq!(records[0]["outgoingEdges"], serde_json::json!([]));
}

#[test]
fn test_adjacency_export_per_node() {
    let mut env = TestEnv::new();
    c4_model(&mut env);
    let graph = env.store.graph().unwrap();

    let document = export::render(&graph, &ExportRequest::new(ExportFormat::Adjacency, "x.json"), 15).unwrap();
    let records: Vec<serde_json::Value> = serde_json::from_str(&document).unwrap();

    assert_eq!(records.len(), 5);
    let banking = records.iter().find(|r| r["name"] == "Banking").unwrap();
    assert_eq!(banking["children"], serde_json::json!(["Web App", "API"]));
    assert_eq!(banking["incomingEdges"].as_array().unwrap().len(), 1);
    assert_eq!(banking["incomingEdges"][0]["source"], "API");
    assert_eq!(banking["outgoingEdges"][0]["target"], "Mail");
}

// =============================================================================
// Multi-hop Export Tests
// =============================================================================

#[test]
fn test_multi_hop_through_containers() {
    let mut env = TestEnv::new();
    c4_model(&mut env);
    let graph = env.store.graph().unwrap();

    let result = multi_hop(&graph, "Person", "Software System", DEFAULT_MAX_HOPS);

    assert_eq!(
        result.links,
        vec![Link::new("Customer", "Banking"), Link::new("Customer", "Mail")]
    );
    assert!(!result.truncated);
}

#[test]
fn test_multi_hop_bound_truncates() {
    let mut env = TestEnv::new();
    c4_model(&mut env);
    let graph = env.store.graph().unwrap();

    // Customer -> Web App -> API -> Banking takes three hops
    let result = multi_hop(&graph, "Person", "Software System", 2);
    assert!(result.links.is_empty());
    assert!(result.truncated);
}

#[test]
fn test_csv_export_written_to_file() {
    let mut env = TestEnv::new();
    c4_model(&mut env);
    let graph = env.store.graph().unwrap();
    let path = env.root().join("links.csv");
    let request = ExportRequest::new(ExportFormat::Csv, &path).categories("Person", "Software System");

    let bytes = export::export(&graph, &request, DEFAULT_MAX_HOPS).unwrap();

    let content = fs::read_to_string(&path).unwrap();
    assert_eq!(bytes, content.len());
    assert_eq!(content, "Person,Software System\nCustomer,Banking\nCustomer,Mail\n");
}

#[test]
fn test_tsv_and_text_exports() {
    let mut env = TestEnv::new();
    c4_model(&mut env);
    let graph = env.store.graph().unwrap();

    let tsv = export::render(
        &graph,
        &ExportRequest::new(ExportFormat::Tsv, "x.tsv").categories("Person", "Software System"),
        15,
    )
    .unwrap();
    assert_eq!(tsv, "Person\tSoftware System\nCustomer\tBanking\nCustomer\tMail\n");

    let text = export::render(
        &graph,
        &ExportRequest::new(ExportFormat::Txt, "x.txt").categories("Person", "Software System"),
        15,
    )
    .unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[1].starts_with("--------"));
    assert!(lines[2].starts_with("Customer"));
}

#[test]
fn test_table_export_requires_categories() {
    let mut env = TestEnv::new();
    c4_model(&mut env);
    let graph = env.store.graph().unwrap();
    let path = env.root().join("links.csv");

    let result = export::export(&graph, &ExportRequest::new(ExportFormat::Csv, &path), 15);

    assert!(result.is_err());
    assert!(!path.exists());
}

#[test]
fn test_export_to_missing_directory_fails() {
    let mut env = TestEnv::new();
    c4_model(&mut env);
    let graph = env.store.graph().unwrap();
    let path = env.root().join("no/such/dir/export.json");

    let result = export::export(&graph, &ExportRequest::new(ExportFormat::Json, &path), 15);
    assert!(result.is_err());
}

#[test]
fn test_default_export_paths() {
    assert_eq!(ExportFormat::Json.default_path().to_str(), Some("export.json"));
    assert_eq!(ExportFormat::Csv.default_path().to_str(), Some("export.csv"));
    assert_eq!("text".parse::<ExportFormat>().unwrap(), ExportFormat::Txt);
    assert!("xlsx".parse::<ExportFormat>().is_err());
}
