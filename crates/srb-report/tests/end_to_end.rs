//! Integration test: from a recorded history to the written report.

use srb_core::AnalysisConfig;
use srb_model::history::parse_history;
use srb_report::{write_output, Analyzer, Report};

const HISTORY: &str = r#"[
  {"id": "0", "edits": [
    {"type": "addNode", "node": {"kind": "file", "id": "Main.java", "children": [
      {"kind": "function", "id": "Main.java:getVersion(String)", "children": [
        {"kind": "variable", "id": "Main.java:getVersion(String):name"}
      ]}
    ]}}
  ]},
  {"id": "1", "edits": [
    {"type": "addNode", "node": {"kind": "function", "id": "Main.java:setVersion(String)", "children": [
      {"kind": "variable", "id": "Main.java:setVersion(String):name"}
    ]}},
    {"type": "addNode", "node": {"kind": "type", "id": "Main.java:Main", "children": [
      {"kind": "function", "id": "Main.java:Main:getName()"}
    ]}}
  ]},
  {"id": "2", "edits": [
    {"type": "editFunction", "id": "Main.java:setVersion(String)", "modifiers": {"add": ["private"]}},
    {"type": "editVariable", "id": "Main.java:getVersion(String):name", "modifiers": {"add": ["public"]}},
    {"type": "removeNode", "id": "Main.java:Main"}
  ]}
]"#;

fn analyzer() -> Analyzer {
    let config = AnalysisConfig {
        min_revisions: 1,
        min_coupling: 0.0,
        ..AnalysisConfig::default()
    };
    Analyzer::new(config.to_options().unwrap())
}

#[test]
fn removed_function_never_reaches_the_graph() {
    let history = parse_history(HISTORY).unwrap();
    let report = analyzer().analyze(&history).unwrap();

    assert_eq!(report.colored_graphs.len(), 1);
    let graph = &report.colored_graphs[0];
    assert_eq!(graph.label, "Main.java");
    assert!(graph.node("getVersion(String)").is_some());
    assert!(graph.node("setVersion(String)").is_some());
    assert!(graph.node("Main:getName()").is_none());
    assert!(graph
        .edges
        .iter()
        .all(|e| !e.source.contains("getName") && !e.target.contains("getName")));

    // getVersion: 2 changes, setVersion: 2 changes, together once
    assert_eq!(graph.edges.len(), 1);
    assert_eq!(graph.edges[0].revisions, 3);
}

#[test]
fn container_without_edges_is_worth_nothing() {
    let history = parse_history(HISTORY).unwrap();
    let config = AnalysisConfig {
        min_revisions: 10,
        ..AnalysisConfig::default()
    };
    let report = Analyzer::new(config.to_options().unwrap())
        .analyze(&history)
        .unwrap();

    let file = &report.files[0];
    assert_eq!(file.file, "Main.java");
    assert!(file.blobs.is_empty());
    assert!(file.anti_blob.is_none());
    assert_eq!(file.value, 0);
    assert!(report.colored_graphs[0].is_empty());
}

#[test]
fn written_report_reads_back() {
    let history = parse_history(HISTORY).unwrap();
    let report = analyzer().analyze(&history).unwrap();

    let dir = tempfile::tempdir().unwrap();
    write_output(&report, dir.path(), true).unwrap();

    let json = std::fs::read_to_string(dir.path().join("report.json")).unwrap();
    let parsed: Report = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, report);
    assert!(dir.path().join("graphs/Main.java.json").exists());
    assert!(dir.path().join("graphs/Main.java.dot").exists());
}

#[test]
fn same_history_same_report() {
    let history = parse_history(HISTORY).unwrap();
    let analyzer = analyzer();
    assert_eq!(
        analyzer.analyze(&history).unwrap(),
        analyzer.analyze(&history).unwrap()
    );
}
