//! Integration test: replay a small recorded history through the public API.

use srb_history::analyze;
use srb_model::history::parse_history;
use srb_model::EntityModel;

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

#[test]
fn removed_type_leaves_no_trace() {
    let history = parse_history(HISTORY).unwrap();
    let replay = analyze(&history, 50).unwrap();
    let tallies = &replay.tallies;

    assert!(!tallies.changes.contains("Main.java:Main:getName()"));
    assert!(!tallies.joint_changes.mentions("Main.java:Main:getName()"));
    assert!(tallies.changes.container("Main.java:Main").is_none());
    assert!(replay.model.entity("Main.java:Main").is_none());

    assert!(tallies.changes.count("Main.java", "Main.java:setVersion(String)") >= 2);
    assert_eq!(tallies.changes.count("Main.java", "Main.java:getVersion(String)"), 2);
    assert_eq!(
        tallies.joint_changes.count(
            "Main.java",
            "Main.java:getVersion(String)",
            "Main.java:setVersion(String)"
        ),
        1
    );
    assert!(replay
        .model
        .get("Main.java:setVersion(String)")
        .unwrap()
        .modifiers
        .contains("private"));
}

#[test]
fn replaying_twice_gives_identical_tallies() {
    let history = parse_history(HISTORY).unwrap();
    let first = analyze(&history, 50).unwrap();
    let second = analyze(&history, 50).unwrap();
    assert_eq!(first.tallies, second.tallies);
    assert_eq!(first.stats.revisions, 3);
    assert_eq!(first.stats.edits, 6);
    assert_eq!(first.stats.purged, 1);
}
