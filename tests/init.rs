use std::process::Command;

#[test]
fn init_creates_valid_toml() {
    let dir = tempfile::tempdir().unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_srb"))
        .arg("init")
        .current_dir(dir.path())
        .output()
        .unwrap();

    assert!(output.status.success(), "srb init failed: {}", String::from_utf8_lossy(&output.stderr));

    let config_path = dir.path().join(".srb.toml");
    assert!(config_path.exists(), ".srb.toml should exist");

    let content = std::fs::read_to_string(&config_path).unwrap();
    assert!(content.contains("[analysis]"));
    assert!(content.contains("[output]"));

    // Everything is commented out, so parsing yields the defaults
    let config: srb_core::SrbConfig = toml::from_str(&content).unwrap();
    assert_eq!(config.analysis.min_revisions, 5);
    assert!(config.output.graphviz);
}

#[test]
fn init_refuses_if_exists() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(".srb.toml"), "# existing").unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_srb"))
        .arg("init")
        .current_dir(dir.path())
        .output()
        .unwrap();

    assert!(!output.status.success());
    let content = std::fs::read_to_string(dir.path().join(".srb.toml")).unwrap();
    assert_eq!(content, "# existing");
}
