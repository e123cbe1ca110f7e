//! Rendering and writing reports.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use srb_core::{OutputFormat, SrbError};
use srb_graph::to_dot;
use tracing::info;

use crate::report::Report;

/// Render `report` in `format`.
///
/// # Errors
///
/// Returns [`SrbError::Serialization`] if JSON encoding fails.
///
/// # Examples
///
/// ```
/// use srb_core::OutputFormat;
/// use srb_report::output::render;
/// use srb_report::Report;
///
/// let json = render(&Report::default(), OutputFormat::Json).unwrap();
/// assert!(json.contains("\"files\": []"));
/// ```
pub fn render(report: &Report, format: OutputFormat) -> Result<String, SrbError> {
    Ok(match format {
        OutputFormat::Text => report.to_string(),
        OutputFormat::Markdown => report.to_markdown(),
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(report)?;
            json.push('\n');
            json
        }
    })
}

/// Write `report` into `directory`.
///
/// Produces `report.json`, plus `graphs/<container>.json` for every colored
/// graph and, with `graphviz`, `graphs/<container>.dot`. Container ids are
/// turned into file names by replacing path and id separators. Returns the
/// paths written.
///
/// # Errors
///
/// Returns [`SrbError::Io`] if a directory or file cannot be written.
pub fn write_output(
    report: &Report,
    directory: &Path,
    graphviz: bool,
) -> Result<Vec<PathBuf>, SrbError> {
    let graphs = directory.join("graphs");
    fs::create_dir_all(&graphs)?;

    let mut written = Vec::new();
    let report_path = directory.join("report.json");
    fs::write(&report_path, serde_json::to_string_pretty(report)?)?;
    written.push(report_path);

    let mut used = HashSet::new();
    for graph in &report.colored_graphs {
        let mut stem = file_stem(&graph.label);
        let mut suffix = 1;
        while !used.insert(stem.clone()) {
            suffix += 1;
            stem = format!("{}-{suffix}", file_stem(&graph.label));
        }

        let json_path = graphs.join(format!("{stem}.json"));
        fs::write(&json_path, serde_json::to_string_pretty(graph)?)?;
        written.push(json_path);

        if graphviz {
            let dot_path = graphs.join(format!("{stem}.dot"));
            fs::write(&dot_path, to_dot(graph))?;
            written.push(dot_path);
        }
    }

    info!(
        directory = %directory.display(),
        files = written.len(),
        "wrote report"
    );
    Ok(written)
}

fn file_stem(container: &str) -> String {
    container
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '<' | '>' | '"' | '|' | '?' | '*' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}
