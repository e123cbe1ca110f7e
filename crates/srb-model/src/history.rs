//! Recorded history loading.
//!
//! A history file is a JSON array of [`Revision`]s in chronological order
//! (oldest first), each carrying the structural edits it applied.

use std::collections::HashSet;
use std::path::Path;

use srb_core::SrbError;
use tracing::info;

use crate::edit::Revision;

/// Load a recorded history from `path`.
///
/// # Errors
///
/// Returns [`SrbError::FileNotFound`] if `path` does not exist,
/// [`SrbError::Io`] if it cannot be read, and [`SrbError::History`] if the
/// content is not a valid history.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use srb_model::history::load_history;
///
/// let revisions = load_history(Path::new(".srb/history.json")).unwrap();
/// println!("{} revisions", revisions.len());
/// ```
pub fn load_history(path: &Path) -> Result<Vec<Revision>, SrbError> {
    if !path.exists() {
        return Err(SrbError::FileNotFound(path.to_path_buf()));
    }
    let content = std::fs::read_to_string(path)?;
    let revisions = parse_history(&content)
        .map_err(|e| SrbError::History(format!("{}: {e}", path.display())))?;
    info!(
        path = %path.display(),
        revisions = revisions.len(),
        "loaded history"
    );
    Ok(revisions)
}

/// Parse a history from its JSON text.
///
/// # Errors
///
/// Returns [`SrbError::History`] if the JSON is malformed or two revisions
/// share an id.
///
/// # Examples
///
/// ```
/// use srb_model::history::parse_history;
///
/// let json = r#"[
///     {"id": "0", "edits": [{"type": "addNode", "node": {"kind": "file", "id": "A.java"}}]},
///     {"id": "1", "edits": [{"type": "removeNode", "id": "A.java"}]}
/// ]"#;
/// let revisions = parse_history(json).unwrap();
/// assert_eq!(revisions.len(), 2);
/// ```
pub fn parse_history(content: &str) -> Result<Vec<Revision>, SrbError> {
    let revisions: Vec<Revision> = serde_json::from_str(content)
        .map_err(|e| SrbError::History(format!("malformed history: {e}")))?;

    let mut seen = HashSet::new();
    for revision in &revisions {
        if !seen.insert(revision.id.as_str()) {
            return Err(SrbError::History(format!(
                "duplicate revision id '{}'",
                revision.id
            )));
        }
    }
    Ok(revisions)
}
