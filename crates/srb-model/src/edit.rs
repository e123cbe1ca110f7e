//! Structural edits and the revisions that group them.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::model::{source_path, SourceNode};

/// Modifiers added to and removed from an entity by an edit.
///
/// # Examples
///
/// ```
/// use srb_model::ModifierEdit;
///
/// let edit: ModifierEdit = serde_json::from_str(r#"{"add": ["private"]}"#).unwrap();
/// assert_eq!(edit.add, ["private"]);
/// assert!(edit.remove.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifierEdit {
    /// Modifiers gained.
    #[serde(default)]
    pub add: Vec<String>,
    /// Modifiers lost.
    #[serde(default)]
    pub remove: Vec<String>,
}

/// A single structural change to the project.
///
/// # Examples
///
/// ```
/// use srb_model::ProjectEdit;
///
/// let json = r#"{"type": "editFunction", "id": "Main.java:run()"}"#;
/// let edit: ProjectEdit = serde_json::from_str(json).unwrap();
/// assert_eq!(edit.id(), "Main.java:run()");
/// assert_eq!(edit.source_path(), "Main.java");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ProjectEdit {
    /// A new entity together with everything nested in it.
    AddNode {
        /// Root of the added subtree.
        node: SourceNode,
    },
    /// An existing entity and everything nested in it disappears.
    RemoveNode {
        /// Id of the removed entity.
        id: String,
    },
    /// The signature, modifiers or body of a function changed.
    EditFunction {
        /// Id of the edited function.
        id: String,
        /// Modifier changes, if any.
        #[serde(default)]
        modifiers: ModifierEdit,
    },
    /// The declaration of a variable changed.
    EditVariable {
        /// Id of the edited variable.
        id: String,
        /// Modifier changes, if any.
        #[serde(default)]
        modifiers: ModifierEdit,
    },
}

impl ProjectEdit {
    /// Id of the entity the edit targets.
    pub fn id(&self) -> &str {
        match self {
            ProjectEdit::AddNode { node } => &node.id,
            ProjectEdit::RemoveNode { id }
            | ProjectEdit::EditFunction { id, .. }
            | ProjectEdit::EditVariable { id, .. } => id,
        }
    }

    /// The source file the edited entity lives in.
    pub fn source_path(&self) -> &str {
        source_path(self.id())
    }
}

/// One recorded revision: an ordered list of edits applied atomically.
///
/// # Examples
///
/// ```
/// use srb_model::{ProjectEdit, Revision};
///
/// let revision = Revision {
///     id: "r1".into(),
///     author: None,
///     date: None,
///     edits: vec![
///         ProjectEdit::RemoveNode { id: "A.java:a()".into() },
///         ProjectEdit::RemoveNode { id: "A.java:b()".into() },
///         ProjectEdit::RemoveNode { id: "B.java".into() },
///     ],
/// };
/// assert_eq!(revision.change_set_size(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Revision {
    /// Revision identifier (commit hash, sequence number, ...).
    pub id: String,
    /// Author of the revision.
    #[serde(default)]
    pub author: Option<String>,
    /// Date of the revision, as recorded.
    #[serde(default)]
    pub date: Option<String>,
    /// Edits in application order.
    #[serde(default)]
    pub edits: Vec<ProjectEdit>,
}

impl Revision {
    /// Distinct source files touched by this revision, in ascending order.
    pub fn changed_files(&self) -> BTreeSet<&str> {
        self.edits.iter().map(ProjectEdit::source_path).collect()
    }

    /// Number of distinct source files touched by this revision.
    pub fn change_set_size(&self) -> usize {
        self.changed_files().len()
    }
}
