//! Entity tree and the [`EntityModel`] adapter interface.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use srb_core::{SrbError, ENTITY_SEPARATOR};
use tracing::trace;

use crate::edit::{ModifierEdit, ProjectEdit};

/// Kind of a source entity.
///
/// # Examples
///
/// ```
/// use srb_model::EntityKind;
///
/// let kind: EntityKind = serde_json::from_str("\"function\"").unwrap();
/// assert_eq!(kind, EntityKind::Function);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// A source file; the root of every id.
    File,
    /// A class, interface, enum or similar type declaration.
    Type,
    /// A function or method.
    Function,
    /// A field, parameter or local variable.
    Variable,
}

/// A subtree of entities, as carried by an [`ProjectEdit::AddNode`] edit.
///
/// # Examples
///
/// ```
/// use srb_model::{EntityKind, SourceNode};
///
/// let file = SourceNode::new(EntityKind::File, "Main.java").with_child(
///     SourceNode::new(EntityKind::Function, "Main.java:main()")
///         .with_child(SourceNode::new(EntityKind::Variable, "Main.java:main():args")),
/// );
/// let ids: Vec<&str> = file.walk().iter().map(|n| n.id.as_str()).collect();
/// assert_eq!(ids, ["Main.java", "Main.java:main()", "Main.java:main():args"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceNode {
    /// Kind of the entity.
    pub kind: EntityKind,
    /// Fully qualified id (`path:Type:function():variable`).
    pub id: String,
    /// Declared modifiers (`public`, `static`, `interface`, ...).
    #[serde(default)]
    pub modifiers: BTreeSet<String>,
    /// Directly nested entities.
    #[serde(default)]
    pub children: Vec<SourceNode>,
}

impl SourceNode {
    /// Create a leaf node without modifiers.
    pub fn new(kind: EntityKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
            modifiers: BTreeSet::new(),
            children: Vec::new(),
        }
    }

    /// Append a nested node.
    pub fn with_child(mut self, child: SourceNode) -> Self {
        self.children.push(child);
        self
    }

    /// Add modifiers to this node.
    pub fn with_modifiers<I, S>(mut self, modifiers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.modifiers.extend(modifiers.into_iter().map(Into::into));
        self
    }

    /// Every node of the subtree in pre-order, starting with `self`.
    pub fn walk(&self) -> Vec<&SourceNode> {
        let mut nodes = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            nodes.push(node);
            stack.extend(node.children.iter().rev());
        }
        nodes
    }
}

/// An entity currently present in the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    /// Fully qualified id.
    pub id: String,
    /// Kind of the entity.
    pub kind: EntityKind,
    /// Declared modifiers.
    pub modifiers: BTreeSet<String>,
    /// Id of the enclosing entity; `None` for files.
    pub parent: Option<String>,
    /// Ids of directly nested entities, in declaration order.
    pub children: Vec<String>,
}

/// The source file an id belongs to (its first segment).
///
/// # Examples
///
/// ```
/// use srb_model::model::source_path;
///
/// assert_eq!(source_path("src/Main.java:Main:getName()"), "src/Main.java");
/// assert_eq!(source_path("src/Main.java"), "src/Main.java");
/// ```
pub fn source_path(id: &str) -> &str {
    id.split_once(ENTITY_SEPARATOR).map_or(id, |(path, _)| path)
}

/// The id of the entity enclosing `id`, derived from the id itself.
///
/// # Examples
///
/// ```
/// use srb_model::model::parent_of;
///
/// assert_eq!(parent_of("Main.java:Main:getName()"), Some("Main.java:Main"));
/// assert_eq!(parent_of("Main.java"), None);
/// ```
pub fn parent_of(id: &str) -> Option<&str> {
    id.rsplit_once(ENTITY_SEPARATOR).map(|(parent, _)| parent)
}

/// Read access to the evolving entity tree plus edit application.
///
/// Implementations must guarantee referential integrity: every id handed out
/// resolves, every non-file entity has a resolvable parent.
pub trait EntityModel {
    /// Look up an entity by id.
    fn entity(&self, id: &str) -> Option<&Entity>;

    /// Apply one structural edit.
    ///
    /// # Errors
    ///
    /// Returns [`SrbError::Model`] if the edit contradicts the current state.
    fn apply(&mut self, edit: &ProjectEdit) -> Result<(), SrbError>;

    /// Look up an entity that must exist.
    ///
    /// # Errors
    ///
    /// Returns [`SrbError::Model`] if `id` is unknown.
    fn get(&self, id: &str) -> Result<&Entity, SrbError> {
        self.entity(id)
            .ok_or_else(|| SrbError::Model(format!("unknown entity '{id}'")))
    }

    /// The entity directly enclosing `id`.
    ///
    /// # Errors
    ///
    /// Returns [`SrbError::Model`] if `id` is unknown or is a file.
    fn parent(&self, id: &str) -> Result<&Entity, SrbError> {
        let parent_id = self
            .get(id)?
            .parent
            .as_deref()
            .ok_or_else(|| SrbError::Model(format!("'{id}' has no parent")))?;
        self.get(parent_id)
    }

    /// Every entity of the subtree rooted at `id`, in pre-order.
    ///
    /// # Errors
    ///
    /// Returns [`SrbError::Model`] if `id` or one of its children is unknown.
    fn subtree(&self, id: &str) -> Result<Vec<&Entity>, SrbError> {
        let mut entities = Vec::new();
        let mut stack = vec![self.get(id)?];
        while let Some(entity) = stack.pop() {
            for child in entity.children.iter().rev() {
                stack.push(self.get(child)?);
            }
            entities.push(entity);
        }
        Ok(entities)
    }
}

/// In-memory [`EntityModel`] backed by a flat id index.
///
/// # Examples
///
/// ```
/// use srb_model::{EntityKind, EntityModel, Project, ProjectEdit, SourceNode};
///
/// let mut project = Project::empty();
/// let file = SourceNode::new(EntityKind::File, "Main.java")
///     .with_child(SourceNode::new(EntityKind::Function, "Main.java:run()"));
/// project.apply(&ProjectEdit::AddNode { node: file }).unwrap();
///
/// assert_eq!(project.parent("Main.java:run()").unwrap().id, "Main.java");
/// assert_eq!(project.sources().collect::<Vec<_>>(), ["Main.java"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Project {
    entities: HashMap<String, Entity>,
    sources: BTreeSet<String>,
}

impl Project {
    /// A project without any source file.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Paths of all source files, in ascending order.
    pub fn sources(&self) -> impl Iterator<Item = &str> {
        self.sources.iter().map(String::as_str)
    }

    /// Number of entities currently in the model.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether the model holds no entity at all.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    fn add(&mut self, node: &SourceNode) -> Result<(), SrbError> {
        let parent = match node.kind {
            EntityKind::File => {
                if parent_of(&node.id).is_some() {
                    return Err(SrbError::Model(format!(
                        "file id '{}' must not contain '{ENTITY_SEPARATOR}'",
                        node.id
                    )));
                }
                None
            }
            _ => {
                let parent_id = parent_of(&node.id).ok_or_else(|| {
                    SrbError::Model(format!("'{}' is not nested in a file", node.id))
                })?;
                let parent = self.get(parent_id)?;
                if parent.kind == EntityKind::Variable {
                    return Err(SrbError::Model(format!(
                        "'{}' cannot be nested in variable '{parent_id}'",
                        node.id
                    )));
                }
                Some(parent_id.to_string())
            }
        };

        self.insert_subtree(node, parent.clone())?;
        match parent {
            Some(parent_id) => {
                if let Some(entity) = self.entities.get_mut(&parent_id) {
                    entity.children.push(node.id.clone());
                }
            }
            None => {
                self.sources.insert(node.id.clone());
            }
        }
        Ok(())
    }

    fn insert_subtree(&mut self, node: &SourceNode, parent: Option<String>) -> Result<(), SrbError> {
        if self.entities.contains_key(&node.id) {
            return Err(SrbError::Model(format!("entity '{}' already exists", node.id)));
        }
        for child in &node.children {
            if parent_of(&child.id) != Some(node.id.as_str()) {
                return Err(SrbError::Model(format!(
                    "'{}' is not a direct child of '{}'",
                    child.id, node.id
                )));
            }
            if child.kind == EntityKind::File {
                return Err(SrbError::Model(format!(
                    "file '{}' cannot be nested in '{}'",
                    child.id, node.id
                )));
            }
        }

        self.entities.insert(
            node.id.clone(),
            Entity {
                id: node.id.clone(),
                kind: node.kind,
                modifiers: node.modifiers.clone(),
                parent,
                children: node.children.iter().map(|c| c.id.clone()).collect(),
            },
        );
        for child in &node.children {
            self.insert_subtree(child, Some(node.id.clone()))?;
        }
        Ok(())
    }

    fn remove(&mut self, id: &str) -> Result<(), SrbError> {
        let removed: Vec<String> = self.subtree(id)?.iter().map(|e| e.id.clone()).collect();
        let parent = self.get(id)?.parent.clone();

        for removed_id in &removed {
            self.entities.remove(removed_id);
        }
        match parent {
            Some(parent_id) => {
                if let Some(entity) = self.entities.get_mut(&parent_id) {
                    entity.children.retain(|child| child != id);
                }
            }
            None => {
                self.sources.remove(id);
            }
        }
        Ok(())
    }

    fn edit(&mut self, id: &str, kind: EntityKind, modifiers: &ModifierEdit) -> Result<(), SrbError> {
        let entity = self
            .entities
            .get_mut(id)
            .ok_or_else(|| SrbError::Model(format!("unknown entity '{id}'")))?;
        if entity.kind != kind {
            return Err(SrbError::Model(format!(
                "'{id}' is a {:?}, expected a {kind:?}",
                entity.kind
            )));
        }
        for modifier in &modifiers.remove {
            entity.modifiers.remove(modifier);
        }
        entity.modifiers.extend(modifiers.add.iter().cloned());
        Ok(())
    }
}

impl EntityModel for Project {
    fn entity(&self, id: &str) -> Option<&Entity> {
        self.entities.get(id)
    }

    fn apply(&mut self, edit: &ProjectEdit) -> Result<(), SrbError> {
        trace!(id = edit.id(), "applying edit");
        match edit {
            ProjectEdit::AddNode { node } => self.add(node),
            ProjectEdit::RemoveNode { id } => self.remove(id),
            ProjectEdit::EditFunction { id, modifiers } => {
                self.edit(id, EntityKind::Function, modifiers)
            }
            ProjectEdit::EditVariable { id, modifiers } => {
                self.edit(id, EntityKind::Variable, modifiers)
            }
        }
    }
}
