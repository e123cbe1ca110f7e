//! Structural model of a project evolving through its revision history.
//!
//! Holds the entity tree (files, types, functions, variables) addressed by
//! hierarchical ids, applies structural edits one at a time, loads recorded
//! histories from JSON, and answers "is this entity public" through a
//! registry of per-language visibility providers.

pub mod edit;
pub mod history;
pub mod model;
pub mod visibility;

pub use edit::{ModifierEdit, ProjectEdit, Revision};
pub use model::{Entity, EntityKind, EntityModel, Project, SourceNode};
pub use visibility::{JavaVisibility, VisibilityAnalyzer, VisibilityRegistry};
