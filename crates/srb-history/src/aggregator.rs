//! Revision replay.
//!
//! Every revision is applied to the entity model edit by edit. The functions
//! an edit touches are collected, grouped by their container (nearest
//! enclosing type, or the file), and counted. Functions removed by the
//! revision are purged from all tallies before grouping.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::Serialize;
use srb_core::SrbError;
use srb_model::{EntityKind, EntityModel, Project, ProjectEdit, Revision};
use tracing::{debug, info};

use crate::tally::Tallies;

/// Counters describing a finished replay.
///
/// # Examples
///
/// ```
/// use srb_history::ReplayStats;
///
/// let stats = ReplayStats::default();
/// assert_eq!(stats.revisions, 0);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayStats {
    /// Revisions replayed.
    pub revisions: usize,
    /// Edits applied.
    pub edits: usize,
    /// Revisions too large to contribute joint changes.
    pub oversized: usize,
    /// Functions purged because they were removed.
    pub purged: usize,
}

/// Result of replaying a whole history.
#[derive(Debug, Clone)]
pub struct Replay<M = Project> {
    /// The entity model after the last revision.
    pub model: M,
    /// Change and joint change counts.
    pub tallies: Tallies,
    /// Replay counters.
    pub stats: ReplayStats,
}

/// Replays revisions and maintains the change tallies.
///
/// # Examples
///
/// ```
/// use srb_history::ChangeAggregator;
/// use srb_model::history::parse_history;
///
/// let history = parse_history(r#"[
///   {"id": "0", "edits": [{"type": "addNode", "node": {"kind": "file", "id": "A.java", "children": [
///       {"kind": "function", "id": "A.java:a()"},
///       {"kind": "function", "id": "A.java:b()"}
///   ]}}]},
///   {"id": "1", "edits": [{"type": "editFunction", "id": "A.java:a()"}]}
/// ]"#).unwrap();
///
/// let mut aggregator = ChangeAggregator::new(50).unwrap();
/// for revision in &history {
///     aggregator.visit(revision).unwrap();
/// }
/// let replay = aggregator.finish();
/// assert_eq!(replay.tallies.changes.count("A.java", "A.java:a()"), 2);
/// assert_eq!(replay.tallies.joint_changes.count("A.java", "A.java:a()", "A.java:b()"), 1);
/// ```
#[derive(Debug)]
pub struct ChangeAggregator<M = Project> {
    model: M,
    max_change_set: usize,
    tallies: Tallies,
    stats: ReplayStats,
}

impl ChangeAggregator<Project> {
    /// An aggregator starting from an empty project.
    ///
    /// # Errors
    ///
    /// Returns [`SrbError::Config`] if `max_change_set` is zero.
    pub fn new(max_change_set: usize) -> Result<Self, SrbError> {
        Self::with_model(Project::empty(), max_change_set)
    }
}

impl<M: EntityModel> ChangeAggregator<M> {
    /// An aggregator replaying on top of an existing model.
    ///
    /// # Errors
    ///
    /// Returns [`SrbError::Config`] if `max_change_set` is zero.
    pub fn with_model(model: M, max_change_set: usize) -> Result<Self, SrbError> {
        if max_change_set == 0 {
            return Err(SrbError::Config(format!(
                "invalid max change set '{max_change_set}'"
            )));
        }
        Ok(Self {
            model,
            max_change_set,
            tallies: Tallies::default(),
            stats: ReplayStats::default(),
        })
    }

    /// The entity model in its current state.
    pub fn model(&self) -> &M {
        &self.model
    }

    /// The tallies accumulated so far.
    pub fn tallies(&self) -> &Tallies {
        &self.tallies
    }

    /// Counters accumulated so far.
    pub fn stats(&self) -> ReplayStats {
        self.stats
    }

    /// Replay one revision.
    ///
    /// # Errors
    ///
    /// Returns [`SrbError::Model`] if an edit references an entity the model
    /// does not know. The aggregator must not be used after an error.
    pub fn visit(&mut self, revision: &Revision) -> Result<(), SrbError> {
        let touched = self.apply_edits(revision)?;

        let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for id in touched {
            let container = self.container_of(&id)?;
            groups.entry(container).or_default().push(id);
        }

        let change_set = revision.change_set_size();
        let oversized = change_set > self.max_change_set;
        if oversized {
            self.stats.oversized += 1;
            debug!(
                revision = %revision.id,
                change_set,
                max_change_set = self.max_change_set,
                "revision too large, skipping joint changes"
            );
        }

        for (container, ids) in &groups {
            for id in ids {
                self.tallies.changes.increment(container, id);
            }
            if !oversized {
                self.tallies.joint_changes.increment_pairs(container, ids);
            }
        }

        self.stats.revisions += 1;
        self.stats.edits += revision.edits.len();
        debug!(
            revision = %revision.id,
            touched = groups.values().map(Vec::len).sum::<usize>(),
            containers = groups.len(),
            "replayed revision"
        );
        Ok(())
    }

    /// Stop replaying and hand out the model and tallies.
    pub fn finish(self) -> Replay<M> {
        info!(
            revisions = self.stats.revisions,
            edits = self.stats.edits,
            oversized = self.stats.oversized,
            purged = self.stats.purged,
            containers = self.tallies.containers().len(),
            "history replay finished"
        );
        Replay {
            model: self.model,
            tallies: self.tallies,
            stats: self.stats,
        }
    }

    /// Apply every edit of `revision`, returning the functions left touched.
    fn apply_edits(&mut self, revision: &Revision) -> Result<BTreeSet<String>, SrbError> {
        let mut touched = BTreeSet::new();
        for edit in &revision.edits {
            match edit {
                ProjectEdit::AddNode { node } => {
                    touched.extend(
                        node.walk()
                            .into_iter()
                            .filter(|n| n.kind == EntityKind::Function)
                            .map(|n| n.id.clone()),
                    );
                }
                ProjectEdit::RemoveNode { id } => {
                    for removed in self.purge(id)? {
                        touched.remove(&removed);
                    }
                }
                ProjectEdit::EditFunction { id, .. } => {
                    touched.insert(id.clone());
                }
                ProjectEdit::EditVariable { id, .. } => {
                    let parent = self.model.parent(id)?;
                    if parent.kind == EntityKind::Function {
                        touched.insert(parent.id.clone());
                    }
                }
            }
            self.model.apply(edit)?;
        }
        Ok(touched)
    }

    /// Forget everything counted for the subtree rooted at `id`.
    ///
    /// Returns the removed function ids.
    fn purge(&mut self, id: &str) -> Result<Vec<String>, SrbError> {
        let subtree = self.model.subtree(id)?;
        let removed: HashSet<String> = subtree.iter().map(|e| e.id.clone()).collect();
        let functions: Vec<String> = subtree
            .iter()
            .filter(|e| e.kind == EntityKind::Function)
            .map(|e| e.id.clone())
            .collect();

        let mut containers = BTreeSet::new();
        for function in &functions {
            containers.insert(self.container_of(function)?);
        }

        self.tallies.changes.purge(&containers, &removed);
        self.tallies.joint_changes.purge(&containers, &removed);
        self.stats.purged += functions.len();
        Ok(functions)
    }

    /// The nearest enclosing type of `id`, or its file.
    fn container_of(&self, id: &str) -> Result<String, SrbError> {
        let mut parent = self.model.parent(id)?;
        while !matches!(parent.kind, EntityKind::Type | EntityKind::File) {
            parent = self.model.parent(&parent.id)?;
        }
        Ok(parent.id.clone())
    }
}

/// Replay `revisions` from an empty project.
///
/// # Errors
///
/// Returns [`SrbError::Config`] if `max_change_set` is zero and
/// [`SrbError::Model`] on the first inconsistent edit.
pub fn analyze<'a, I>(revisions: I, max_change_set: usize) -> Result<Replay, SrbError>
where
    I: IntoIterator<Item = &'a Revision>,
{
    let mut aggregator = ChangeAggregator::new(max_change_set)?;
    for revision in revisions {
        aggregator.visit(revision)?;
    }
    Ok(aggregator.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use srb_model::{ModifierEdit, SourceNode};

    fn function(id: &str) -> SourceNode {
        SourceNode::new(EntityKind::Function, id)
    }

    fn revision(id: &str, edits: Vec<ProjectEdit>) -> Revision {
        Revision {
            id: id.into(),
            author: None,
            date: None,
            edits,
        }
    }

    fn edit_function(id: &str) -> ProjectEdit {
        ProjectEdit::EditFunction {
            id: id.into(),
            modifiers: ModifierEdit::default(),
        }
    }

    fn add(node: SourceNode) -> ProjectEdit {
        ProjectEdit::AddNode { node }
    }

    fn add_file(path: &str, functions: &[&str]) -> ProjectEdit {
        let mut file = SourceNode::new(EntityKind::File, path);
        for name in functions {
            file = file.with_child(function(&format!("{path}:{name}")));
        }
        add(file)
    }

    #[test]
    fn added_functions_change_together() {
        let replay = analyze(&[revision("0", vec![add_file("A.java", &["a()", "b()"])])], 50).unwrap();
        let tallies = &replay.tallies;
        assert_eq!(tallies.changes.count("A.java", "A.java:a()"), 1);
        assert_eq!(tallies.changes.count("A.java", "A.java:b()"), 1);
        assert_eq!(tallies.joint_changes.count("A.java", "A.java:a()", "A.java:b()"), 1);
    }

    #[test]
    fn functions_are_grouped_by_enclosing_type() {
        let file = SourceNode::new(EntityKind::File, "A.java")
            .with_child(function("A.java:top()"))
            .with_child(
                SourceNode::new(EntityKind::Type, "A.java:A")
                    .with_child(function("A.java:A:x()"))
                    .with_child(function("A.java:A:y()")),
            );
        let replay = analyze(&[revision("0", vec![add(file)])], 50).unwrap();
        let tallies = &replay.tallies;
        assert_eq!(tallies.containers(), ["A.java", "A.java:A"]);
        assert_eq!(tallies.joint_changes.count("A.java:A", "A.java:A:x()", "A.java:A:y()"), 1);
        assert_eq!(tallies.joint_changes.count("A.java", "A.java:top()", "A.java:A:x()"), 0);
    }

    #[test]
    fn variable_edit_touches_enclosing_function() {
        let file = SourceNode::new(EntityKind::File, "A.java")
            .with_child(function("A.java:a(int)").with_child(SourceNode::new(
                EntityKind::Variable,
                "A.java:a(int):x",
            )))
            .with_child(SourceNode::new(EntityKind::Variable, "A.java:field"));
        let history = [
            revision("0", vec![add(file)]),
            revision(
                "1",
                vec![
                    ProjectEdit::EditVariable {
                        id: "A.java:a(int):x".into(),
                        modifiers: ModifierEdit::default(),
                    },
                    ProjectEdit::EditVariable {
                        id: "A.java:field".into(),
                        modifiers: ModifierEdit::default(),
                    },
                ],
            ),
        ];
        let replay = analyze(&history, 50).unwrap();
        assert_eq!(replay.tallies.changes.count("A.java", "A.java:a(int)"), 2);
        assert!(!replay.tallies.changes.contains("A.java:field"));
    }

    #[test]
    fn repeated_touches_in_one_revision_count_once() {
        let history = [
            revision("0", vec![add_file("A.java", &["a()"])]),
            revision("1", vec![edit_function("A.java:a()"), edit_function("A.java:a()")]),
        ];
        let replay = analyze(&history, 50).unwrap();
        assert_eq!(replay.tallies.changes.count("A.java", "A.java:a()"), 2);
    }

    #[test]
    fn removal_purges_all_tallies() {
        let history = [
            revision("0", vec![add_file("A.java", &["a()", "b()", "c()"])]),
            revision("1", vec![edit_function("A.java:a()"), edit_function("A.java:b()")]),
            revision(
                "2",
                vec![
                    edit_function("A.java:b()"),
                    ProjectEdit::RemoveNode {
                        id: "A.java:b()".into(),
                    },
                    edit_function("A.java:c()"),
                ],
            ),
        ];
        let replay = analyze(&history, 50).unwrap();
        let tallies = &replay.tallies;
        assert!(!tallies.changes.contains("A.java:b()"));
        assert!(!tallies.joint_changes.mentions("A.java:b()"));
        assert_eq!(tallies.changes.count("A.java", "A.java:a()"), 2);
        assert_eq!(tallies.changes.count("A.java", "A.java:c()"), 2);
        assert_eq!(replay.stats.purged, 1);
    }

    #[test]
    fn removing_a_type_drops_its_container() {
        let file = SourceNode::new(EntityKind::File, "A.java").with_child(
            SourceNode::new(EntityKind::Type, "A.java:A")
                .with_child(function("A.java:A:x()"))
                .with_child(function("A.java:A:y()")),
        );
        let history = [
            revision("0", vec![add(file)]),
            revision(
                "1",
                vec![ProjectEdit::RemoveNode {
                    id: "A.java:A".into(),
                }],
            ),
        ];
        let replay = analyze(&history, 50).unwrap();
        assert!(replay.tallies.changes.is_empty());
        assert!(replay.tallies.joint_changes.is_empty());
    }

    #[test]
    fn readded_function_starts_from_zero() {
        let history = [
            revision("0", vec![add_file("A.java", &["a()", "b()"])]),
            revision(
                "1",
                vec![ProjectEdit::RemoveNode {
                    id: "A.java:a()".into(),
                }],
            ),
            revision("2", vec![add(function("A.java:a()"))]),
        ];
        let replay = analyze(&history, 50).unwrap();
        assert_eq!(replay.tallies.changes.count("A.java", "A.java:a()"), 1);
        assert_eq!(replay.tallies.joint_changes.count("A.java", "A.java:a()", "A.java:b()"), 0);
    }

    #[test]
    fn oversized_revisions_only_count_changes() {
        let history = [
            revision("0", vec![add_file("A.java", &["a()", "b()"])]),
            revision("1", vec![add_file("B.java", &["c()"])]),
            revision(
                "2",
                vec![
                    edit_function("A.java:a()"),
                    edit_function("A.java:b()"),
                    edit_function("B.java:c()"),
                ],
            ),
        ];
        let replay = analyze(&history, 1).unwrap();
        let tallies = &replay.tallies;
        assert_eq!(tallies.changes.count("A.java", "A.java:a()"), 2);
        assert_eq!(tallies.joint_changes.count("A.java", "A.java:a()", "A.java:b()"), 1);
        assert_eq!(replay.stats.oversized, 1);
    }

    #[test]
    fn unknown_ids_are_fatal() {
        let err = analyze(&[revision("0", vec![edit_function("Ghost.java:x()")])], 50).unwrap_err();
        assert!(matches!(err, SrbError::Model(_)));

        let err = analyze(
            &[revision(
                "0",
                vec![ProjectEdit::EditVariable {
                    id: "Ghost.java:x".into(),
                    modifiers: ModifierEdit::default(),
                }],
            )],
            50,
        )
        .unwrap_err();
        assert!(matches!(err, SrbError::Model(_)));
    }

    #[test]
    fn zero_change_set_is_rejected() {
        assert!(matches!(
            ChangeAggregator::new(0).unwrap_err(),
            SrbError::Config(_)
        ));
    }

    #[test]
    fn replay_is_deterministic() {
        let history = [
            revision("0", vec![add_file("A.java", &["a()", "b()", "c()"])]),
            revision("1", vec![edit_function("A.java:a()"), edit_function("A.java:c()")]),
            revision("2", vec![ProjectEdit::RemoveNode { id: "A.java:b()".into() }]),
        ];
        let first = analyze(&history, 50).unwrap();
        let second = analyze(&history, 50).unwrap();
        assert_eq!(first.tallies, second.tallies);
        assert_eq!(first.stats, second.stats);
    }
}
