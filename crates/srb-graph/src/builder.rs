//! Graph construction from replay tallies.

use std::collections::BTreeMap;

use srb_core::ENTITY_SEPARATOR;
use srb_history::Tallies;

use crate::graph::{Edge, Graph, Node};

/// Build the coupling graph of `container`.
///
/// For every pair counted in the container with joint count `j` and change
/// counts `c1`, `c2`, the edge carries `revisions = c1 + c2 - j` and
/// `coupling = j / revisions`. Edges below `min_revisions` or `min_coupling`,
/// or with an endpoint rejected by `keep`, are dropped. Nodes are the
/// endpoints of the retained edges. Labels are made relative to the container.
///
/// # Examples
///
/// ```
/// use srb_graph::build_graph;
/// use srb_history::analyze;
/// use srb_model::history::parse_history;
///
/// let history = parse_history(r#"[
///   {"id": "0", "edits": [{"type": "addNode", "node": {"kind": "file", "id": "A.java", "children": [
///       {"kind": "function", "id": "A.java:a()"},
///       {"kind": "function", "id": "A.java:b()"}
///   ]}}]},
///   {"id": "1", "edits": [{"type": "editFunction", "id": "A.java:a()"}]}
/// ]"#).unwrap();
/// let replay = analyze(&history, 50).unwrap();
///
/// let graph = build_graph("A.java", &replay.tallies, 0.0, 1, |_| true);
/// assert_eq!(graph.edges.len(), 1);
/// assert_eq!(graph.edges[0].revisions, 2);
/// assert_eq!(graph.edges[0].coupling, 0.5);
/// assert_eq!(graph.nodes[0].label, "a()");
/// ```
pub fn build_graph<F>(
    container: &str,
    tallies: &Tallies,
    min_coupling: f64,
    min_revisions: u32,
    keep: F,
) -> Graph
where
    F: Fn(&str) -> bool,
{
    let Some(pairs) = tallies.joint_changes.container(container) else {
        return Graph::empty(container);
    };

    let prefix = format!("{container}{ENTITY_SEPARATOR}");
    let relative = |id: &str| id.strip_prefix(prefix.as_str()).unwrap_or(id).to_string();

    let mut nodes: BTreeMap<String, u32> = BTreeMap::new();
    let mut edges = Vec::new();
    for ((source, target), &joint) in pairs {
        let source_changes = tallies.changes.count(container, source);
        let target_changes = tallies.changes.count(container, target);
        let revisions = (source_changes + target_changes).saturating_sub(joint);
        if revisions == 0 || revisions < min_revisions {
            continue;
        }
        let coupling = f64::from(joint) / f64::from(revisions);
        if coupling < min_coupling {
            continue;
        }
        if !keep(source) || !keep(target) {
            continue;
        }

        let (source, target) = (relative(source), relative(target));
        nodes.insert(source.clone(), source_changes);
        nodes.insert(target.clone(), target_changes);
        edges.push(Edge {
            source,
            target,
            revisions,
            coupling,
        });
    }

    edges.sort_by(|a, b| (&a.source, &a.target).cmp(&(&b.source, &b.target)));

    Graph {
        label: container.to_string(),
        nodes: nodes
            .into_iter()
            .map(|(label, revisions)| Node::new(label, revisions))
            .collect(),
        edges,
    }
}
