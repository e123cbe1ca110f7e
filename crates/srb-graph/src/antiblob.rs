//! Anti-blob detection.

use std::collections::HashMap;

use crate::graph::{Graph, Subgraph};

/// Find the anti-blob of `graph`: every node whose total incident coupling is
/// at most `max_coupling`, provided there are at least `min_size` of them.
///
/// The reported density is the average total coupling of the members.
///
/// # Examples
///
/// ```
/// use srb_graph::{find_anti_blob, Edge, Graph, Node};
///
/// let edge = |s: &str, t: &str, coupling: f64| Edge { source: s.into(), target: t.into(), revisions: 10, coupling };
/// let graph = Graph {
///     label: "A.java".into(),
///     nodes: ["a", "b", "c"].iter().map(|l| Node::new(*l, 5)).collect(),
///     edges: vec![edge("a", "b", 0.125), edge("b", "c", 0.75)],
/// };
/// let anti_blob = find_anti_blob(&graph, 0.5, 1).unwrap();
/// assert_eq!(anti_blob.nodes.len(), 1);
/// assert!(anti_blob.contains("a"));
/// assert!(find_anti_blob(&graph, 0.5, 2).is_none());
/// ```
pub fn find_anti_blob(graph: &Graph, max_coupling: f64, min_size: usize) -> Option<Subgraph> {
    let mut total: HashMap<&str, f64> = HashMap::new();
    for edge in &graph.edges {
        *total.entry(edge.source.as_str()).or_default() += edge.coupling;
        *total.entry(edge.target.as_str()).or_default() += edge.coupling;
    }

    let members: Vec<(&str, f64)> = graph
        .nodes
        .iter()
        .map(|node| {
            let coupling = total.get(node.label.as_str()).copied().unwrap_or(0.0);
            (node.label.as_str(), coupling)
        })
        .filter(|(_, coupling)| *coupling <= max_coupling)
        .collect();

    if members.is_empty() || members.len() < min_size {
        return None;
    }
    let density = members.iter().map(|(_, c)| c).sum::<f64>() / members.len() as f64;
    Some(Subgraph::new(members.into_iter().map(|(label, _)| label), density))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Edge, Node};

    /// A star: `hub` coupled to every leaf with `coupling`.
    fn star(leaves: usize, coupling: f64) -> Graph {
        let mut labels: Vec<String> = (0..leaves).map(|i| format!("leaf{i:02}")).collect();
        labels.push("hub".into());
        Graph {
            label: "F.java".into(),
            nodes: labels.iter().map(|l| Node::new(l.as_str(), 3)).collect(),
            edges: (0..leaves)
                .map(|i| Edge {
                    source: format!("leaf{i:02}"),
                    target: "hub".into(),
                    revisions: 20,
                    coupling,
                })
                .collect(),
        }
    }

    #[test]
    fn loosely_coupled_leaves_form_the_anti_blob() {
        let graph = star(12, 0.125);
        let anti_blob = find_anti_blob(&graph, 0.5, 10).unwrap();
        assert_eq!(anti_blob.len(), 12);
        assert!(!anti_blob.contains("hub"));
        assert_eq!(anti_blob.density, 0.125);
    }

    #[test]
    fn every_member_respects_the_ceiling() {
        let graph = star(12, 0.25);
        let anti_blob = find_anti_blob(&graph, 0.25, 10).unwrap();
        for member in &anti_blob.nodes {
            let total: f64 = graph
                .edges
                .iter()
                .filter(|e| e.other(member).is_some())
                .map(|e| e.coupling)
                .sum();
            assert!(total <= 0.25);
        }
    }

    #[test]
    fn too_few_candidates() {
        let graph = star(9, 0.125);
        assert!(find_anti_blob(&graph, 0.5, 10).is_none());
        assert!(find_anti_blob(&graph, 0.5, 9).is_some());
    }

    #[test]
    fn empty_graph_has_no_anti_blob() {
        assert!(find_anti_blob(&Graph::empty("F.java"), 0.5, 1).is_none());
    }
}
