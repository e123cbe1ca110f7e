//! Connected components by union-find.

use std::collections::{BTreeMap, BTreeSet};

use petgraph::unionfind::UnionFind;

use crate::graph::Graph;

/// A graph with nodes replaced by their position in the sorted node list.
#[derive(Debug)]
pub(crate) struct IndexedGraph<'a> {
    pub labels: Vec<&'a str>,
    /// `(source, target, coupling)`, endpoints as node indices.
    pub edges: Vec<(usize, usize, f64)>,
}

impl<'a> IndexedGraph<'a> {
    pub fn new(graph: &'a Graph) -> Self {
        let labels: Vec<&str> = graph.nodes.iter().map(|n| n.label.as_str()).collect();
        let index = |label: &str| labels.binary_search(&label).ok();
        let edges = graph
            .edges
            .iter()
            .filter_map(|e| Some((index(e.source.as_str())?, index(e.target.as_str())?, e.coupling)))
            .collect();
        Self { labels, edges }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Components of the subgraph induced by `alive`, each sorted, ordered by
    /// their smallest member.
    pub fn components(&self, alive: &[bool]) -> Vec<Vec<usize>> {
        let mut sets = UnionFind::<usize>::new(self.len());
        for &(u, v, _) in &self.edges {
            if alive[u] && alive[v] {
                sets.union(u, v);
            }
        }

        let mut by_root: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        let mut order = Vec::new();
        for node in (0..self.len()).filter(|&n| alive[n]) {
            let root = sets.find(node);
            by_root
                .entry(root)
                .or_insert_with(|| {
                    order.push(root);
                    Vec::new()
                })
                .push(node);
        }
        order
            .into_iter()
            .filter_map(|root| by_root.remove(&root))
            .collect()
    }
}

/// Split `graph` into connected components.
///
/// Components are ordered by their smallest label.
///
/// # Examples
///
/// ```
/// use srb_graph::{connected_components, Edge, Graph, Node};
///
/// let edge = |s: &str, t: &str| Edge { source: s.into(), target: t.into(), revisions: 1, coupling: 1.0 };
/// let graph = Graph {
///     label: "A.java".into(),
///     nodes: ["a", "b", "c", "d"].iter().map(|l| Node::new(*l, 1)).collect(),
///     edges: vec![edge("a", "c"), edge("b", "d")],
/// };
/// let components = connected_components(&graph);
/// assert_eq!(components.len(), 2);
/// assert!(components[0].contains("c"));
/// ```
pub fn connected_components(graph: &Graph) -> Vec<BTreeSet<String>> {
    let indexed = IndexedGraph::new(graph);
    let alive = vec![true; indexed.len()];
    indexed
        .components(&alive)
        .into_iter()
        .map(|members| {
            members
                .into_iter()
                .map(|n| indexed.labels[n].to_string())
                .collect()
        })
        .collect()
}
