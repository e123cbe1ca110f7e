use std::collections::HashMap;

use crate::graph::{Graph, Subgraph};

/// Color the nodes of `graph` by the finding they belong to.
///
/// Blob `i` (1-based, in the order given) gets color `i`, the anti-blob gets
/// the next color, and every other node gets 0. A node in both a blob and the
/// anti-blob ends up with the anti-blob's color.
///
/// # Examples
///
/// ```
/// use srb_graph::{color_nodes, Graph, Node, Subgraph};
///
/// let graph = Graph {
///     label: "A.java".into(),
///     nodes: vec![Node::new("a", 1), Node::new("b", 1), Node::new("c", 1)],
///     edges: vec![],
/// };
/// let colored = color_nodes(&graph, &[Subgraph::new(["a"], 2.5)], Some(&Subgraph::new(["c"], 0.0)));
/// let colors: Vec<u32> = colored.nodes.iter().map(|n| n.color).collect();
/// assert_eq!(colors, [1, 0, 2]);
/// ```
pub fn color_nodes(graph: &Graph, blobs: &[Subgraph], anti_blob: Option<&Subgraph>) -> Graph {
    let mut colors: HashMap<&str, u32> = HashMap::new();
    for (color, group) in (1..).zip(blobs.iter().chain(anti_blob)) {
        for label in &group.nodes {
            colors.insert(label.as_str(), color);
        }
    }

    let mut colored = graph.clone();
    for node in &mut colored.nodes {
        node.color = colors.get(node.label.as_str()).copied().unwrap_or(0);
    }
    colored
}
