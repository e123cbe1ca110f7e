//! Graphviz export.

use petgraph::dot::{Config, Dot};
use petgraph::graph::UnGraph;

use crate::graph::{Edge, Graph, Node};

/// Fill colors cycled through by node color; color 0 stays unfilled.
const PALETTE: [&str; 8] = [
    "#8dd3c7", "#ffffb3", "#bebada", "#fb8072", "#80b1d3", "#fdb462", "#b3de69", "#fccde5",
];

/// Render `graph` in the Graphviz DOT language.
///
/// Nodes are labelled with their entity and filled by color, edges with
/// their coupling and revision count.
///
/// # Examples
///
/// ```
/// use srb_graph::dot::to_dot;
/// use srb_graph::{Edge, Graph, Node};
///
/// let graph = Graph {
///     label: "A.java".into(),
///     nodes: vec![Node::new("a()", 3), Node::new("b()", 2)],
///     edges: vec![Edge { source: "a()".into(), target: "b()".into(), revisions: 3, coupling: 0.5 }],
/// };
/// let dot = to_dot(&graph);
/// assert!(dot.starts_with("graph \"A.java\" {"));
/// assert!(dot.contains("0 -- 1"));
/// ```
pub fn to_dot(graph: &Graph) -> String {
    let mut ungraph: UnGraph<&Node, &Edge> =
        UnGraph::with_capacity(graph.nodes.len(), graph.edges.len());
    let indices: Vec<_> = graph.nodes.iter().map(|node| ungraph.add_node(node)).collect();
    let index = |label: &str| {
        graph
            .nodes
            .binary_search_by(|node| node.label.as_str().cmp(label))
            .ok()
            .map(|i| indices[i])
    };
    for edge in &graph.edges {
        if let (Some(source), Some(target)) = (index(edge.source.as_str()), index(edge.target.as_str())) {
            ungraph.add_edge(source, target, edge);
        }
    }

    let body = Dot::with_attr_getters(
        &ungraph,
        &[Config::GraphContentOnly, Config::NodeNoLabel, Config::EdgeNoLabel],
        &|_, edge| {
            let edge = edge.weight();
            format!(
                "label = \"{:.2} / {}\" ",
                edge.coupling, edge.revisions
            )
        },
        &|_, (_, node)| {
            let mut attributes = format!("label = \"{}\" ", escape(&node.label));
            if node.color > 0 {
                let fill = PALETTE[(node.color as usize - 1) % PALETTE.len()];
                attributes.push_str(&format!("style = filled fillcolor = \"{fill}\" "));
            }
            attributes
        },
    );

    format!(
        "graph \"{}\" {{\n    node [shape = box]\n{:?}}}\n",
        escape(&graph.label),
        body
    )
}

fn escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}
