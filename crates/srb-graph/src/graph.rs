use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Temporal coupling graph of one container.
///
/// Nodes are sorted by label and unique; there is exactly one edge per
/// unordered pair of nodes.
///
/// # Examples
///
/// ```
/// use srb_graph::{Edge, Graph, Node};
///
/// let graph = Graph {
///     label: "Main.java".into(),
///     nodes: vec![Node::new("a()", 4), Node::new("b()", 3)],
///     edges: vec![Edge {
///         source: "a()".into(),
///         target: "b()".into(),
///         revisions: 5,
///         coupling: 0.4,
///     }],
/// };
/// assert_eq!(graph.node("b()").unwrap().revisions, 3);
/// assert!(!graph.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Graph {
    /// Id of the container (file or type) the graph describes.
    pub label: String,
    /// Entities, labelled relative to the container.
    pub nodes: Vec<Node>,
    /// Coupling between pairs of entities.
    pub edges: Vec<Edge>,
}

impl Graph {
    /// A graph without nodes or edges.
    pub fn empty(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }

    /// Find a node by label.
    pub fn node(&self, label: &str) -> Option<&Node> {
        self.nodes
            .binary_search_by(|node| node.label.as_str().cmp(label))
            .ok()
            .map(|index| &self.nodes[index])
    }

    /// Whether the graph has no node.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// An entity in a coupling graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Entity id relative to the container.
    pub label: String,
    /// Number of revisions that changed the entity.
    pub revisions: u32,
    /// Group the node was assigned to; 0 when it belongs to no finding.
    #[serde(default)]
    pub color: u32,
}

impl Node {
    /// An uncolored node.
    pub fn new(label: impl Into<String>, revisions: u32) -> Self {
        Self {
            label: label.into(),
            revisions,
            color: 0,
        }
    }
}

/// Temporal coupling between two entities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    /// Lexicographically smaller endpoint.
    pub source: String,
    /// Lexicographically larger endpoint.
    pub target: String,
    /// Revisions touching either endpoint: `changes(source) + changes(target) - joint`.
    pub revisions: u32,
    /// Jaccard similarity of the endpoints' revision sets: `joint / revisions`.
    pub coupling: f64,
}

impl Edge {
    /// The endpoint opposite to `label`, if `label` is an endpoint.
    pub fn other(&self, label: &str) -> Option<&str> {
        if self.source == label {
            Some(self.target.as_str())
        } else if self.target == label {
            Some(self.source.as_str())
        } else {
            None
        }
    }
}

/// A set of nodes reported as a finding, with its quality score.
///
/// # Examples
///
/// ```
/// use srb_graph::Subgraph;
///
/// let blob = Subgraph::new(["b()", "a()"], 2.75);
/// assert_eq!(blob.nodes.iter().next().unwrap(), "a()");
/// assert_eq!(blob.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subgraph {
    /// Node labels.
    pub nodes: BTreeSet<String>,
    /// Average weighted degree for blobs, average total coupling for anti-blobs.
    pub density: f64,
}

impl Subgraph {
    /// Collect `nodes` into a subgraph.
    pub fn new<I, S>(nodes: I, density: f64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            nodes: nodes.into_iter().map(Into::into).collect(),
            density,
        }
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the subgraph holds no node.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether `label` is a member.
    pub fn contains(&self, label: &str) -> bool {
        self.nodes.contains(label)
    }
}
