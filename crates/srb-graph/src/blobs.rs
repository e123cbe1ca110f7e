//! Blob detection by greedy peeling.
//!
//! A blob is a set of entities that keep changing together: a dense
//! subgraph of the coupling graph. Density is the average weighted degree
//! (`sum of degrees / nodes`). Each connected component is peeled by
//! repeatedly removing its lowest-degree node; the densest node set seen
//! along the way is the candidate. Accepted blobs are cut out and the rest
//! of the component is searched again.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use tracing::debug;

use crate::components::IndexedGraph;
use crate::graph::{Graph, Subgraph};

/// Density gain below which two peeling snapshots count as equally dense.
const DENSITY_EPSILON: f64 = 1e-9;

/// Weighted degree with a total order.
#[derive(Debug, Clone, Copy)]
struct Degree(f64);

impl PartialEq for Degree {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Degree {}

impl PartialOrd for Degree {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Degree {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Find the blobs of `graph` whose density is at least `min_density`.
///
/// Blobs are pairwise disjoint. The result is deterministic: among nodes of
/// equal degree the one with the smallest label is peeled first, and a later
/// node set only replaces the candidate when it is strictly denser.
///
/// Components of a single node are never reported, even with a
/// `min_density` of zero: a lone node has no coupling to anything.
///
/// # Examples
///
/// ```
/// use srb_graph::{find_blobs, Edge, Graph, Node};
///
/// let edge = |s: &str, t: &str| Edge { source: s.into(), target: t.into(), revisions: 4, coupling: 1.0 };
/// let graph = Graph {
///     label: "A.java".into(),
///     nodes: ["a", "b", "c"].iter().map(|l| Node::new(*l, 4)).collect(),
///     edges: vec![edge("a", "b"), edge("a", "c"), edge("b", "c")],
/// };
/// let blobs = find_blobs(&graph, 1.5);
/// assert_eq!(blobs.len(), 1);
/// assert_eq!(blobs[0].density, 2.0);
/// assert!(find_blobs(&graph, 2.5).is_empty());
/// ```
pub fn find_blobs(graph: &Graph, min_density: f64) -> Vec<Subgraph> {
    let indexed = IndexedGraph::new(graph);
    let mut adjacency: Vec<Vec<(usize, f64)>> = vec![Vec::new(); indexed.len()];
    for &(u, v, coupling) in &indexed.edges {
        adjacency[u].push((v, coupling));
        adjacency[v].push((u, coupling));
    }

    let mut blobs = Vec::new();
    let mut work = indexed.components(&vec![true; indexed.len()]);
    work.reverse();
    while let Some(component) = work.pop() {
        // A lone node has no coupling to anything.
        if component.len() < 2 {
            continue;
        }
        let (members, density) = peel(&adjacency, &component);
        if density < min_density {
            continue;
        }

        let mut rest = vec![false; indexed.len()];
        for &node in &component {
            rest[node] = true;
        }
        for &node in &members {
            rest[node] = false;
        }
        let mut split = indexed.components(&rest);
        split.reverse();
        work.extend(split);

        debug!(
            graph = %graph.label,
            size = members.len(),
            density,
            "found blob"
        );
        blobs.push(Subgraph::new(
            members.iter().map(|&node| indexed.labels[node]),
            density,
        ));
    }
    blobs
}

/// Peel `component` down to nothing and return its densest prefix.
fn peel(adjacency: &[Vec<(usize, f64)>], component: &[usize]) -> (Vec<usize>, f64) {
    let mut present = vec![false; adjacency.len()];
    for &node in component {
        present[node] = true;
    }

    let mut degree = vec![0.0; adjacency.len()];
    let mut degree_sum = 0.0;
    for &node in component {
        degree[node] = adjacency[node]
            .iter()
            .filter(|(other, _)| present[*other])
            .map(|(_, coupling)| coupling)
            .sum();
        degree_sum += degree[node];
    }

    let mut queue: BTreeSet<(Degree, usize)> = component
        .iter()
        .map(|&node| (Degree(degree[node]), node))
        .collect();
    let mut peeled = Vec::with_capacity(component.len());
    // (number of nodes peeled before the snapshot, density)
    let mut best: Option<(usize, f64)> = None;

    while let Some((_, node)) = queue.pop_first() {
        let density = degree_sum / (component.len() - peeled.len()) as f64;
        if best.is_none_or(|(_, best_density)| density > best_density + DENSITY_EPSILON) {
            best = Some((peeled.len(), density));
        }

        present[node] = false;
        for &(other, coupling) in &adjacency[node] {
            if !present[other] {
                continue;
            }
            queue.remove(&(Degree(degree[other]), other));
            degree[other] -= coupling;
            queue.insert((Degree(degree[other]), other));
            degree_sum -= 2.0 * coupling;
        }
        peeled.push(node);
    }

    let start = best.map_or(0, |(start, _)| start);
    let mut members = peeled.split_off(start);
    members.sort_unstable();
    let density = induced_density(adjacency, &members);
    (members, density)
}

/// Density of the subgraph induced by `members`, summed from scratch.
///
/// The running sum kept while peeling accumulates rounding error, so the
/// reported value is recomputed from the edges themselves.
fn induced_density(adjacency: &[Vec<(usize, f64)>], members: &[usize]) -> f64 {
    if members.is_empty() {
        return 0.0;
    }
    let degree_sum: f64 = members
        .iter()
        .flat_map(|&node| &adjacency[node])
        .filter(|(other, _)| members.binary_search(other).is_ok())
        .map(|(_, coupling)| coupling)
        .sum();
    degree_sum / members.len() as f64
}
