//! Temporal coupling graphs and the searches run on them.
//!
//! Builds one weighted, undirected graph per container from the replay
//! tallies, then looks for blobs (dense clusters found by greedy peeling,
//! component by component) and anti-blobs (large sets of barely coupled
//! nodes), and colors nodes by the group they fall in.

pub mod antiblob;
pub mod blobs;
pub mod builder;
pub mod color;
pub mod components;
pub mod dot;
pub mod graph;

pub use antiblob::find_anti_blob;
pub use blobs::find_blobs;
pub use builder::build_graph;
pub use color::color_nodes;
pub use components::connected_components;
pub use dot::to_dot;
pub use graph::{Edge, Graph, Node, Subgraph};
