//! History replay: change and joint-change tallies.
//!
//! Replays recorded revisions against the entity model, counting how often
//! every function changed and how often every pair of functions sharing a
//! container changed in the same revision. Deleted functions are purged from
//! all tallies.

pub mod aggregator;
pub mod tally;

pub use aggregator::{analyze, ChangeAggregator, Replay, ReplayStats};
pub use tally::{ChangeTally, JointChangeTally, Pair, Tallies};
