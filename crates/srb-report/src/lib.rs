//! Per-container analysis and the ranked SRP report.
//!
//! Runs graph construction, blob and anti-blob detection, and coloring for
//! every container of a finished replay, ranks the containers by how many
//! findings they carry, and renders the result as text, Markdown, JSON, or a
//! directory of per-container graph files.

pub mod analyzer;
pub mod output;
pub mod report;

pub use analyzer::Analyzer;
pub use output::write_output;
pub use report::{aggregate, FileReport, Findings, Report};
