//! Core types, configuration, and error handling for srb.
//!
//! This crate provides the shared foundation used by all other srb crates:
//! - [`SrbError`]: unified error type using `thiserror`
//! - [`SrbConfig`]: configuration loaded from `.srb.toml`
//! - [`AnalysisOptions`]: validated analysis thresholds
//! - [`OutputFormat`]: CLI output selection

mod config;
mod error;
mod types;

pub use config::{AnalysisConfig, AnalysisOptions, OutputConfig, SrbConfig};
pub use error::SrbError;
pub use types::{OutputFormat, ENTITY_SEPARATOR};

/// A convenience `Result` type for srb operations.
pub type Result<T> = std::result::Result<T, SrbError>;
