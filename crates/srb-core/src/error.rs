use std::path::PathBuf;

/// Errors that can occur across srb.
///
/// Each variant wraps a specific error domain. Library crates use this type
/// directly; every variant is a `miette` diagnostic so the binary can report
/// it with `?`.
///
/// # Examples
///
/// ```
/// use srb_core::SrbError;
///
/// let err = SrbError::Config("invalid coupling '-1'".into());
/// assert!(err.to_string().contains("invalid coupling"));
/// ```
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum SrbError {
    /// Filesystem I/O failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    #[diagnostic(help("check the [analysis] section of .srb.toml and the command-line thresholds"))]
    Config(String),

    /// The entity model was asked about an id it does not know, or an edit
    /// contradicts its current state.
    #[error("model consistency error: {0}")]
    Model(String),

    /// The revision history could not be interpreted.
    #[error("history error: {0}")]
    History(String),

    /// JSON serialization / deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML deserialization failure.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A required file was not found.
    #[error("file not found: {}", .0.display())]
    #[diagnostic(help("check the path, relative paths resolve against the working directory"))]
    FileNotFound(PathBuf),
}
