use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::SrbError;

/// Top-level configuration loaded from `.srb.toml`.
///
/// Supports layered resolution: CLI flags > local config > defaults.
///
/// # Examples
///
/// ```
/// use srb_core::SrbConfig;
///
/// let config = SrbConfig::default();
/// assert_eq!(config.analysis.min_revisions, 5);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SrbConfig {
    /// Thresholds for history replay and graph analysis.
    #[serde(default)]
    pub analysis: AnalysisConfig,
    /// Where and how results are written.
    #[serde(default)]
    pub output: OutputConfig,
}

impl SrbConfig {
    /// Load configuration from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`SrbError::Io`] if the file cannot be read, or
    /// [`SrbError::Toml`] if the content is not valid TOML.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use srb_core::SrbConfig;
    /// use std::path::Path;
    ///
    /// let config = SrbConfig::from_file(Path::new(".srb.toml")).unwrap();
    /// ```
    pub fn from_file(path: &Path) -> Result<Self, SrbError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`SrbError::Toml`] if parsing fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use srb_core::SrbConfig;
    ///
    /// let toml = r#"
    /// [analysis]
    /// min_revisions = 3
    /// "#;
    /// let config = SrbConfig::from_toml(toml).unwrap();
    /// assert_eq!(config.analysis.min_revisions, 3);
    /// ```
    pub fn from_toml(content: &str) -> Result<Self, SrbError> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }
}

/// Raw analysis thresholds, as written in `.srb.toml` or on the command line.
///
/// Nothing here is validated; convert with [`AnalysisConfig::to_options`]
/// before running an analysis.
///
/// # Examples
///
/// ```
/// use srb_core::AnalysisConfig;
///
/// let config = AnalysisConfig::default();
/// assert_eq!(config.max_change_set, 50);
/// assert_eq!(config.min_coupling, 0.1);
/// assert_eq!(config.min_blob_density, 2.5);
/// assert!(!config.public_only);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Revisions touching more files than this skip co-change accounting (default: 50).
    #[serde(default = "default_max_change_set")]
    pub max_change_set: usize,
    /// Minimum number of revisions touching either endpoint of an edge (default: 5).
    #[serde(default = "default_min_revisions")]
    pub min_revisions: u32,
    /// Minimum Jaccard coupling of an edge (default: 0.1).
    #[serde(default = "default_min_coupling")]
    pub min_coupling: f64,
    /// Minimum average weighted degree of a blob (default: 2.5).
    #[serde(default = "default_min_blob_density")]
    pub min_blob_density: f64,
    /// Maximum total incident coupling of an anti-blob member (default: 0.5).
    #[serde(default = "default_max_anti_coupling")]
    pub max_anti_coupling: f64,
    /// Minimum node count of a reported anti-blob (default: 10).
    #[serde(default = "default_min_anti_blob_size")]
    pub min_anti_blob_size: usize,
    /// Only keep entities reported public by a visibility provider.
    #[serde(default)]
    pub public_only: bool,
    /// Graphs with more nodes than this report every node as its own blob (default: 300).
    #[serde(default = "default_max_graph_size")]
    pub max_graph_size: usize,
}

fn default_max_change_set() -> usize {
    50
}

fn default_min_revisions() -> u32 {
    5
}

fn default_min_coupling() -> f64 {
    0.1
}

fn default_min_blob_density() -> f64 {
    2.5
}

fn default_max_anti_coupling() -> f64 {
    0.5
}

fn default_min_anti_blob_size() -> usize {
    10
}

fn default_max_graph_size() -> usize {
    300
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_change_set: default_max_change_set(),
            min_revisions: default_min_revisions(),
            min_coupling: default_min_coupling(),
            min_blob_density: default_min_blob_density(),
            max_anti_coupling: default_max_anti_coupling(),
            min_anti_blob_size: default_min_anti_blob_size(),
            public_only: false,
            max_graph_size: default_max_graph_size(),
        }
    }
}

impl AnalysisConfig {
    /// Validate the thresholds and freeze them into [`AnalysisOptions`].
    ///
    /// # Errors
    ///
    /// Returns [`SrbError::Config`] naming the first out-of-range threshold.
    pub fn to_options(&self) -> Result<AnalysisOptions, SrbError> {
        AnalysisOptions::new(self.clone())
    }
}

/// Validated analysis thresholds.
///
/// The only way to obtain a value is [`AnalysisOptions::new`] (or
/// [`AnalysisConfig::to_options`]), so every holder can rely on the
/// thresholds being in range.
///
/// # Examples
///
/// ```
/// use srb_core::{AnalysisConfig, AnalysisOptions};
///
/// let bad = AnalysisConfig { min_coupling: -0.5, ..AnalysisConfig::default() };
/// assert!(AnalysisOptions::new(bad).is_err());
///
/// let options = AnalysisOptions::default();
/// assert_eq!(options.min_anti_blob_size(), 10);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisOptions {
    max_change_set: usize,
    min_revisions: u32,
    min_coupling: f64,
    min_blob_density: f64,
    max_anti_coupling: f64,
    min_anti_blob_size: usize,
    public_only: bool,
    max_graph_size: usize,
}

impl AnalysisOptions {
    /// Validate `config`.
    ///
    /// # Errors
    ///
    /// Returns [`SrbError::Config`] if a bound is zero, a coupling lies
    /// outside `[0, 1]`, or a density / coupling ceiling is negative or not finite.
    pub fn new(config: AnalysisConfig) -> Result<Self, SrbError> {
        if config.max_change_set == 0 {
            return Err(invalid("max change set", config.max_change_set));
        }
        if config.min_revisions == 0 {
            return Err(invalid("revisions", config.min_revisions));
        }
        if !(0.0..=1.0).contains(&config.min_coupling) {
            return Err(invalid("coupling", config.min_coupling));
        }
        if !config.min_blob_density.is_finite() || config.min_blob_density < 0.0 {
            return Err(invalid("blob density", config.min_blob_density));
        }
        if !config.max_anti_coupling.is_finite() || config.max_anti_coupling < 0.0 {
            return Err(invalid("anti-blob coupling", config.max_anti_coupling));
        }
        if config.min_anti_blob_size == 0 {
            return Err(invalid("anti-blob size", config.min_anti_blob_size));
        }
        if config.max_graph_size == 0 {
            return Err(invalid("max graph size", config.max_graph_size));
        }

        Ok(Self {
            max_change_set: config.max_change_set,
            min_revisions: config.min_revisions,
            min_coupling: config.min_coupling,
            min_blob_density: config.min_blob_density,
            max_anti_coupling: config.max_anti_coupling,
            min_anti_blob_size: config.min_anti_blob_size,
            public_only: config.public_only,
            max_graph_size: config.max_graph_size,
        })
    }

    /// Revisions touching more files than this skip co-change accounting.
    pub fn max_change_set(&self) -> usize {
        self.max_change_set
    }

    /// Minimum revisions touching either endpoint of an edge.
    pub fn min_revisions(&self) -> u32 {
        self.min_revisions
    }

    /// Minimum Jaccard coupling of an edge.
    pub fn min_coupling(&self) -> f64 {
        self.min_coupling
    }

    /// Minimum average weighted degree of a blob.
    pub fn min_blob_density(&self) -> f64 {
        self.min_blob_density
    }

    /// Maximum total incident coupling of an anti-blob member.
    pub fn max_anti_coupling(&self) -> f64 {
        self.max_anti_coupling
    }

    /// Minimum anti-blob size.
    pub fn min_anti_blob_size(&self) -> usize {
        self.min_anti_blob_size
    }

    /// Whether only public entities are analyzed.
    pub fn public_only(&self) -> bool {
        self.public_only
    }

    /// Node count above which the blob search is replaced by singletons.
    pub fn max_graph_size(&self) -> usize {
        self.max_graph_size
    }
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        let config = AnalysisConfig::default();
        Self {
            max_change_set: config.max_change_set,
            min_revisions: config.min_revisions,
            min_coupling: config.min_coupling,
            min_blob_density: config.min_blob_density,
            max_anti_coupling: config.max_anti_coupling,
            min_anti_blob_size: config.min_anti_blob_size,
            public_only: config.public_only,
            max_graph_size: config.max_graph_size,
        }
    }
}

fn invalid(name: &str, value: impl std::fmt::Display) -> SrbError {
    SrbError::Config(format!("invalid {name} '{value}'"))
}

/// Output settings.
///
/// # Examples
///
/// ```
/// use srb_core::OutputConfig;
///
/// let config = OutputConfig::default();
/// assert!(config.directory.is_none());
/// assert!(config.graphviz);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory receiving `report.json` and per-container graphs.
    pub directory: Option<PathBuf>,
    /// Also write a Graphviz `.dot` file next to every graph (default: true).
    #[serde(default = "default_graphviz")]
    pub graphviz: bool,
}

fn default_graphviz() -> bool {
    true
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: None,
            graphviz: default_graphviz(),
        }
    }
}
