use std::fmt;

use serde::{Deserialize, Serialize};
use srb_graph::{Graph, Subgraph};

/// Category every [`FileReport`] is filed under.
pub const CATEGORY: &str = "SOLID Breakers";

/// Name of the analysis producing [`FileReport`]s.
pub const NAME: &str = "Single Responsibility Breakers";

/// What the analysis found in one container.
#[derive(Debug, Clone, PartialEq)]
pub struct Findings {
    /// The container's graph, colored by finding.
    pub graph: Graph,
    /// Blobs in the order they were found.
    pub blobs: Vec<Subgraph>,
    /// The anti-blob, if the container has one.
    pub anti_blob: Option<Subgraph>,
}

/// Findings of one container, as reported.
///
/// # Examples
///
/// ```
/// use srb_graph::Subgraph;
/// use srb_report::FileReport;
///
/// let report = FileReport::new("Main.java", vec![Subgraph::new(["a()", "b()"], 3.0)], None);
/// assert_eq!(report.value, 1);
/// assert_eq!(report.category, "SOLID Breakers");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileReport {
    /// Container id.
    pub file: String,
    /// Blobs in the order they were found.
    pub blobs: Vec<Subgraph>,
    /// Anti-blob, if any.
    pub anti_blob: Option<Subgraph>,
    /// Ranking score: number of blobs, plus one for an anti-blob.
    pub value: usize,
    /// Finding category, always [`CATEGORY`].
    pub category: String,
    /// Finding name, always [`NAME`].
    pub name: String,
}

impl FileReport {
    /// Report `blobs` and `anti_blob` for `file`, computing its value.
    pub fn new(file: impl Into<String>, blobs: Vec<Subgraph>, anti_blob: Option<Subgraph>) -> Self {
        let value = blobs.len() + usize::from(anti_blob.is_some());
        Self {
            file: file.into(),
            blobs,
            anti_blob,
            value,
            category: CATEGORY.to_string(),
            name: NAME.to_string(),
        }
    }
}

/// Ranked findings for a whole project plus the colored graph of every container.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// Containers ranked by descending value.
    pub files: Vec<FileReport>,
    /// Colored graphs, in the order the containers were analyzed.
    pub colored_graphs: Vec<Graph>,
}

/// Collect per-container findings into a ranked report.
///
/// Files are sorted by descending value; files of equal value keep the order
/// in which they were given.
///
/// # Examples
///
/// ```
/// use srb_graph::{Graph, Subgraph};
/// use srb_report::{aggregate, Findings};
///
/// let report = aggregate(vec![
///     Findings { graph: Graph::empty("A.java"), blobs: vec![], anti_blob: None },
///     Findings { graph: Graph::empty("B.java"), blobs: vec![Subgraph::new(["x()"], 3.0)], anti_blob: None },
/// ]);
/// assert_eq!(report.files[0].file, "B.java");
/// assert_eq!(report.colored_graphs[0].label, "A.java");
/// ```
pub fn aggregate(findings: impl IntoIterator<Item = Findings>) -> Report {
    let mut files = Vec::new();
    let mut colored_graphs = Vec::new();
    for Findings {
        graph,
        blobs,
        anti_blob,
    } in findings
    {
        files.push(FileReport::new(graph.label.clone(), blobs, anti_blob));
        colored_graphs.push(graph);
    }
    files.sort_by(|a, b| b.value.cmp(&a.value));
    Report {
        files,
        colored_graphs,
    }
}

impl Report {
    /// Files with at least one finding, best ranked first.
    pub fn offenders(&self) -> impl Iterator<Item = &FileReport> {
        self.files.iter().filter(|file| file.value > 0)
    }

    /// Render the report as a markdown string.
    ///
    /// # Examples
    ///
    /// ```
    /// use srb_report::Report;
    ///
    /// let md = Report::default().to_markdown();
    /// assert!(md.contains("# Single Responsibility Breakers"));
    /// ```
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("# {NAME}\n\n"));
        out.push_str(&format!(
            "**Containers analyzed:** {}\n\n",
            self.colored_graphs.len()
        ));

        let offenders: Vec<_> = self.offenders().collect();
        if offenders.is_empty() {
            out.push_str("No blobs or anti-blobs found.\n");
            return out;
        }

        out.push_str("| Rank | File | Value | Blobs | Anti-blob |\n");
        out.push_str("|------|------|-------|-------|-----------|\n");
        for (i, file) in offenders.iter().enumerate() {
            let anti_blob = file
                .anti_blob
                .as_ref()
                .map(|a| a.len().to_string())
                .unwrap_or_else(|| "-".into());
            out.push_str(&format!(
                "| {} | `{}` | {} | {} | {} |\n",
                i + 1,
                file.file,
                file.value,
                file.blobs.len(),
                anti_blob,
            ));
        }
        out.push('\n');

        for file in offenders {
            out.push_str(&format!("## `{}`\n\n", file.file));
            for (i, blob) in file.blobs.iter().enumerate() {
                out.push_str(&format!(
                    "- **Blob {}** (density {:.2}): {}\n",
                    i + 1,
                    blob.density,
                    members(blob, "`", ", ")
                ));
            }
            if let Some(anti_blob) = &file.anti_blob {
                out.push_str(&format!(
                    "- **Anti-blob** ({} members, coupling {:.2}): {}\n",
                    anti_blob.len(),
                    anti_blob.density,
                    members(anti_blob, "`", ", ")
                ));
            }
            out.push('\n');
        }
        out
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{NAME}")?;
        writeln!(f, "{}", "=".repeat(NAME.len()))?;

        let offenders: Vec<_> = self.offenders().collect();
        if offenders.is_empty() {
            writeln!(f, "No blobs or anti-blobs found.")?;
        } else {
            writeln!(f, "{:<50} {:>6} {:>6} {:>10}", "File", "Value", "Blobs", "Anti-blob")?;
            writeln!(f, "{}", "-".repeat(75))?;
            for file in &offenders {
                let anti_blob = file
                    .anti_blob
                    .as_ref()
                    .map(|a| a.len().to_string())
                    .unwrap_or_else(|| "-".into());
                writeln!(
                    f,
                    "{:<50} {:>6} {:>6} {:>10}",
                    file.file,
                    file.value,
                    file.blobs.len(),
                    anti_blob
                )?;
            }

            for file in &offenders {
                writeln!(f, "\n{}", file.file)?;
                for (i, blob) in file.blobs.iter().enumerate() {
                    writeln!(
                        f,
                        "  blob {} (density={:.2}): {}",
                        i + 1,
                        blob.density,
                        members(blob, "", ", ")
                    )?;
                }
                if let Some(anti_blob) = &file.anti_blob {
                    writeln!(
                        f,
                        "  anti-blob (coupling={:.2}): {}",
                        anti_blob.density,
                        members(anti_blob, "", ", ")
                    )?;
                }
            }
        }

        writeln!(
            f,
            "\nSummary: {} containers, {} with findings",
            self.colored_graphs.len(),
            offenders.len()
        )
    }
}

fn members(subgraph: &Subgraph, quote: &str, separator: &str) -> String {
    subgraph
        .nodes
        .iter()
        .map(|label| format!("{quote}{label}{quote}"))
        .collect::<Vec<_>>()
        .join(separator)
}
