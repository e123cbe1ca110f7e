//! End-to-end analysis: replay, per-container graph searches, ranking.

use rayon::prelude::*;
use srb_core::{AnalysisOptions, SrbError};
use srb_graph::{build_graph, color_nodes, find_anti_blob, find_blobs, Subgraph};
use srb_history::{analyze, Replay};
use srb_model::{EntityModel, Revision, VisibilityRegistry};
use tracing::{debug, info, warn};

use crate::report::{aggregate, Findings, Report};

/// Runs the SRP analysis with validated options.
///
/// # Examples
///
/// ```
/// use srb_core::AnalysisOptions;
/// use srb_model::history::parse_history;
/// use srb_report::Analyzer;
///
/// let history = parse_history(r#"[
///   {"id": "0", "edits": [{"type": "addNode", "node": {"kind": "file", "id": "A.java", "children": [
///       {"kind": "function", "id": "A.java:a()"}
///   ]}}]}
/// ]"#).unwrap();
///
/// let report = Analyzer::new(AnalysisOptions::default()).analyze(&history).unwrap();
/// assert_eq!(report.files.len(), 1);
/// assert_eq!(report.files[0].value, 0);
/// ```
#[derive(Debug)]
pub struct Analyzer {
    options: AnalysisOptions,
    visibility: VisibilityRegistry,
}

impl Analyzer {
    /// An analyzer using the built-in visibility providers.
    pub fn new(options: AnalysisOptions) -> Self {
        Self::with_visibility(options, VisibilityRegistry::with_defaults())
    }

    /// An analyzer deciding public-only filtering with `visibility`.
    pub fn with_visibility(options: AnalysisOptions, visibility: VisibilityRegistry) -> Self {
        Self {
            options,
            visibility,
        }
    }

    /// The thresholds this analyzer runs with.
    pub fn options(&self) -> &AnalysisOptions {
        &self.options
    }

    /// Replay `revisions` from an empty project and report on the result.
    ///
    /// # Errors
    ///
    /// Returns [`SrbError::Model`] if the history is inconsistent.
    pub fn analyze(&self, revisions: &[Revision]) -> Result<Report, SrbError> {
        let replay = analyze(revisions, self.options.max_change_set())?;
        Ok(self.report(&replay))
    }

    /// Analyze every container of a finished replay.
    ///
    /// Containers are analyzed in parallel and encountered in ascending id
    /// order.
    pub fn report<M>(&self, replay: &Replay<M>) -> Report
    where
        M: EntityModel + Sync,
    {
        let containers = replay.tallies.containers();
        let findings: Vec<Findings> = containers
            .par_iter()
            .map(|container| self.analyze_container(container, replay))
            .collect();

        let report = aggregate(findings);
        info!(
            containers = report.colored_graphs.len(),
            offenders = report.offenders().count(),
            "analysis finished"
        );
        report
    }

    /// Build, search, and color the graph of one container.
    pub fn analyze_container<M>(&self, container: &str, replay: &Replay<M>) -> Findings
    where
        M: EntityModel,
    {
        let options = &self.options;
        let graph = build_graph(
            container,
            &replay.tallies,
            options.min_coupling(),
            options.min_revisions(),
            |id| !options.public_only() || self.visibility.is_public(&replay.model, id),
        );

        let max = options.max_graph_size();
        let blobs = if graph.nodes.len() > max {
            warn!(
                container,
                nodes = graph.nodes.len(),
                max_graph_size = max,
                "graph too large, reporting every node as a blob"
            );
            graph
                .nodes
                .iter()
                .map(|node| Subgraph::new([node.label.as_str()], 0.0))
                .collect()
        } else {
            find_blobs(&graph, options.min_blob_density())
        };
        let anti_blob = find_anti_blob(
            &graph,
            options.max_anti_coupling(),
            options.min_anti_blob_size(),
        );
        debug!(
            container,
            nodes = graph.nodes.len(),
            edges = graph.edges.len(),
            blobs = blobs.len(),
            anti_blob = anti_blob.is_some(),
            "analyzed container"
        );

        Findings {
            graph: color_nodes(&graph, &blobs, anti_blob.as_ref()),
            blobs,
            anti_blob,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use srb_core::AnalysisConfig;
    use srb_model::{EntityKind, ModifierEdit, ProjectEdit, SourceNode};

    fn revision(edits: Vec<ProjectEdit>) -> Revision {
        Revision {
            id: String::new(),
            author: None,
            date: None,
            edits,
        }
    }

    fn touch(ids: &[&str]) -> Revision {
        revision(
            ids.iter()
                .map(|id| ProjectEdit::EditFunction {
                    id: id.to_string(),
                    modifiers: ModifierEdit::default(),
                })
                .collect(),
        )
    }

    fn options(configure: impl FnOnce(&mut AnalysisConfig)) -> AnalysisOptions {
        let mut config = AnalysisConfig {
            min_revisions: 1,
            min_coupling: 0.0,
            ..AnalysisConfig::default()
        };
        configure(&mut config);
        config.to_options().unwrap()
    }

    /// `Big.java` has four functions always changed together; `Small.java`
    /// has two that never changed together after being added.
    fn history() -> Vec<Revision> {
        let mut big = SourceNode::new(EntityKind::File, "Big.java");
        for name in ["a()", "b()", "c()", "d()"] {
            big = big.with_child(
                SourceNode::new(EntityKind::Function, format!("Big.java:{name}"))
                    .with_modifiers(["public"]),
            );
        }
        let small = SourceNode::new(EntityKind::File, "Small.java")
            .with_child(SourceNode::new(EntityKind::Function, "Small.java:x()"))
            .with_child(SourceNode::new(EntityKind::Function, "Small.java:y()"));

        let mut history = vec![revision(vec![ProjectEdit::AddNode { node: big }])];
        history.push(revision(vec![ProjectEdit::AddNode { node: small }]));
        for _ in 0..4 {
            history.push(touch(&["Big.java:a()", "Big.java:b()", "Big.java:c()", "Big.java:d()"]));
            history.push(touch(&["Small.java:x()"]));
            history.push(touch(&["Small.java:y()"]));
        }
        history
    }

    #[test]
    fn clique_is_reported_first() {
        let report = Analyzer::new(options(|_| {})).analyze(&history()).unwrap();
        assert_eq!(report.files[0].file, "Big.java");
        assert_eq!(report.files[0].blobs.len(), 1);
        assert_eq!(report.files[0].blobs[0].len(), 4);
        assert_eq!(report.files[0].blobs[0].density, 3.0);

        let graph = &report.colored_graphs[0];
        assert_eq!(graph.label, "Big.java");
        assert!(graph.nodes.iter().all(|n| n.color == 1));
    }

    #[test]
    fn loosely_coupled_container_gets_an_anti_blob() {
        let report = Analyzer::new(options(|c| c.min_anti_blob_size = 2))
            .analyze(&history())
            .unwrap();
        let small = report.files.iter().find(|f| f.file == "Small.java").unwrap();
        // x and y changed together once out of nine revisions
        assert!(small.blobs.is_empty());
        let anti_blob = small.anti_blob.as_ref().unwrap();
        assert_eq!(anti_blob.len(), 2);
        assert_eq!(small.value, 1);
    }

    #[test]
    fn public_only_drops_private_functions() {
        let report = Analyzer::new(options(|c| c.public_only = true))
            .analyze(&history())
            .unwrap();
        let small = report
            .colored_graphs
            .iter()
            .find(|g| g.label == "Small.java")
            .unwrap();
        assert!(small.is_empty());
        let big = report.colored_graphs.iter().find(|g| g.label == "Big.java").unwrap();
        assert_eq!(big.nodes.len(), 4);
    }

    #[test]
    fn oversized_graph_reports_every_node() {
        let report = Analyzer::new(options(|c| c.max_graph_size = 3))
            .analyze(&history())
            .unwrap();
        let big = &report.files[0];
        assert_eq!(big.file, "Big.java");
        assert_eq!(big.blobs.len(), 4);
        assert_eq!(big.value, 4);
        assert!(big.blobs.iter().all(|b| b.len() == 1 && b.density == 0.0));
        let labels: Vec<&str> = big
            .blobs
            .iter()
            .flat_map(|b| b.nodes.iter().map(String::as_str))
            .collect();
        assert_eq!(labels, ["a()", "b()", "c()", "d()"]);
    }

    #[test]
    fn graphs_at_the_size_limit_are_searched() {
        let report = Analyzer::new(options(|c| c.max_graph_size = 4))
            .analyze(&history())
            .unwrap();
        assert_eq!(report.files[0].blobs.len(), 1);
        assert_eq!(report.files[0].value, 1);
    }

    #[test]
    fn analysis_is_repeatable() {
        let analyzer = Analyzer::new(options(|c| c.min_anti_blob_size = 2));
        let history = history();
        assert_eq!(analyzer.analyze(&history).unwrap(), analyzer.analyze(&history).unwrap());
    }
}
