//! End-to-end critical path analysis of one Maven build.
//!
//! # Overview
//!
//! [`CriticalPathAnalysis::run`] reads the three inputs, resolves build
//! durations, builds the weighted DAG, solves it in build order and keeps
//! everything needed to print a headline, write the annotated graph or emit
//! a [`CriticalPathReport`].
//!
//! All fatal errors surface before any output is written. An empty critical
//! path is not an error; [`CriticalPathAnalysis::write_output`] simply
//! writes nothing.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::config::CriticConfig;
use crate::error::CriticError;
use crate::graph::{
    CriticalPathResult, DependencyTopology, DotExport, HighlightSummary, WeightedDag,
    compute_critical_path, load_topology,
};
use crate::module::{Module, ModuleRegistry};
use crate::reactor::load_durations;

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Paths of the three input files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisInputs {
    /// depgraph-maven-plugin DOT output.
    pub dependency_graph: PathBuf,
    /// Maven build log containing a reactor summary.
    pub build_log: PathBuf,
    /// `name,coordinate` CSV.
    pub artifact_mapping: PathBuf,
}

// ---------------------------------------------------------------------------
// Analysis
// ---------------------------------------------------------------------------

/// A solved build graph.
#[derive(Debug, Clone)]
pub struct CriticalPathAnalysis {
    pub dag: WeightedDag,
    pub path: CriticalPathResult,
    pub summary: Option<HighlightSummary>,
    config: CriticConfig,
}

impl CriticalPathAnalysis {
    /// Read all inputs from disk and analyze them.
    ///
    /// # Errors
    ///
    /// Returns an error if an input cannot be read or parsed, or if a graph
    /// module has no build duration.
    #[instrument(skip_all, fields(graph = %inputs.dependency_graph.display()))]
    pub fn run(inputs: &AnalysisInputs, config: &CriticConfig) -> Result<Self> {
        let durations =
            load_durations(&inputs.artifact_mapping, &inputs.build_log, &config.reactor)?;
        let topology = load_topology(&inputs.dependency_graph)?;
        let analysis = Self::from_parts(&topology, &durations, config)?;

        info!(
            modules = topology.node_count(),
            path_len = analysis.path.len(),
            "critical path analysis complete"
        );
        Ok(analysis)
    }

    /// Analyze an already imported topology.
    ///
    /// # Errors
    ///
    /// Returns [`CriticError::MissingBuildDuration`] or
    /// [`CriticError::InvalidCoordinate`] from DAG construction.
    pub fn from_parts(
        topology: &DependencyTopology,
        durations: &ModuleRegistry,
        config: &CriticConfig,
    ) -> Result<Self, CriticError> {
        let dag = WeightedDag::build(topology, durations)?;
        let path = compute_critical_path(dag.reversed());
        let summary = HighlightSummary::of(&path);

        if let Some(s) = &summary {
            debug!(min = s.min, max = s.max, total = s.total, "critical path summary");
        }

        Ok(Self {
            dag,
            path,
            summary,
            config: config.clone(),
        })
    }

    /// The module that finishes the critical path.
    #[must_use]
    pub fn terminal_module(&self) -> Option<&Module> {
        self.summary.and_then(|s| self.dag.module(s.terminal))
    }

    /// One-line description of the result.
    ///
    /// `Maven build order - critical path ends at g:web[30.000 s] and takes 2.60min`
    #[must_use]
    pub fn headline(&self) -> String {
        let title = &self.config.output.title;
        match (self.summary, self.terminal_module()) {
            (Some(summary), Some(module)) => format!(
                "{title} - critical path ends at {module} and takes {:.2}min",
                summary.total_minutes()
            ),
            _ => format!("{title} - no critical path found"),
        }
    }

    /// The annotated graph exporter for this analysis.
    #[must_use]
    pub fn dot_export<'a>(&'a self, label: &'a str) -> DotExport<'a> {
        DotExport {
            dag: &self.dag,
            path: &self.path,
            summary: self.summary.as_ref(),
            highlight: &self.config.highlight,
            graph_name: &self.config.output.graph_name,
            label,
        }
    }

    /// Write the annotated graph to `out`.
    ///
    /// # Errors
    ///
    /// Returns any error from the writer.
    pub fn render_dot<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        let headline = self.headline();
        self.dot_export(&headline).write_to(out)
    }

    /// Write the annotated graph to `path`.
    ///
    /// Returns `false`, without touching `path`, when there is no critical
    /// path to show.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or written.
    pub fn write_output(&self, path: &Path) -> Result<bool> {
        if self.path.is_empty() {
            return Ok(false);
        }

        let file =
            File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
        let mut out = BufWriter::new(file);
        self.render_dot(&mut out)
            .and_then(|()| out.flush())
            .with_context(|| format!("Failed to write {}", path.display()))?;

        debug!(path = %path.display(), "wrote annotated graph");
        Ok(true)
    }

    /// Serializable summary of the result.
    #[must_use]
    pub fn report(&self) -> CriticalPathReport {
        let path = self
            .path
            .build_order()
            .filter_map(|edge| {
                self.dag.module(edge.target).map(|module| PathStep {
                    module: module.coordinates(),
                    seconds: edge.weight,
                })
            })
            .collect();

        CriticalPathReport {
            headline: self.headline(),
            terminal: self.terminal_module().map(Module::coordinates),
            total_seconds: self.summary.map_or(0.0, |s| s.total),
            total_minutes: self.summary.map_or(0.0, |s| s.total_minutes()),
            min_edge_seconds: self.summary.map(|s| s.min),
            max_edge_seconds: self.summary.map(|s| s.max),
            module_count: self.dag.node_count().saturating_sub(1),
            path,
        }
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Machine-readable analysis result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CriticalPathReport {
    pub headline: String,
    /// Coordinates of the module that finishes last.
    pub terminal: Option<String>,
    pub total_seconds: f64,
    pub total_minutes: f64,
    pub min_edge_seconds: Option<f64>,
    pub max_edge_seconds: Option<f64>,
    /// Modules in the dependency graph, root excluded.
    pub module_count: usize,
    /// Critical path modules in build order.
    pub path: Vec<PathStep>,
}

/// One module on the critical path and the time it contributes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathStep {
    pub module: String,
    pub seconds: f64,
}
