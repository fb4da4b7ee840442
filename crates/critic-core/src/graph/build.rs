//! Weighted DAG construction from an imported topology and build durations.
//!
//! # Overview
//!
//! [`WeightedDag::build`] merges a [`DependencyTopology`] with the durations
//! resolved from the reactor summary into a fresh petgraph graph whose node
//! weights are [`Module`]s and whose edge weights are seconds.
//!
//! ## Edge Direction
//!
//! An edge `A → B` means "A **depends on** B", exactly as imported. Edge
//! weights model the time the edge's *source* module contributes to the
//! build: every outgoing edge of `A` weighs `A`'s build duration in whole
//! seconds, so a `0.980 s` module weighs `0`.
//!
//! ## Synthetic Root
//!
//! A module without dependencies has no outgoing edge, so nothing would carry
//! its duration. Each such build leaf gets one edge to a synthetic
//! `root:root` vertex. Think of root as the `mvn` invocation that starts the
//! build.
//!
//! ## Orientation for Solving
//!
//! The solver needs build order, so it runs on [`WeightedDag::reversed`], a
//! lazy view with every edge flipped. The graph itself is never mutated
//! after construction.

#![allow(clippy::module_name_repetitions)]

use std::time::Duration;

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Reversed;
use tracing::{debug, instrument};

use crate::error::CriticError;
use crate::graph::dot::DependencyTopology;
use crate::module::{Module, ModuleRegistry};

// ---------------------------------------------------------------------------
// WeightedDag
// ---------------------------------------------------------------------------

/// The build graph with module durations as edge weights.
///
/// Node indices of imported modules match the indices of the topology they
/// were built from; the root is the last node.
#[derive(Debug, Clone)]
pub struct WeightedDag {
    /// Directed graph: nodes = modules, edges = "depends on", weights = seconds.
    pub graph: DiGraph<Module, f64>,
    /// The synthetic `root:root` vertex.
    pub root: NodeIndex,
}

impl WeightedDag {
    /// Build the weighted DAG.
    ///
    /// Steps, in order:
    /// 1. Resolve every imported vertex to its duration-bearing module.
    /// 2. Add the synthetic root vertex.
    /// 3. Connect every vertex without outgoing edges to root.
    /// 4. Weight every outgoing edge with its source module's duration,
    ///    truncated to whole seconds.
    ///
    /// # Errors
    ///
    /// - [`CriticError::InvalidCoordinate`] when a vertex label is not a
    ///   coordinate.
    /// - [`CriticError::MissingBuildDuration`] listing *every* vertex that has
    ///   no duration in `durations`.
    #[instrument(skip_all, fields(nodes = topology.node_count(), durations = durations.len()))]
    pub fn build(
        topology: &DependencyTopology,
        durations: &ModuleRegistry,
    ) -> Result<Self, CriticError> {
        // Step 1: resolve modules, collecting all misses before failing.
        let mut modules = Vec::with_capacity(topology.node_count());
        let mut missing = Vec::new();

        for label in topology.graph.node_weights() {
            let query = Module::parse(label)?;
            match durations.resolve(&query) {
                Some(module) => modules.push(module.clone()),
                None => missing.push(query),
            }
        }

        if !missing.is_empty() {
            return Err(CriticError::MissingBuildDuration(missing));
        }

        let mut graph =
            DiGraph::with_capacity(topology.node_count() + 1, topology.edge_count() + 1);
        for module in modules {
            graph.add_node(module);
        }
        for edge in topology.graph.raw_edges() {
            graph.add_edge(edge.source(), edge.target(), 0.0);
        }

        // Step 2: synthetic root.
        let root = graph.add_node(Module::root());

        // Step 3: build leaves point at root.
        let leaves: Vec<NodeIndex> = graph
            .node_indices()
            .filter(|&v| v != root)
            .filter(|&v| graph.neighbors_directed(v, Direction::Outgoing).next().is_none())
            .collect();
        for &leaf in &leaves {
            graph.add_edge(leaf, root, 0.0);
        }

        // Step 4: after step 3 so the root edges are weighted too.
        let vertices: Vec<NodeIndex> = graph.node_indices().filter(|&v| v != root).collect();
        for v in vertices {
            let seconds = whole_seconds(graph[v].build_duration().unwrap_or_default());
            let mut outgoing = graph.neighbors_directed(v, Direction::Outgoing).detach();
            while let Some(e) = outgoing.next_edge(&graph) {
                graph[e] = seconds;
            }
        }

        debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            leaves = leaves.len(),
            "built weighted DAG"
        );

        Ok(Self { graph, root })
    }

    /// The edge-reversed view the solver runs on (build order).
    #[must_use]
    pub const fn reversed(&self) -> Reversed<&DiGraph<Module, f64>> {
        Reversed(&self.graph)
    }

    /// Return the module of a vertex.
    #[must_use]
    pub fn module(&self, idx: NodeIndex) -> Option<&Module> {
        self.graph.node_weight(idx)
    }

    /// Return the number of vertices, root included.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Return the number of edges, root edges included.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}

/// Edge weight of a duration: whole seconds, fraction dropped.
#[allow(clippy::cast_precision_loss)]
fn whole_seconds(duration: Duration) -> f64 {
    duration.as_secs() as f64
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
