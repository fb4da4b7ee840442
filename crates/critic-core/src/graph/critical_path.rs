//! Critical path analysis for the weighted build graph.
//!
//! # Overview
//!
//! The critical path is the *most expensive* chain of edges in the graph.
//! With edge weights set to module build durations it is the sequence of
//! modules that bounds how fast the whole reactor can possibly finish.
//!
//! # Algorithm
//!
//! A single forward pass in topological order:
//!
//! 1. `cost[v] = max(cost[s] + weight(s → v))` over incoming edges, or `0`
//!    when there are none. The maximizing edge is remembered as `pred[v]`.
//! 2. The vertex with the largest `cost` overall is the path's target.
//! 3. Walking `pred` back from the target yields the path.
//!
//! A candidate must be *strictly* more expensive than what has been seen to
//! replace it, so zero-cost edges never start a path and a graph whose
//! weights are all zero has an empty critical path.
//!
//! # Ties
//!
//! petgraph iterates adjacency lists in reverse insertion order, which is not
//! something results should depend on. Ties are broken explicitly:
//!
//! - between equally expensive incoming edges, the one whose source has the
//!   lowest node index wins;
//! - between equally expensive targets, the lowest node index wins.
//!
//! # Orientation
//!
//! The solver follows edges in whatever direction the graph view presents
//! them. [`crate::graph::build::WeightedDag`] stores "depends on" edges, so
//! callers pass [`WeightedDag::reversed`](crate::graph::build::WeightedDag::reversed)
//! to get a path in build order. The returned edges carry their endpoints as
//! seen through that view.

#![allow(clippy::module_name_repetitions)]

use std::collections::HashMap;

use petgraph::Direction;
use petgraph::algo::toposort;
use petgraph::graph::{EdgeIndex, NodeIndex};
use petgraph::visit::{Data, EdgeRef, GraphBase, IntoEdgesDirected, IntoNodeIdentifiers, Visitable};
use tracing::{instrument, trace, warn};

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// One edge of the critical path, oriented as the solved view presents it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathEdge {
    /// Index of the edge in the underlying graph.
    pub id: EdgeIndex,
    /// Vertex the edge leaves (built earlier in build order).
    pub source: NodeIndex,
    /// Vertex the edge enters.
    pub target: NodeIndex,
    /// Edge weight in seconds.
    pub weight: f64,
}

/// Result of critical path analysis.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CriticalPathResult {
    /// Path edges from the terminal edge back to the initial edge.
    ///
    /// Empty when the graph has no edge with positive weight.
    pub edges: Vec<PathEdge>,
    /// Accumulated cost at the path's target.
    pub total_cost: f64,
}

impl CriticalPathResult {
    /// Return an empty result.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Return `true` if no critical path was found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Number of edges on the path.
    #[must_use]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// The vertex with the globally largest accumulated cost.
    #[must_use]
    pub fn target(&self) -> Option<NodeIndex> {
        self.edges.first().map(|e| e.target)
    }

    /// Return `true` if the edge lies on the path.
    #[must_use]
    pub fn contains(&self, id: EdgeIndex) -> bool {
        self.edges.iter().any(|e| e.id == id)
    }

    /// Path edges from the initial edge to the terminal edge.
    pub fn build_order(&self) -> impl Iterator<Item = &PathEdge> {
        self.edges.iter().rev()
    }
}

// ---------------------------------------------------------------------------
// Core computation
// ---------------------------------------------------------------------------

/// Compute the critical path of `graph` in the orientation it presents.
///
/// Works on any petgraph view indexed like a [`petgraph::graph::Graph`],
/// including [`petgraph::visit::Reversed`] over one.
///
/// # Returns
///
/// A [`CriticalPathResult`] whose edges run from the terminal edge back to
/// the initial one. Empty for graphs without edges, and for cyclic input,
/// which is logged and otherwise ignored.
#[must_use]
#[instrument(skip_all)]
#[allow(clippy::float_cmp)]
pub fn compute_critical_path<G>(graph: G) -> CriticalPathResult
where
    G: GraphBase<NodeId = NodeIndex, EdgeId = EdgeIndex>
        + Data<EdgeWeight = f64>
        + IntoEdgesDirected
        + IntoNodeIdentifiers
        + Visitable,
{
    let topo = match toposort(graph, None) {
        Ok(order) => order,
        Err(cycle) => {
            warn!(node = cycle.node_id().index(), "graph has a cycle; no critical path");
            return CriticalPathResult::empty();
        }
    };

    let mut cost: HashMap<NodeIndex, f64> = HashMap::with_capacity(topo.len());
    let mut pred: HashMap<NodeIndex, PathEdge> = HashMap::with_capacity(topo.len());
    let mut best: Option<(NodeIndex, f64)> = None;

    for &v in &topo {
        let mut max = 0.0;
        let mut chosen: Option<PathEdge> = None;

        for e in graph.edges_directed(v, Direction::Incoming) {
            let source = e.source();
            let candidate = cost.get(&source).copied().unwrap_or(0.0) + *e.weight();
            let wins = candidate > max
                || chosen.is_some_and(|c| candidate == max && source.index() < c.source.index());
            if wins {
                max = candidate;
                chosen = Some(PathEdge {
                    id: e.id(),
                    source,
                    target: e.target(),
                    weight: *e.weight(),
                });
            }
        }

        cost.insert(v, max);
        if let Some(edge) = chosen {
            pred.insert(v, edge);
        }

        let improves = match best {
            None => max > 0.0,
            Some((b, best_cost)) => {
                max > best_cost || (max == best_cost && v.index() < b.index())
            }
        };
        if improves {
            best = Some((v, max));
        }
    }

    let Some((target, total_cost)) = best else {
        return CriticalPathResult::empty();
    };

    let mut edges = Vec::new();
    let mut current = target;
    while let Some(edge) = pred.get(&current) {
        edges.push(*edge);
        current = edge.source;
    }

    trace!(target = target.index(), total_cost, len = edges.len(), "critical path");

    CriticalPathResult { edges, total_cost }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
