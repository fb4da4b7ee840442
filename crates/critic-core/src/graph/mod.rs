//! Build graph construction, critical path analysis and export.
//!
//! # Overview
//!
//! The imported dependency topology is merged with per-module build
//! durations into a weighted DAG. Its most expensive chain, the critical
//! path, is what bounds the wall-clock time of a parallel Maven build.
//!
//! ## Pipeline
//!
//! ```text
//! depgraph DOT file
//!        ↓  dot::DependencyTopology::parse()
//! DependencyTopology (labels, "depends on" edges, acyclic)
//!        ↓  build::WeightedDag::build(&topology, &durations)
//! WeightedDag (+ root:root, edges weigh their source's duration)
//!        ↓  critical_path::compute_critical_path(dag.reversed())
//! CriticalPathResult (terminal edge first)
//!        ↓  highlight::HighlightSummary::of()
//! HighlightSummary (min / max / total, terminal module)
//!        ↓  export::DotExport::write_to()
//! annotated DOT in build order
//! ```
//!
//! ## Typical Usage
//!
//! ```rust,ignore
//! use critic_core::graph::{
//!     DependencyTopology, HighlightSummary, WeightedDag, compute_critical_path,
//! };
//!
//! let topology = DependencyTopology::parse(&dot_source)?;
//! let dag = WeightedDag::build(&topology, &durations)?;
//! let path = compute_critical_path(dag.reversed());
//! if let Some(summary) = HighlightSummary::of(&path) {
//!     println!("{} takes {:.2}min", dag.graph[summary.terminal], summary.total_minutes());
//! }
//! ```

pub mod build;
pub mod critical_path;
pub mod dot;
pub mod export;
pub mod highlight;

pub use build::WeightedDag;
pub use critical_path::{CriticalPathResult, PathEdge, compute_critical_path};
pub use dot::{DependencyTopology, load_topology};
pub use export::DotExport;
pub use highlight::HighlightSummary;
