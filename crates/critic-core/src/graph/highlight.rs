//! Edge weight summary of a critical path, used to scale highlighting.

use petgraph::graph::NodeIndex;

use crate::config::HighlightConfig;
use crate::graph::critical_path::CriticalPathResult;

/// Min, max and total edge weight over exactly the critical path's edges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HighlightSummary {
    pub min: f64,
    pub max: f64,
    pub total: f64,
    /// Target of the terminal edge: the module that finishes last.
    pub terminal: NodeIndex,
}

impl HighlightSummary {
    /// Summarize a critical path.
    ///
    /// Returns `None` for an empty path.
    #[must_use]
    pub fn of(path: &CriticalPathResult) -> Option<Self> {
        let first = path.edges.first()?;
        let mut summary = Self {
            min: first.weight,
            max: first.weight,
            total: 0.0,
            terminal: first.target,
        };
        for edge in &path.edges {
            summary.min = summary.min.min(edge.weight);
            summary.max = summary.max.max(edge.weight);
            summary.total += edge.weight;
        }
        Some(summary)
    }

    /// Total path duration in minutes.
    #[must_use]
    pub const fn total_minutes(&self) -> f64 {
        self.total / 60.0
    }

    /// Pen width for an edge of `weight` seconds, scaled linearly from
    /// `min_pen_width` at the cheapest path edge to `max_pen_width` at the
    /// most expensive one.
    ///
    /// A path whose edges all weigh the same draws at `min_pen_width`.
    #[must_use]
    pub fn pen_width(&self, weight: f64, config: &HighlightConfig) -> f64 {
        let spread = self.max - self.min;
        if spread <= 0.0 {
            return config.min_pen_width;
        }
        let span = config.max_pen_width - config.min_pen_width;
        span.mul_add((weight - self.min) / spread, config.min_pen_width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::critical_path::PathEdge;
    use petgraph::graph::EdgeIndex;

    fn edge(id: usize, source: usize, target: usize, weight: f64) -> PathEdge {
        PathEdge {
            id: EdgeIndex::new(id),
            source: NodeIndex::new(source),
            target: NodeIndex::new(target),
            weight,
        }
    }

    fn path(edges: Vec<PathEdge>) -> CriticalPathResult {
        let total_cost = edges.iter().map(|e| e.weight).sum();
        CriticalPathResult { edges, total_cost }
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn empty_path_has_no_summary() {
        assert!(HighlightSummary::of(&CriticalPathResult::empty()).is_none());
    }

    #[test]
    fn summary_covers_path_edges() {
        let summary = HighlightSummary::of(&path(vec![
            edge(2, 2, 3, 120.0),
            edge(1, 1, 2, 30.0),
            edge(0, 0, 1, 60.0),
        ]))
        .expect("non-empty");

        assert!(close(summary.min, 30.0));
        assert!(close(summary.max, 120.0));
        assert!(close(summary.total, 210.0));
        assert!(close(summary.total_minutes(), 3.5));
        assert_eq!(summary.terminal, NodeIndex::new(3));
    }

    #[test]
    fn pen_width_scales_linearly() {
        let summary =
            HighlightSummary::of(&path(vec![edge(1, 1, 2, 10.0), edge(0, 0, 1, 20.0)]))
                .expect("non-empty");
        let config = HighlightConfig::default();

        assert!(close(summary.pen_width(10.0, &config), 1.0));
        assert!(close(summary.pen_width(20.0, &config), 10.0));
        assert!(close(summary.pen_width(15.0, &config), 5.5));
    }

    #[test]
    fn pen_width_respects_configured_range() {
        let summary =
            HighlightSummary::of(&path(vec![edge(1, 1, 2, 0.0), edge(0, 0, 1, 4.0)]))
                .expect("non-empty");
        let config = HighlightConfig {
            min_pen_width: 2.0,
            max_pen_width: 4.0,
            ..HighlightConfig::default()
        };
        assert!(close(summary.pen_width(2.0, &config), 3.0));
    }

    #[test]
    fn uniform_weights_draw_at_minimum_width() {
        let summary =
            HighlightSummary::of(&path(vec![edge(1, 1, 2, 7.0), edge(0, 0, 1, 7.0)]))
                .expect("non-empty");
        let config = HighlightConfig::default();
        assert!(close(summary.pen_width(7.0, &config), config.min_pen_width));
    }
}
