//! Annotated DOT export of the solved build graph.
//!
//! The written graph is the build-order view: every stored "depends on" edge
//! `A → B` is emitted as `B -> A`. Vertices and edges are written in index
//! order with a fixed attribute order, so identical inputs produce
//! byte-identical files.

use std::io::{self, Write};

use crate::config::HighlightConfig;
use crate::graph::build::WeightedDag;
use crate::graph::critical_path::CriticalPathResult;
use crate::graph::highlight::HighlightSummary;

const VERTEX_FONT_SIZE: u32 = 16;
const EDGE_FONT_SIZE: u32 = 15;

/// Everything needed to render one annotated graph.
#[derive(Debug, Clone, Copy)]
pub struct DotExport<'a> {
    pub dag: &'a WeightedDag,
    pub path: &'a CriticalPathResult,
    pub summary: Option<&'a HighlightSummary>,
    pub highlight: &'a HighlightConfig,
    /// Graph id, e.g. `maven build order`.
    pub graph_name: &'a str,
    /// Graph-level `label`, usually the run's headline.
    pub label: &'a str,
}

impl DotExport<'_> {
    /// Write the DOT document.
    ///
    /// # Errors
    ///
    /// Returns any error from the underlying writer.
    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "digraph {} {{", quote(self.graph_name))?;
        writeln!(out, "  label={};", quote(self.label))?;

        for idx in self.dag.graph.node_indices() {
            let module = &self.dag.graph[idx];
            writeln!(
                out,
                "  {} [label={}, tooltip={}, fontsize={VERTEX_FONT_SIZE}, shape=box, style=rounded];",
                quote(&module.coordinates()),
                quote(module.artifact_id()),
                quote(&module.to_string()),
            )?;
        }

        for edge in self.dag.graph.edge_indices() {
            let Some((dependent, dependency)) = self.dag.graph.edge_endpoints(edge) else {
                continue;
            };
            let weight = self.dag.graph[edge];
            write!(
                out,
                "  {} -> {} [weight={weight}, label={}, fontsize={EDGE_FONT_SIZE}",
                quote(&self.dag.graph[dependency].coordinates()),
                quote(&self.dag.graph[dependent].coordinates()),
                quote(&format!("{:.2}min", weight / 60.0)),
            )?;
            if self.path.contains(edge) {
                let pen_width = self
                    .summary
                    .map_or(self.highlight.min_pen_width, |s| s.pen_width(weight, self.highlight));
                write!(
                    out,
                    ", penwidth={pen_width:.3}, color={}",
                    quote(&self.highlight.color)
                )?;
            }
            writeln!(out, "];")?;
        }

        writeln!(out, "}}")
    }

    /// Render the DOT document into a string.
    #[must_use]
    pub fn to_dot_string(&self) -> String {
        let mut buf = Vec::new();
        // Writing into a Vec cannot fail.
        let _ = self.write_to(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    }
}

/// Quote a DOT identifier, escaping backslashes, quotes and newlines.
fn quote(s: &str) -> String {
    let escaped = s
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n");
    format!("\"{escaped}\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::critical_path::compute_critical_path;
    use crate::graph::dot::DependencyTopology;
    use crate::module::{Module, ModuleRegistry};
    use std::time::Duration;

    fn solved() -> (WeightedDag, CriticalPathResult) {
        // web depends on api and commons; api depends on commons.
        let topology = DependencyTopology::from_edges(
            &[],
            &[("g:web", "g:api"), ("g:web", "g:commons"), ("g:api", "g:commons")],
        )
        .expect("valid");
        let durations: ModuleRegistry = [("g:web", 30), ("g:api", 120), ("g:commons", 6)]
            .iter()
            .map(|(c, s)| Module::with_duration(c, Duration::from_secs(*s)).expect("valid"))
            .collect();
        let dag = WeightedDag::build(&topology, &durations).expect("built");
        let path = compute_critical_path(dag.reversed());
        (dag, path)
    }

    fn render(dag: &WeightedDag, path: &CriticalPathResult) -> String {
        let summary = HighlightSummary::of(path);
        let highlight = HighlightConfig::default();
        DotExport {
            dag,
            path,
            summary: summary.as_ref(),
            highlight: &highlight,
            graph_name: "maven build order",
            label: "Maven build order - test",
        }
        .to_dot_string()
    }

    #[test]
    fn quote_escapes_special_characters() {
        assert_eq!(quote("plain"), "\"plain\"");
        assert_eq!(quote("a\"b"), "\"a\\\"b\"");
        assert_eq!(quote("a\\b"), "\"a\\\\b\"");
        assert_eq!(quote("a\nb"), "\"a\\nb\"");
    }

    #[test]
    fn header_and_label_come_first() {
        let (dag, path) = solved();
        let dot = render(&dag, &path);
        let mut lines = dot.lines();
        assert_eq!(lines.next(), Some("digraph \"maven build order\" {"));
        assert_eq!(lines.next(), Some("  label=\"Maven build order - test\";"));
        assert!(dot.ends_with("}\n"));
    }

    #[test]
    fn vertices_carry_display_attributes() {
        let (dag, path) = solved();
        let dot = render(&dag, &path);
        assert!(dot.contains(
            "  \"g:api\" [label=\"api\", tooltip=\"g:api[02:00 min]\", fontsize=16, shape=box, style=rounded];"
        ));
        assert!(dot.contains("\"root:root\" [label=\"root\", tooltip=\"root:root\""));
    }

    #[test]
    fn edges_are_written_in_build_order() {
        let (dag, path) = solved();
        let dot = render(&dag, &path);
        // api depends on commons, so commons is built first.
        assert!(dot.contains("\"g:commons\" -> \"g:api\" [weight=120, label=\"2.00min\""));
        assert!(dot.contains("\"root:root\" -> \"g:commons\" [weight=6, label=\"0.10min\""));
        assert!(!dot.contains("\"g:api\" -> \"g:commons\""));
    }

    #[test]
    fn only_critical_edges_are_highlighted() {
        let (dag, path) = solved();
        let dot = render(&dag, &path);

        // Critical path: root -> commons -> api -> web.
        assert_eq!(path.len(), 3);
        assert_eq!(dot.matches("color=\"#b22800\"").count(), 3);
        assert!(dot.contains(
            "\"g:api\" -> \"g:web\" [weight=30, label=\"0.50min\", fontsize=15, penwidth=2.895, color=\"#b22800\"];"
        ));
        assert!(dot.contains(
            "\"g:commons\" -> \"g:web\" [weight=30, label=\"0.50min\", fontsize=15];"
        ));
    }

    #[test]
    fn rendering_is_deterministic() {
        let (dag, path) = solved();
        assert_eq!(render(&dag, &path), render(&dag, &path));
    }
}
