//! Known-topology and property tests for the weighted DAG and its critical
//! path.
//!
//! Topologies are written as "depends on" edges, the way the dependency
//! graph plugin emits them. Expected paths are in build order.

use std::collections::HashMap;
use std::time::Duration;

use petgraph::Direction;
use petgraph::graph::NodeIndex;
use proptest::prelude::*;

use critic_core::graph::{
    DependencyTopology, HighlightSummary, WeightedDag, compute_critical_path,
};
use critic_core::{CriticConfig, CriticalPathAnalysis, Module, ModuleRegistry};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn registry(entries: &[(&str, u64)]) -> ModuleRegistry {
    entries
        .iter()
        .map(|(c, secs)| Module::with_duration(c, Duration::from_secs(*secs)).expect("valid"))
        .collect()
}

fn solve(edges: &[(&str, &str)], durations: &[(&str, u64)]) -> (WeightedDag, Vec<String>) {
    let topology = DependencyTopology::from_edges(&[], edges).expect("valid topology");
    let dag = WeightedDag::build(&topology, &registry(durations)).expect("built");
    let path = compute_critical_path(dag.reversed());
    let order = path
        .build_order()
        .map(|e| dag.graph[e.target].coordinates())
        .collect();
    (dag, order)
}

/// Longest path by exhaustive recursion over "depends on" edges.
fn brute_force_longest(dag: &WeightedDag) -> f64 {
    fn longest_from(
        dag: &WeightedDag,
        v: NodeIndex,
        memo: &mut HashMap<NodeIndex, f64>,
    ) -> f64 {
        if let Some(&cost) = memo.get(&v) {
            return cost;
        }
        let mut best = 0.0_f64;
        let mut edges = dag.graph.neighbors_directed(v, Direction::Outgoing).detach();
        while let Some((e, t)) = edges.next(&dag.graph) {
            best = best.max(dag.graph[e] + longest_from(dag, t, memo));
        }
        memo.insert(v, best);
        best
    }

    let mut memo = HashMap::new();
    dag.graph
        .node_indices()
        .map(|v| longest_from(dag, v, &mut memo))
        .fold(0.0, f64::max)
}

// ---------------------------------------------------------------------------
// Known topologies
// ---------------------------------------------------------------------------

#[test]
fn single_module_path_is_its_own_build() {
    let (_, order) = solve(&[], &[]);
    assert!(order.is_empty());

    let topology = DependencyTopology::from_edges(&["g:solo"], &[]).expect("valid");
    let dag = WeightedDag::build(&topology, &registry(&[("g:solo", 42)])).expect("built");
    let path = compute_critical_path(dag.reversed());
    assert_eq!(path.len(), 1);
    assert!((path.total_cost - 42.0).abs() < f64::EPSILON);
}

#[test]
fn linear_reactor_follows_every_module() {
    let (_, order) = solve(
        &[("g:web", "g:service"), ("g:service", "g:api")],
        &[("g:web", 10), ("g:service", 20), ("g:api", 30)],
    );
    assert_eq!(order, vec!["g:api", "g:service", "g:web"]);
}

#[test]
fn slow_branch_dominates_diamond() {
    // web → {fast, slow} → api
    let (_, order) = solve(
        &[
            ("g:web", "g:fast"),
            ("g:web", "g:slow"),
            ("g:fast", "g:api"),
            ("g:slow", "g:api"),
        ],
        &[("g:web", 5), ("g:fast", 1), ("g:slow", 100), ("g:api", 7)],
    );
    assert_eq!(order, vec!["g:api", "g:slow", "g:web"]);
}

#[test]
fn independent_slow_module_beats_long_cheap_chain() {
    let (_, order) = solve(
        &[("g:a", "g:b"), ("g:b", "g:c")],
        &[("g:a", 1), ("g:b", 1), ("g:c", 1), ("g:batch", 600)],
    );
    // g:batch has no edges in the topology, so it is absent from the graph.
    assert_eq!(order, vec!["g:c", "g:b", "g:a"]);

    let topology =
        DependencyTopology::from_edges(&["g:batch"], &[("g:a", "g:b"), ("g:b", "g:c")])
            .expect("valid");
    let dag = WeightedDag::build(
        &topology,
        &registry(&[("g:a", 1), ("g:b", 1), ("g:c", 1), ("g:batch", 600)]),
    )
    .expect("built");
    let path = compute_critical_path(dag.reversed());
    let summary = HighlightSummary::of(&path).expect("non-empty");
    assert_eq!(dag.graph[summary.terminal].coordinates(), "g:batch");
    assert!((summary.total - 600.0).abs() < f64::EPSILON);
}

#[test]
fn pipeline_is_deterministic() {
    let topology = DependencyTopology::from_edges(
        &[],
        &[("g:web", "g:api"), ("g:web", "g:ui"), ("g:api", "g:core"), ("g:ui", "g:core")],
    )
    .expect("valid");
    // api and ui tie; the result must not depend on iteration order.
    let durations = registry(&[("g:web", 3), ("g:api", 9), ("g:ui", 9), ("g:core", 4)]);
    let config = CriticConfig::default();

    let first = CriticalPathAnalysis::from_parts(&topology, &durations, &config).expect("first");
    let second = CriticalPathAnalysis::from_parts(&topology, &durations, &config).expect("second");

    assert_eq!(first.path, second.path);
    assert_eq!(first.summary, second.summary);
    assert_eq!(first.report(), second.report());

    let mut a = Vec::new();
    let mut b = Vec::new();
    first.render_dot(&mut a).expect("render");
    second.render_dot(&mut b).expect("render");
    assert_eq!(a, b);
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

/// Random acyclic build: `n` modules, "depends on" edges from lower to higher
/// index, and a duration per module.
fn arb_build() -> impl Strategy<Value = (usize, Vec<(usize, usize)>, Vec<u64>)> {
    (1usize..12).prop_flat_map(|n| {
        (
            Just(n),
            prop::collection::vec((0..n, 0..n), 0..n * 2),
            prop::collection::vec(0u64..600, n),
        )
    })
}

fn build_random(n: usize, pairs: &[(usize, usize)], secs: &[u64]) -> WeightedDag {
    let labels: Vec<String> = (0..n).map(|i| format!("g:m{i}")).collect();
    let nodes: Vec<&str> = labels.iter().map(String::as_str).collect();
    let edges: Vec<(&str, &str)> = pairs
        .iter()
        .filter(|(a, b)| a != b)
        .map(|&(a, b)| (nodes[a.min(b)], nodes[a.max(b)]))
        .collect();
    let topology = DependencyTopology::from_edges(&nodes, &edges).expect("acyclic by construction");
    let durations: ModuleRegistry = labels
        .iter()
        .zip(secs)
        .map(|(c, s)| Module::with_duration(c, Duration::from_secs(*s)).expect("valid"))
        .collect();
    WeightedDag::build(&topology, &durations).expect("built")
}

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(256))]

    #[test]
    fn root_is_added_once_and_only_receives(
        (n, pairs, secs) in arb_build()
    ) {
        let dag = build_random(n, &pairs, &secs);
        prop_assert_eq!(dag.node_count(), n + 1);
        prop_assert!(dag.graph.neighbors_directed(dag.root, Direction::Incoming).count() >= 1);
        prop_assert_eq!(dag.graph.neighbors_directed(dag.root, Direction::Outgoing).count(), 0);
    }

    #[test]
    fn path_is_connected_and_maximal(
        (n, pairs, secs) in arb_build()
    ) {
        let dag = build_random(n, &pairs, &secs);
        let path = compute_critical_path(dag.reversed());

        for window in path.edges.windows(2) {
            prop_assert_eq!(window[0].source, window[1].target);
        }
        let sum: f64 = path.edges.iter().map(|e| e.weight).sum();
        prop_assert!((sum - path.total_cost).abs() < 1e-6);
        prop_assert!((path.total_cost - brute_force_longest(&dag)).abs() < 1e-6);
    }

    #[test]
    fn solving_twice_is_identical(
        (n, pairs, secs) in arb_build()
    ) {
        let dag = build_random(n, &pairs, &secs);
        prop_assert_eq!(
            compute_critical_path(dag.reversed()),
            compute_critical_path(dag.reversed())
        );
    }
}
