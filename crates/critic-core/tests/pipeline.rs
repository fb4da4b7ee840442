//! File-based end-to-end runs of the analysis pipeline.

use std::path::Path;

use tempfile::TempDir;

use critic_core::config::parse_config;
use critic_core::{AnalysisInputs, CriticConfig, CriticError, CriticalPathAnalysis, ErrorCode};

const DEPGRAPH: &str = r#"digraph "shop" {
  node [shape="box",style="rounded",fontname="Helvetica",fontsize="14"]
  edge [fontsize="10",fontname="Helvetica"]

  // Node Definitions:
  "com.example:shop-commons:jar"[label=<shop-commons>]
  "com.example:shop-api:jar"[label=<shop-api>]
  "com.example:shop-web:war"[label=<shop-web>]

  // Edge Definitions:
  "com.example:shop-api:jar" -> "com.example:shop-commons:jar"
  "com.example:shop-web:war" -> "com.example:shop-api:jar"
  "com.example:shop-web:war" -> "com.example:shop-commons:jar"
}
"#;

const MAPPING: &str = "\
Shop Commons,com.example:shop-commons
Shop API,com.example:shop-api
Shop Web,com.example:shop-web
";

const BUILD_LOG: &str = "\
[INFO] Scanning for projects...
[INFO] Shop Commons ....................................... SUCCESS [ 9.000 s]
[INFO] ------------------------------------------------------------------------
[INFO] Reactor Summary for Shop 1.0-SNAPSHOT:
[INFO]
[INFO] Shop Commons ....................................... SUCCESS [  0.980 s]
[INFO] Shop API ........................................... SUCCESS [03:07 min]
[INFO] Shop Web ........................................... SUCCESS [ 45.020 s]
[INFO] ------------------------------------------------------------------------
[INFO] BUILD SUCCESS
[INFO] Shop Web ........................................... SUCCESS [59:59 min]
";

fn write_inputs(dir: &TempDir, depgraph: &str, mapping: &str, log: &str) -> AnalysisInputs {
    let write = |name: &str, content: &str| {
        let path = dir.path().join(name);
        std::fs::write(&path, content).expect("write fixture");
        path
    };
    AnalysisInputs {
        dependency_graph: write("depgraph.dot", depgraph),
        build_log: write("build.log", log),
        artifact_mapping: write("mapping.csv", mapping),
    }
}

fn critic_error(err: &anyhow::Error) -> &CriticError {
    err.downcast_ref::<CriticError>()
        .unwrap_or_else(|| panic!("expected CriticError in chain, got {err:#}"))
}

fn run(inputs: &AnalysisInputs) -> anyhow::Result<CriticalPathAnalysis> {
    CriticalPathAnalysis::run(inputs, &CriticConfig::default())
}

fn read(path: &Path) -> String {
    std::fs::read_to_string(path).expect("read output")
}

#[test]
fn analyzes_reactor_build() {
    let dir = tempfile::tempdir().expect("tempdir");
    let inputs = write_inputs(&dir, DEPGRAPH, MAPPING, BUILD_LOG);

    let analysis = run(&inputs).expect("analysis");

    // Whole seconds: 0 + 187 + 45 = 232. The zero-weight commons edge does
    // not start the path.
    assert_eq!(
        analysis.headline(),
        "Maven build order - critical path ends at com.example:shop-web[45.020 s] and takes 3.87min"
    );

    let report = analysis.report();
    let modules: Vec<&str> = report.path.iter().map(|s| s.module.as_str()).collect();
    assert_eq!(modules, vec!["com.example:shop-api", "com.example:shop-web"]);
    assert!((report.total_seconds - 232.0).abs() < f64::EPSILON);
    assert_eq!(report.module_count, 3);
}

#[test]
fn writes_annotated_graph() {
    let dir = tempfile::tempdir().expect("tempdir");
    let inputs = write_inputs(&dir, DEPGRAPH, MAPPING, BUILD_LOG);
    let out = dir.path().join("critical.dot");

    let analysis = run(&inputs).expect("analysis");
    assert!(analysis.write_output(&out).expect("write"));

    let dot = read(&out);
    assert!(dot.starts_with("digraph \"maven build order\" {\n"));
    assert!(dot.contains(
        "\"com.example:shop-api\" [label=\"shop-api\", tooltip=\"com.example:shop-api[03:07 min]\""
    ));
    assert!(dot.contains("\"com.example:shop-api\" -> \"com.example:shop-web\" [weight=45,"));
    assert_eq!(dot.matches("color=\"#b22800\"").count(), 2);
}

#[test]
fn configured_markers_select_window() {
    let dir = tempfile::tempdir().expect("tempdir");
    let log = "\
== timings ==
[INFO] Shop Commons ....................................... SUCCESS [  1.000 s]
[INFO] Shop API ........................................... SUCCESS [  2.000 s]
[INFO] Shop Web ........................................... SUCCESS [  3.000 s]
== end ==
";
    let inputs = write_inputs(&dir, DEPGRAPH, MAPPING, log);
    let config = parse_config(
        r#"
        [reactor]
        start_marker = "== timings =="
        end_marker = "== end =="

        [output]
        title = "Shop"
        "#,
    )
    .expect("config");

    let analysis = CriticalPathAnalysis::run(&inputs, &config).expect("analysis");
    assert_eq!(
        analysis.headline(),
        "Shop - critical path ends at com.example:shop-web[3.000 s] and takes 0.10min"
    );
}

#[test]
fn missing_durations_fail_with_full_list() {
    let dir = tempfile::tempdir().expect("tempdir");
    let log = "\
[INFO] Reactor Summary:
[INFO] Shop Commons ....................................... SUCCESS [  0.980 s]
[INFO] BUILD FAILURE
";
    let inputs = write_inputs(&dir, DEPGRAPH, MAPPING, log);

    let err = run(&inputs).expect_err("missing durations");
    let critic = critic_error(&err);
    assert_eq!(critic.error_code(), ErrorCode::MissingBuildDuration);

    let message = critic.to_string();
    assert!(message.contains("com.example:shop-api"));
    assert!(message.contains("com.example:shop-web"));
    assert!(!message.contains("shop-commons"));
}

#[test]
fn unknown_module_name_is_fatal() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mapping = "Shop Commons,com.example:shop-commons\n";
    let inputs = write_inputs(&dir, DEPGRAPH, mapping, BUILD_LOG);

    let err = run(&inputs).expect_err("unknown name");
    assert_eq!(critic_error(&err).error_code(), ErrorCode::UnknownModuleName);
}

#[test]
fn cyclic_dependency_graph_is_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let depgraph = r#"digraph {
  "com.example:shop-api" -> "com.example:shop-web"
  "com.example:shop-web" -> "com.example:shop-api"
}"#;
    let inputs = write_inputs(&dir, depgraph, MAPPING, BUILD_LOG);

    let err = run(&inputs).expect_err("cycle");
    assert_eq!(critic_error(&err).error_code(), ErrorCode::CyclicDependencyGraph);
}

#[test]
fn all_zero_durations_write_nothing() {
    let dir = tempfile::tempdir().expect("tempdir");
    let log = "\
[INFO] Reactor Summary:
[INFO] Shop Commons ....................................... SUCCESS [  0.000 s]
[INFO] Shop API ........................................... SUCCESS [  0.000 s]
[INFO] Shop Web ........................................... SUCCESS [  0.000 s]
[INFO] BUILD SUCCESS
";
    let inputs = write_inputs(&dir, DEPGRAPH, MAPPING, log);
    let out = dir.path().join("critical.dot");

    let analysis = run(&inputs).expect("analysis");
    assert_eq!(analysis.headline(), "Maven build order - no critical path found");
    assert!(!analysis.write_output(&out).expect("write"));
    assert!(!out.exists());
}

#[test]
fn sub_second_builds_have_no_critical_path() {
    let dir = tempfile::tempdir().expect("tempdir");
    let log = "\
[INFO] Reactor Summary:
[INFO] Shop Commons ....................................... SUCCESS [  0.980 s]
[INFO] Shop API ........................................... SUCCESS [  0.500 s]
[INFO] Shop Web ........................................... SUCCESS [  0.999 s]
[INFO] BUILD SUCCESS
";
    let inputs = write_inputs(&dir, DEPGRAPH, MAPPING, log);

    let analysis = run(&inputs).expect("analysis");
    assert!(analysis.path.is_empty());
    assert_eq!(analysis.headline(), "Maven build order - no critical path found");
}

#[test]
fn missing_input_file_names_the_path() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut inputs = write_inputs(&dir, DEPGRAPH, MAPPING, BUILD_LOG);
    inputs.dependency_graph = dir.path().join("absent.dot");

    let err = run(&inputs).expect_err("missing file");
    assert!(format!("{err:#}").contains("absent.dot"));
}
