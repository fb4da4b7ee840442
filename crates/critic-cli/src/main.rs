#![forbid(unsafe_code)]

mod output;

use clap::Parser;
use critic_core::{AnalysisInputs, CriticalPathAnalysis, CriticalPathReport, load_config};
use output::{
    CliError, OutputMode, pretty_kv, pretty_rule, pretty_section, render_error, render_mode,
};
use std::env;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "critic: critical path of a Maven reactor build",
    long_about = "Combine a depgraph-maven-plugin dependency graph with the reactor summary of a \
                  build log and write the graph with its critical path highlighted.",
    after_help = "EXAMPLES:\n    # Highlight the critical path of the last build\n    critic -d target/dependency-graph.dot -b build.log -a artifacts.csv -o critical.dot\n\n    # Emit machine-readable output\n    critic -d deps.dot -b build.log -a artifacts.csv -o critical.dot --json"
)]
struct Cli {
    /// DOT dependency graph produced by depgraph-maven-plugin.
    #[arg(short = 'd', long, value_name = "FILE")]
    dependency_graph: PathBuf,

    /// Maven build log containing the reactor summary.
    #[arg(short = 'b', long, value_name = "FILE")]
    build_log: PathBuf,

    /// CSV mapping reactor project names to `groupId:artifactId`.
    #[arg(short = 'a', long, value_name = "FILE")]
    artifact_mapping: PathBuf,

    /// Where to write the annotated DOT graph.
    #[arg(short = 'o', long, value_name = "FILE")]
    output: PathBuf,

    /// Config file (defaults to `critic.toml` in the working directory).
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum)]
    format: Option<OutputMode>,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, hide = true)]
    json: bool,

    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn inputs(&self) -> AnalysisInputs {
        AnalysisInputs {
            dependency_graph: self.dependency_graph.clone(),
            build_log: self.build_log.clone(),
            artifact_mapping: self.artifact_mapping.clone(),
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("CRITIC_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "critic=debug,info"
        } else {
            "critic=info,warn"
        })
    });

    let format = env::var("CRITIC_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(io::stderr))
                .init();
        }
    }
}

/// Run the analysis, write the annotated graph and print the result.
fn run(cli: &Cli, mode: OutputMode) -> anyhow::Result<()> {
    let project_root = env::current_dir()?;
    let config = load_config(cli.config.as_deref(), &project_root)?;

    let analysis = CriticalPathAnalysis::run(&cli.inputs(), &config)?;
    let written = analysis.write_output(&cli.output)?;
    if written {
        info!(path = %cli.output.display(), "wrote annotated graph");
    } else {
        warn!("no critical path found; nothing written");
    }

    let report = analysis.report();
    render_mode(mode, &report, write_text, write_pretty)
}

fn write_text(report: &CriticalPathReport, w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "{}", report.headline)
}

fn write_pretty(report: &CriticalPathReport, w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "{}", report.headline)?;
    if report.path.is_empty() {
        return Ok(());
    }

    writeln!(w)?;
    pretty_section(w, "Critical path")?;
    for (i, step) in report.path.iter().enumerate() {
        writeln!(
            w,
            "{:>3}. {:<52} {:>9.2}s",
            i + 1,
            step.module,
            step.seconds
        )?;
    }
    pretty_rule(w)?;
    pretty_kv(w, "Modules", report.module_count.to_string())?;
    pretty_kv(w, "Total", format!("{:.2}min", report.total_minutes))?;
    if let (Some(min), Some(max)) = (report.min_edge_seconds, report.max_edge_seconds) {
        pretty_kv(w, "Step range", format!("{min:.2}s .. {max:.2}s"))?;
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mode = output::resolve_output_mode(cli.format, cli.json);

    if let Err(err) = run(&cli, mode) {
        render_error(mode, &CliError::from(&err))?;
        std::process::exit(1);
    }
    Ok(())
}
