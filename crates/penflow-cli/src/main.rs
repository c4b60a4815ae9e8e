//! `penflow` - evaluate a graph document into plotter strokes

mod config;
mod svg;

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use penflow_engine::{validate_graph, NodeRegistry, PlotGraph};
use penflow_nodes::{execute_flow, FlowResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// The full flow result as JSON
    Json,
    /// An SVG preview of the strokes
    Svg,
}

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Graph document to evaluate
    #[arg(required_unless_present = "list_nodes")]
    graph: Option<PathBuf>,

    /// Engine configuration (JSON); defaults to the per-user config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Json)]
    format: Format,

    /// Write to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the built-in node kinds and exit
    #[arg(long)]
    list_nodes: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let args = Args::parse();
    if args.list_nodes {
        return emit(&list_nodes(), args.output.as_deref());
    }
    let Some(graph_path) = args.graph.as_deref() else {
        bail!("a graph document is required");
    };

    let graph = load_graph(graph_path)?;
    let config = config::load_config(args.config.as_deref())?;
    let registry = NodeRegistry::with_builtins();
    for problem in validate_graph(&graph, Some(&registry)) {
        log::warn!("{}", problem);
    }

    let result = execute_flow(&graph, None, &config);
    let rendered = render(&result, args.format)?;
    emit(&rendered, args.output.as_deref())?;

    match result.error {
        Some(error) => bail!("evaluation failed: {}", error),
        None => Ok(()),
    }
}

fn load_graph(path: &Path) -> Result<PlotGraph> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read graph {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Invalid graph {}", path.display()))
}

fn render(result: &FlowResult, format: Format) -> Result<String> {
    Ok(match format {
        Format::Json => serde_json::to_string_pretty(result)? + "\n",
        Format::Svg => svg::render_svg(&result.paths),
    })
}

fn list_nodes() -> String {
    let registry = NodeRegistry::with_builtins();
    let mut metadata = registry.all_metadata();
    metadata.sort_by(|a, b| a.node_type.cmp(&b.node_type));
    metadata
        .iter()
        .map(|m| format!("{:<10} {}\n", m.node_type, m.description))
        .collect()
}

fn emit(text: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => std::fs::write(path, text)
            .with_context(|| format!("Failed to write {}", path.display())),
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(text.as_bytes())?;
            Ok(stdout.flush()?)
        }
    }
}
