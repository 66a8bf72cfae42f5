//! osgjs CLI
//!
//! Command-line interface for converting scene descriptions to osgjs
//! documents and inspecting them.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};

use osgjs_export::{writer::shared_objects, ExportOptions, Exporter};
use osgjs_scene::load_scene;

/// osgjs - scene graph to osgjs JSON exporter
#[derive(Parser)]
#[command(name = "osgjs")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Output format for structured data
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {s}")),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a scene description to an osgjs document
    Export(ExportArgs),

    /// Show statistics about a scene description
    Inspect(InspectArgs),
}

#[derive(Args)]
struct ExportArgs {
    /// Scene description (JSON)
    #[arg(short, long)]
    input: PathBuf,

    /// Output document; defaults to the input path with an .osgjs extension.
    /// Use "-" for standard output.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Exporter option string, e.g. "enableWireframe triStripCacheSize=24"
    #[arg(short = 'O', long = "options", default_value = "")]
    options: String,

    /// Write compact JSON instead of pretty-printed
    #[arg(long)]
    compact: bool,
}

#[derive(Args)]
struct InspectArgs {
    /// Scene description (JSON)
    #[arg(short, long)]
    input: PathBuf,
}

fn setup_logging(verbosity: u8) {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(verbosity >= 2)
        .with_file(verbosity >= 3)
        .with_line_number(verbosity >= 3)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match cli.command {
        Commands::Export(args) => cmd_export(args),
        Commands::Inspect(args) => cmd_inspect(args, cli.format),
    }
}

fn cmd_export(args: ExportArgs) -> Result<()> {
    let options = ExportOptions::parse(&args.options)
        .context("Invalid exporter options")?
        .with_pretty(!args.compact);

    info!("Loading scene: {:?}", args.input);
    let root = load_scene(&args.input).context("Failed to load scene description")?;

    let mut exporter = Exporter::with_options(options);
    let output = args
        .output
        .unwrap_or_else(|| args.input.with_extension(osgjs_export::pipeline::EXTENSION));

    if output.as_os_str() == "-" {
        let stdout = io::stdout();
        let mut lock = stdout.lock();
        exporter
            .write_node(&root, &mut lock)
            .context("Failed to export scene")?;
        lock.flush()?;
    } else {
        exporter
            .write_file(&root, &output)
            .with_context(|| format!("Failed to export scene to {}", output.display()))?;
        println!("Exported {} -> {}", args.input.display(), output.display());
    }

    Ok(())
}

fn cmd_inspect(args: InspectArgs, format: OutputFormat) -> Result<()> {
    let root = load_scene(&args.input).context("Failed to load scene description")?;
    let stats = root.stats();
    let document = osgjs_export::encode(&root).context("Scene cannot be encoded")?;
    let shared = shared_objects(&document);

    match format {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "scene": args.input,
                "stats": stats,
                "shared_objects": shared,
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Text => {
            println!("Scene: {}", args.input.display());
            println!("============================================");
            println!("  Nodes:              {:>12}", stats.nodes);
            println!("  Geometries:         {:>12}", stats.geometries);
            println!("  Vertices:           {:>12}", stats.vertices);
            println!("  Primitive sets:     {:>12}", stats.primitive_sets);
            println!("  State sets:         {:>12}", stats.state_sets);
            println!("  Update callbacks:   {:>12}", stats.update_callbacks);
            println!("  Shared references:  {:>12}", stats.shared_references);
            println!("  Shared objects:     {:>12}", shared);
        }
    }

    Ok(())
}
