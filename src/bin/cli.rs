//! Anchor Routes CLI - extract the route table of a source tree.

use anchor_routes::scan::collect_sources;
use anchor_routes::{ExtractConfig, Extractor, RouteTable};
use anyhow::Context;
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "anchor-routes")]
#[command(about = "Anchor Routes - HTTP route table from annotated controllers", long_about = None)]
struct Cli {
    /// Files or directories to scan (default: current directory)
    paths: Vec<PathBuf>,

    /// Extraction config (TOML). Defaults apply if the file does not exist.
    #[arg(short, long, default_value = "anchor-routes.toml")]
    config: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: Format,

    /// Exit with status 2 when any error diagnostic is reported
    #[arg(long)]
    strict: bool,

    /// Verbose logging (overridden by RUST_LOG)
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(table) => {
            if cli.strict && table.has_errors() {
                std::process::exit(2);
            }
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: &Cli) -> anyhow::Result<RouteTable> {
    let config = ExtractConfig::load(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;

    let roots: Vec<&Path> = if cli.paths.is_empty() {
        vec![Path::new(".")]
    } else {
        cli.paths.iter().map(PathBuf::as_path).collect()
    };

    let units = collect_sources(&roots);
    let table = Extractor::new(config).extract(&units);

    match cli.format {
        Format::Json => println!("{}", table.to_json()?),
        Format::Text => print_text(&table, units.len()),
    }
    Ok(table)
}

fn print_text(table: &RouteTable, files: usize) {
    if table.is_empty() {
        println!("No routes found in {} file(s).", files);
    } else {
        for route in table.routes() {
            println!("{:<7} {:<40} {}  [{}]", route.verb, route.path, route.handler, route.id);
        }
    }

    if !table.diagnostics().is_empty() {
        println!();
        for diagnostic in table.diagnostics() {
            println!("{}", diagnostic);
        }
    }

    println!();
    println!(
        "{} route(s), {} diagnostic(s), {} file(s)",
        table.len(),
        table.diagnostics().len(),
        files
    );
}
