//! godeps CLI - Go package dependency diagrams
//!
//! Clones a Go repository, scans its imports and renders the package
//! dependency graph with Graphviz.

use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "godeps")]
#[command(author = "godeps Contributors")]
#[command(version)]
#[command(about = "Draw the package dependency graph of a Go repository", long_about = None)]
pub struct Cli {
    /// Repository link (https://host/owner/repo), or a directory with --local
    pub location: String,

    /// Treat LOCATION as a local directory instead of cloning it
    #[arg(long)]
    pub local: bool,

    /// Branch to clone; repeat to set the fallback order (default: main, master)
    #[arg(short, long = "branch", value_name = "NAME")]
    pub branches: Vec<String>,

    /// SSH private key (default: ~/.ssh/id_rsa)
    #[arg(long, value_name = "PATH")]
    pub key: Option<PathBuf>,

    /// Graphviz output format
    #[arg(short, long, default_value = "pdf")]
    pub format: String,

    /// Also export the graph as JSON
    #[arg(long, value_name = "PATH")]
    pub json: Option<PathBuf>,

    /// Skip *_test.go files
    #[arg(long)]
    pub exclude_tests: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(tracing_subscriber::EnvFilter::new(filter))
        .init();

    if let Err(e) = commands::run(&cli) {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}
