//! CLI command implementation.

use crate::Cli;
use colored::Colorize;
use godeps_graph::{
    check_layout_tool, export_json, render, to_dot, write_dot, DotOptions, RenderOptions,
};
use godeps_source::{
    default_key_path, scan_tree, CloneOptions, ClonedTree, LocalTree, RepoLocation, ScanOptions,
    ScanResult, SourceTree,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tracing::debug;

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Runs one end-to-end pass: fetch, scan, render.
pub fn run(cli: &Cli) -> Result<()> {
    let render_options = RenderOptions::with_format(&cli.format);
    check_layout_tool(&render_options.program)?;
    debug!("Render options: {:?}", render_options);

    let scan_options = ScanOptions {
        exclude_tests: cli.exclude_tests,
    };

    let result = if cli.local {
        let tree = LocalTree::open(&cli.location)?;
        println!("{} Scanning {}", "•".blue(), tree.root().display());
        scan_tree(&tree, &scan_options)?
    } else {
        let location = RepoLocation::parse(&cli.location)?;
        let tree = fetch(&location, clone_options(cli)?)?;
        // the checkout is removed when `tree` drops at the end of this block
        scan_tree(&tree, &scan_options)?
    };

    print_summary(&result);

    let dot = to_dot(
        &result.graph,
        &DotOptions {
            module_root: Some(result.module_root.clone()),
            ..DotOptions::default()
        },
    );
    write_dot(&render_options.dot_file, &dot)?;

    if let Some(json_path) = &cli.json {
        export_json(&result.graph, Some(&result.module_root), json_path)?;
        println!("{} Exported to {}", "✓".green(), json_path.display());
    }

    render(&render_options)?;
    println!(
        "{} Wrote {} and {}",
        "✓".green(),
        render_options.dot_file.display().to_string().cyan(),
        render_options.output_file.display().to_string().cyan()
    );

    Ok(())
}

fn clone_options(cli: &Cli) -> Result<CloneOptions> {
    let key_path = match &cli.key {
        Some(path) => path.clone(),
        None => default_key_path()?,
    };

    let mut options = CloneOptions::with_key(key_path);
    if !cli.branches.is_empty() {
        options.branches = cli.branches.clone();
    }
    Ok(options)
}

fn fetch(location: &RepoLocation, options: CloneOptions) -> Result<ClonedTree> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner.set_message(format!("Cloning {}...", location));

    let fetched = ClonedTree::fetch(location, &options);
    spinner.finish_and_clear();

    let tree = fetched?;
    println!(
        "{} Cloned {} ({})",
        "✓".green(),
        tree.url().cyan(),
        tree.branch()
    );
    Ok(tree)
}

fn print_summary(result: &ScanResult) {
    let stats = result.graph.stats();
    println!(
        "{} Scanned {} files in {} packages of {} ({} nodes, {} edges) in {}ms",
        "✓".green(),
        result.files_scanned.to_string().cyan(),
        result.packages.to_string().cyan(),
        result.module_root.yellow(),
        stats.node_count,
        stats.edge_count,
        result.duration_ms
    );
}
