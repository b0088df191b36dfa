//! Modrank - graph-powered module importance ranking CLI
//!
//! A fast, local-first tool that builds an import graph for a package
//! pattern and ranks modules by PageRank centrality.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    // Parse CLI args and run
    let cli = modrank::cli::Cli::parse();
    modrank::cli::run(cli)
}
