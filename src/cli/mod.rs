//! CLI command definitions and handlers

mod rank;

use anyhow::Result;
use clap::Parser;

/// Modrank - module importance ranking
///
/// Builds the import graph for a package pattern and ranks modules by
/// PageRank centrality: modules imported by many important modules rank
/// highest.
#[derive(Parser, Debug)]
#[command(name = "modrank")]
#[command(
    version,
    about = "Rank module importance via PageRank centrality over the import graph",
    after_help = "\
Examples:
  modrank ./...                        Rank every package under the current module
  modrank ./... -p github.com/acme     Only count imports under an organization
  modrank ./... -n 0                   Show every ranked module
  modrank ./... --per-file             Weight edges by per-file import counts
  modrank ./... --format json          JSON output for scripting"
)]
pub struct Cli {
    /// Package pattern to rank (e.g. ./... or github.com/acme/app/...)
    pub root: String,

    /// Keep only imports starting with this prefix (empty = keep everything)
    #[arg(long, short = 'p', default_value = "")]
    pub prefix: String,

    /// Top number of modules to show, all if non-positive
    #[arg(long, short = 'n', default_value_t = 16)]
    pub num: i64,

    /// Query each package's source files individually instead of the
    /// package as a single unit
    #[arg(long)]
    pub per_file: bool,

    /// Centrality measure used for ranking
    #[arg(long, default_value = "pagerank")]
    pub measure: String,

    /// Output format: text or json
    #[arg(long, short = 'f', default_value = "text", value_parser = ["text", "json"])]
    pub format: String,
}

pub fn run(cli: Cli) -> Result<()> {
    rank::run(&cli)
}
