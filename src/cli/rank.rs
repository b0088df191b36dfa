//! Rank command - build the import graph and print module centrality

use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use crate::graph::{CentralityMeasure, Granularity, GraphBuilder};
use crate::source::{GoListSource, ImportSource};

use super::Cli;

#[derive(Debug, Serialize)]
struct RankedModule<'a> {
    label: &'a str,
    score: f64,
}

pub fn run(cli: &Cli) -> Result<()> {
    let measure: CentralityMeasure = cli.measure.parse()?;

    let source = GoListSource::new();
    let packages = source
        .list_packages(&cli.root)
        .with_context(|| format!("failed to resolve {}", cli.root))?;

    let granularity = if cli.per_file {
        Granularity::File
    } else {
        Granularity::Package
    };

    let bar = ProgressBar::new(packages.len() as u64);
    bar.set_style(bar_style());
    let outcome = GraphBuilder::new(&source)
        .with_prefix(&cli.prefix)
        .with_granularity(granularity)
        .build_with_progress(
            &packages,
            Some(&|done, _total| bar.set_position(done as u64)),
        );
    bar.finish_and_clear();

    if !outcome.failures.is_empty() {
        eprintln!(
            "{} {} of {} packages could not be queried and contributed no edges",
            style("warning:").yellow().bold(),
            outcome.failures.len(),
            packages.len()
        );
    }

    let ranked = measure.compute(&outcome.graph);
    let shown = limit(&ranked, cli.num);

    match cli.format.as_str() {
        "json" => {
            let modules: Vec<RankedModule> = shown
                .iter()
                .map(|(label, score)| RankedModule {
                    label,
                    score: *score,
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&modules)?);
        }
        _ => {
            for (label, score) in shown {
                println!("{score:.6} {label}");
            }
        }
    }

    Ok(())
}

fn bar_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} packages")
        .expect("valid template")
        .progress_chars("█▓▒░  ")
}

/// Truncate the ranking for display. The first entry always prints; after
/// that the index may run up to `num` inclusive, so a positive `num` yields
/// `num + 1` entries. Non-positive `num` means everything.
fn limit(ranked: &[(String, f64)], num: i64) -> &[(String, f64)] {
    if num <= 0 {
        return ranked;
    }
    let cutoff = (num as usize).saturating_add(1).min(ranked.len());
    &ranked[..cutoff]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranked(n: usize) -> Vec<(String, f64)> {
        (0..n)
            .map(|i| (format!("pkg{i}"), 1.0 / (i + 1) as f64))
            .collect()
    }

    #[test]
    fn positive_limit_keeps_one_extra_entry() {
        let all = ranked(5);
        assert_eq!(limit(&all, 2).len(), 3);
    }

    #[test]
    fn limit_never_exceeds_available_entries() {
        let all = ranked(3);
        assert_eq!(limit(&all, 16).len(), 3);
    }

    #[test]
    fn non_positive_limit_keeps_everything() {
        let all = ranked(5);
        assert_eq!(limit(&all, 0).len(), 5);
        assert_eq!(limit(&all, -3).len(), 5);
    }

    #[test]
    fn text_lines_use_six_decimal_places() {
        let (label, score) = ("github.com/acme/app".to_string(), 0.25_f64);
        assert_eq!(format!("{score:.6} {label}"), "0.250000 github.com/acme/app");
    }
}
