//! Concurrent import-graph construction
//!
//! Producer-consumer pipeline over crossbeam channels that SEPARATES:
//! - Import queries (blocking toolchain calls, parallelizable) - worker threads
//! - Graph mutation (stateful, sequential) - the calling thread
//!
//! ```text
//!                     ┌─────────────┐
//!                     │   Producer  │  feeds package names
//!                     └──────┬──────┘
//!                            │ bounded channel
//!            ┌───────────────┼───────────────┐
//!            ▼               ▼               ▼
//!     ┌──────────┐    ┌──────────┐    ┌──────────┐
//!     │ Worker 1 │    │ Worker 2 │    │ Worker N │  query imports in parallel
//!     └────┬─────┘    └────┬─────┘    └────┬─────┘
//!          │               │               │
//!          └───────────────┼───────────────┘
//!                          │ bounded channel (per-package edge batches)
//!                          ▼
//!                   ┌──────────────┐
//!                   │   Consumer   │  merges batches into the graph
//!                   └──────────────┘
//! ```
//!
//! The single consumer makes graph mutation mutually exclusive without a
//! lock, and batch interleaving across packages does not matter because edge
//! accumulation is commutative. A package whose query fails contributes no
//! edges; the failure is logged and collected, and the build carries on.

use crossbeam_channel::bounded;
use std::thread;
use tracing::warn;

use crate::source::{ImportSource, ResolutionError};

use super::ImportGraph;

/// Upper bound on packages with an in-flight query phase.
pub const MAX_IN_FLIGHT: usize = 32;

/// Whether a package is queried as a single unit or expanded into its
/// source files, each queried independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    Package,
    File,
}

/// A package whose query phase failed and contributed no edges.
#[derive(Debug)]
pub struct BuildFailure {
    pub package: String,
    pub error: ResolutionError,
}

/// A finished build: the graph plus the packages that fell out of it.
///
/// `failures` is the explicit partial-result signal; the graph is complete
/// with respect to every package not listed there.
#[derive(Debug)]
pub struct BuildOutcome {
    pub graph: ImportGraph,
    pub failures: Vec<BuildFailure>,
}

enum TaskResult {
    Batch { package: String, imports: Vec<String> },
    Failed(BuildFailure),
}

/// Builds an [`ImportGraph`] by fanning package queries out to worker
/// threads and merging the results on the calling thread.
pub struct GraphBuilder<'a> {
    source: &'a dyn ImportSource,
    prefix: String,
    granularity: Granularity,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(source: &'a dyn ImportSource) -> Self {
        Self {
            source,
            prefix: String::new(),
            granularity: Granularity::Package,
        }
    }

    /// Keep only imports starting with this prefix.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_granularity(mut self, granularity: Granularity) -> Self {
        self.granularity = granularity;
        self
    }

    /// Build the graph for the given packages. Returns once every package
    /// has been queried and merged (or recorded as a failure).
    pub fn build(&self, packages: &[String]) -> BuildOutcome {
        self.build_with_progress(packages, None)
    }

    /// [`build`](Self::build) with a `(completed, total)` callback invoked
    /// after each package is merged or recorded as failed.
    pub fn build_with_progress(
        &self,
        packages: &[String],
        progress: Option<&(dyn Fn(usize, usize) + Sync)>,
    ) -> BuildOutcome {
        let total = packages.len();
        let mut graph = ImportGraph::new();
        let mut failures = Vec::new();
        if total == 0 {
            return BuildOutcome { graph, failures };
        }

        let workers = MAX_IN_FLIGHT.min(total);
        let queue: Vec<String> = packages.to_vec();

        let (pkg_tx, pkg_rx) = bounded::<String>(workers);
        let (batch_tx, batch_rx) = bounded::<TaskResult>(workers);

        thread::scope(|s| {
            // Producer: feeds packages, blocking when workers are saturated.
            s.spawn(move || {
                for package in queue {
                    if pkg_tx.send(package).is_err() {
                        break;
                    }
                }
            });

            // Workers: query phase only, no graph access.
            for _ in 0..workers {
                let rx = pkg_rx.clone();
                let tx = batch_tx.clone();
                s.spawn(move || {
                    for package in rx {
                        let result = match self.collect_imports(&package) {
                            Ok(imports) => TaskResult::Batch { package, imports },
                            Err(error) => TaskResult::Failed(BuildFailure { package, error }),
                        };
                        if tx.send(result).is_err() {
                            break;
                        }
                    }
                });
            }

            // Drop our clones so the consumer loop ends when workers finish.
            drop(pkg_rx);
            drop(batch_tx);

            // Consumer: the only graph writer.
            let mut done = 0usize;
            for result in batch_rx {
                match result {
                    TaskResult::Batch { package, imports } => {
                        for import in &imports {
                            graph.update_edge(&package, import);
                        }
                    }
                    TaskResult::Failed(failure) => {
                        warn!(
                            package = %failure.package,
                            error = %failure.error,
                            "package skipped, no edges contributed"
                        );
                        failures.push(failure);
                    }
                }
                done += 1;
                if let Some(cb) = progress {
                    cb(done, total);
                }
            }
        });

        BuildOutcome { graph, failures }
    }

    /// Query phase for one package: resolve targets, then concatenate their
    /// imports in target order. Duplicates across targets are preserved so
    /// that merging accumulates edge weight.
    fn collect_imports(&self, package: &str) -> Result<Vec<String>, ResolutionError> {
        let targets: Vec<String> = match self.granularity {
            Granularity::Package => vec![package.to_owned()],
            Granularity::File => self
                .source
                .list_files(package)?
                .iter()
                .map(|path| path.to_string_lossy().into_owned())
                .collect(),
        };

        let mut imports = Vec::new();
        for target in &targets {
            imports.extend(self.source.list_imports(target, &self.prefix)?);
        }
        Ok(imports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{filter_imports, Result as SourceResult};
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// In-memory source: package → imports, package → files, file → imports.
    #[derive(Default)]
    struct StubSource {
        imports: HashMap<String, Vec<String>>,
        files: HashMap<String, Vec<PathBuf>>,
        failing: Vec<String>,
    }

    impl StubSource {
        fn with_imports(imports: &[(&str, &[&str])]) -> Self {
            let mut source = Self::default();
            for (target, imps) in imports {
                source.imports.insert(
                    target.to_string(),
                    imps.iter().map(|s| s.to_string()).collect(),
                );
            }
            source
        }
    }

    impl ImportSource for StubSource {
        fn list_packages(&self, _root: &str) -> SourceResult<Vec<String>> {
            Ok(self.imports.keys().cloned().collect())
        }

        fn list_files(&self, package: &str) -> SourceResult<Vec<PathBuf>> {
            Ok(self.files.get(package).cloned().unwrap_or_default())
        }

        fn list_imports(&self, target: &str, prefix: &str) -> SourceResult<Vec<String>> {
            if self.failing.iter().any(|p| p == target) {
                return Err(ResolutionError::Command {
                    context: format!("listing imports of {target}"),
                    output: "boom".to_string(),
                });
            }
            let raw = self.imports.get(target).cloned().unwrap_or_default();
            Ok(filter_imports(raw, prefix))
        }
    }

    fn pkgs(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn build_merges_all_packages() {
        let source = StubSource::with_imports(&[
            ("app", &["db", "api"]),
            ("api", &["db"]),
            ("db", &["log"]),
        ]);
        let outcome = GraphBuilder::new(&source).build(&pkgs(&["app", "api", "db"]));

        assert!(outcome.failures.is_empty());
        assert_eq!(outcome.graph.len(), 4);
        assert_eq!(outcome.graph.edge_count(), 4);
        assert_eq!(outcome.graph.edge_weight("app", "db"), Some(1.0));
        assert_eq!(outcome.graph.edge_weight("db", "log"), Some(1.0));
    }

    #[test]
    fn empty_package_list_yields_empty_graph() {
        let source = StubSource::default();
        let outcome = GraphBuilder::new(&source).build(&[]);
        assert!(outcome.graph.is_empty());
        assert!(outcome.failures.is_empty());
    }

    #[test]
    fn failing_package_is_recorded_not_fatal() {
        let mut source = StubSource::with_imports(&[("app", &["db"]), ("db", &["log"])]);
        source.failing.push("db".to_string());

        let outcome = GraphBuilder::new(&source).build(&pkgs(&["app", "db"]));

        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].package, "db");
        // The failed package contributed no edges but still appears as an
        // import target of the surviving one.
        assert_eq!(outcome.graph.edge_weight("app", "db"), Some(1.0));
        assert_eq!(outcome.graph.edge_weight("db", "log"), None);
    }

    #[test]
    fn file_granularity_expands_targets_and_accumulates() {
        let mut source = StubSource::with_imports(&[
            ("pkg/a.go", &["db", "log"]),
            ("pkg/b.go", &["db"]),
        ]);
        source
            .files
            .insert("pkg".to_string(), vec!["pkg/a.go".into(), "pkg/b.go".into()]);

        let outcome = GraphBuilder::new(&source)
            .with_granularity(Granularity::File)
            .build(&pkgs(&["pkg"]));

        assert!(outcome.failures.is_empty());
        assert_eq!(outcome.graph.edge_weight("pkg", "db"), Some(2.0));
        assert_eq!(outcome.graph.edge_weight("pkg", "log"), Some(1.0));
    }

    #[test]
    fn prefix_is_forwarded_to_the_source() {
        let source = StubSource::with_imports(&[("app", &["github.com/acme/db", "fmt"])]);
        let outcome = GraphBuilder::new(&source)
            .with_prefix("github.com/")
            .build(&pkgs(&["app"]));

        assert_eq!(outcome.graph.edge_weight("app", "github.com/acme/db"), Some(1.0));
        assert_eq!(outcome.graph.edge_weight("app", "fmt"), None);
    }

    #[test]
    fn progress_reports_every_package() {
        let source = StubSource::with_imports(&[
            ("a", &["b"]),
            ("b", &["c"]),
            ("c", &[]),
            ("d", &["a"]),
        ]);
        let seen = AtomicUsize::new(0);
        let packages = pkgs(&["a", "b", "c", "d"]);

        let outcome = GraphBuilder::new(&source).build_with_progress(
            &packages,
            Some(&|done, total| {
                assert!(done <= total);
                seen.store(done, Ordering::SeqCst);
            }),
        );

        assert!(outcome.failures.is_empty());
        assert_eq!(seen.load(Ordering::SeqCst), packages.len());
    }

    #[test]
    fn many_packages_exceeding_the_cap_all_merge() {
        let names: Vec<String> = (0..100).map(|i| format!("pkg{i}")).collect();
        let mut source = StubSource::default();
        for name in &names {
            source
                .imports
                .insert(name.clone(), vec!["core".to_string()]);
        }

        let outcome = GraphBuilder::new(&source).build(&names);

        assert!(outcome.failures.is_empty());
        assert_eq!(outcome.graph.len(), 101);
        assert_eq!(outcome.graph.edge_count(), 100);
    }
}
