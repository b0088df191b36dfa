//! Import sources - where the raw import relationships come from
//!
//! An [`ImportSource`] answers three questions: which packages does a
//! pattern expand to, which source files belong to a package, and which
//! imports does a package or file declare. The production implementation
//! shells out to the Go toolchain ([`GoListSource`]); tests swap in an
//! in-memory source.

mod golist;

pub use golist::GoListSource;

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ResolutionError>;

/// Errors from resolving packages, files, or imports.
#[derive(Error, Debug)]
pub enum ResolutionError {
    /// The pattern was valid but matched nothing. Distinguished from a
    /// toolchain failure because it is an input error, not an environment one.
    #[error("pattern {pattern:?} matched no packages: {output}")]
    NoPackages { pattern: String, output: String },

    #[error("{context}: {output}")]
    Command { context: String, output: String },

    #[error("failed to invoke the toolchain: {0}")]
    Io(#[from] std::io::Error),
}

/// A synchronous query service for package and import resolution.
///
/// `Sync` is a supertrait so build workers can share one source across
/// threads by reference.
pub trait ImportSource: Sync {
    /// Expand a module/package pattern to the packages it names.
    fn list_packages(&self, root: &str) -> Result<Vec<String>>;

    /// The source files belonging to a package, excluding test files.
    fn list_files(&self, package: &str) -> Result<Vec<PathBuf>>;

    /// The imports declared by a package or file, after [`filter_imports`].
    fn list_imports(&self, target: &str, prefix: &str) -> Result<Vec<String>>;
}

/// Apply the import-label filtering rules: drop empty labels, drop anything
/// under a vendored path, and keep only labels starting with `prefix`
/// (an empty prefix keeps everything).
pub fn filter_imports<I>(raw: I, prefix: &str) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    raw.into_iter()
        .filter(|imp| !imp.is_empty())
        .filter(|imp| !imp.contains("vendor/"))
        .filter(|imp| imp.starts_with(prefix))
        .collect()
}
