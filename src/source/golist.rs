//! `go list` backed import source
//!
//! Each query is one `go list` invocation with a `-f` template. Output is
//! captured combined (stdout then stderr) so failures carry whatever the
//! toolchain printed.

use std::path::PathBuf;
use std::process::Command;

use tracing::debug;

use super::{filter_imports, ImportSource, ResolutionError, Result};

const NO_PACKAGES_PREFIX: &str = "go: warning: ";
const NO_PACKAGES_SUFFIX: &str = "matched no packages";

/// Resolves packages, files, and imports through the Go toolchain.
#[derive(Debug, Default)]
pub struct GoListSource;

impl GoListSource {
    pub fn new() -> Self {
        Self
    }

    fn go_list(&self, context: &str, args: &[&str]) -> Result<String> {
        debug!(?args, "go list");
        let out = Command::new("go").arg("list").args(args).output()?;
        let mut combined = String::from_utf8_lossy(&out.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&out.stderr));
        if !out.status.success() {
            return Err(ResolutionError::Command {
                context: context.to_string(),
                output: combined.trim().to_string(),
            });
        }
        Ok(combined)
    }
}

/// Detect the "matched no packages" warning in otherwise-successful output
/// and split the remainder into package labels.
fn parse_package_list(pattern: &str, combined: &str) -> Result<Vec<String>> {
    let out = combined.trim();
    if out.starts_with(NO_PACKAGES_PREFIX) && out.ends_with(NO_PACKAGES_SUFFIX) {
        return Err(ResolutionError::NoPackages {
            pattern: pattern.to_string(),
            output: out.to_string(),
        });
    }
    Ok(out.lines().map(str::to_owned).collect())
}

impl ImportSource for GoListSource {
    fn list_packages(&self, root: &str) -> Result<Vec<String>> {
        let combined = self.go_list(&format!("expanding package pattern {root}"), &[root])?;
        parse_package_list(root, &combined)
    }

    fn list_files(&self, package: &str) -> Result<Vec<PathBuf>> {
        let dir = self.go_list(
            &format!("resolving directory of {package}"),
            &["-f", "{{ .Dir }}", package],
        )?;
        let dir = PathBuf::from(dir.trim());

        let basenames = self.go_list(
            &format!("listing source files of {package}"),
            &["-f", "{{ join .GoFiles \"\\n\" }}", package],
        )?;
        Ok(basenames
            .lines()
            .filter(|base| !base.is_empty())
            .map(|base| dir.join(base))
            .collect())
    }

    fn list_imports(&self, target: &str, prefix: &str) -> Result<Vec<String>> {
        let combined = self.go_list(
            &format!("listing imports of {target}"),
            &["-f", "{{ join .Imports \"\\n\" }}", target],
        )?;
        Ok(filter_imports(combined.lines().map(str::to_owned), prefix))
    }
}
