//! Loads YAML test cases from a directory.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::domain::test_case::TestCase;

/// Read every `*.yaml` / `*.yml` file in `dir`, sorted by file name.
///
/// Files that fail to parse are skipped with a warning. A case without a
/// `metadata.name` is named after its file stem.
///
/// # Errors
///
/// Returns an error if `dir` cannot be listed.
pub fn load_test_cases(dir: &Path) -> Result<Vec<TestCase>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("cannot read test case directory {}", dir.display()))?;

    let mut paths: Vec<_> = entries
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|p| {
            p.is_file()
                && p.extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| e == "yaml" || e == "yml")
        })
        .collect();
    paths.sort();

    let mut cases = Vec::with_capacity(paths.len());
    for path in paths {
        let parsed = std::fs::read_to_string(&path)
            .with_context(|| format!("cannot read {}", path.display()))
            .and_then(|content| {
                serde_yaml::from_str::<TestCase>(&content)
                    .with_context(|| format!("cannot parse {}", path.display()))
            });
        match parsed {
            Ok(mut case) => {
                if case.metadata.name.trim().is_empty() {
                    case.metadata.name = path
                        .file_stem()
                        .map(|s| s.to_string_lossy().into_owned())
                        .unwrap_or_default();
                }
                debug!(path = %path.display(), name = %case.metadata.name, "loaded test case");
                cases.push(case);
            }
            Err(e) => warn!("skipping test case: {e:#}"),
        }
    }
    Ok(cases)
}
