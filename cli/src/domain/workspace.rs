//! Workspace domain types and pure parsing functions.
//!
//! This module is intentionally free of I/O, async, and external layer imports.
//! All functions take data in and return data out.

use serde::Serialize;

/// Name of the workspace Terraform always has and which is never deleted.
pub const DEFAULT_WORKSPACE: &str = "default";

/// Prefix shared by every workspace the harness creates.
pub const TEST_WORKSPACE_PREFIX: &str = "test-";

/// Marker Terraform prints in front of the selected workspace.
const CURRENT_MARKER: &str = "* ";

/// Lifecycle state of the manager's current workspace.
///
/// ```text
/// NoWorkspace → WorkspaceActive → Planned → Applied
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkspaceState {
    NoWorkspace,
    WorkspaceActive,
    Planned,
    Applied,
}

impl std::fmt::Display for WorkspaceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoWorkspace => write!(f, "no workspace"),
            Self::WorkspaceActive => write!(f, "active"),
            Self::Planned => write!(f, "planned"),
            Self::Applied => write!(f, "applied"),
        }
    }
}

/// Snapshot of the current workspace, reported after an apply.
#[derive(Debug, Clone, Serialize)]
pub struct WorkspaceInfo {
    pub current_workspace: Option<String>,
    pub state: WorkspaceState,
    pub has_resources: bool,
}

/// Lowercase a test name and replace every space with a hyphen.
///
/// Each space maps to its own hyphen, so `"a  b"` becomes `a--b`.
#[must_use]
pub fn normalize_test_name(test_name: &str) -> String {
    test_name.to_lowercase().replace(' ', "-")
}

/// Build the workspace name for a test run.
///
/// Format: `test-<normalized-name>-<unix-timestamp>`. The timestamp suffix
/// keeps names unique across runs of the same test.
#[must_use]
pub fn workspace_name(test_name: &str, unix_timestamp: i64) -> String {
    format!(
        "{TEST_WORKSPACE_PREFIX}{}-{unix_timestamp}",
        normalize_test_name(test_name)
    )
}

/// Whether a workspace name looks like one the harness created.
#[must_use]
pub fn is_test_workspace(name: &str) -> bool {
    name != DEFAULT_WORKSPACE && name.starts_with(TEST_WORKSPACE_PREFIX)
}

/// Parse `terraform workspace list` output into workspace names.
///
/// Blank lines and informational lines (`No workspaces`) are dropped and the
/// `* ` marker in front of the selected workspace is stripped.
#[must_use]
pub fn parse_workspace_list(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.contains("No workspaces"))
        .map(|line| line.strip_prefix(CURRENT_MARKER).unwrap_or(line).trim())
        .filter(|name| !name.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Whether a `terraform state list` listing tracks any resources.
#[must_use]
pub fn has_tracked_resources(state_listing: &str) -> bool {
    !state_listing.trim().is_empty()
}
