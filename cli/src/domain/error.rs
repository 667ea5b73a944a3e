//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, or `std::process`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use thiserror::Error;

use crate::domain::workspace::WorkspaceState;

// ── Tool invocation ───────────────────────────────────────────────────────────

/// A provisioning-tool command exited unsuccessfully.
///
/// Carries the raw combined output so the operator sees exactly what the
/// tool printed.
#[derive(Debug, Clone, Error)]
#[error("terraform {command} failed: {error}\n{output}")]
pub struct ToolInvocationError {
    /// Subcommand that was run, e.g. `"plan"` or `"workspace new"`.
    pub command: String,
    /// Combined stdout and stderr of the invocation.
    pub output: String,
    /// Process-level error text (exit status, timeout, spawn failure).
    pub error: String,
}

// ── Workspace errors ──────────────────────────────────────────────────────────

/// Errors related to the current-workspace pointer and its lifecycle state.
#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("No current workspace. Run setup first.")]
    NoCurrentWorkspace,

    #[error("Workspace '{0}' is already active. Clean it up before starting another.")]
    AlreadyActive(String),

    #[error("Workspace '{workspace}' is {state}; {operation} requires {required}.")]
    InvalidState {
        workspace: String,
        state: WorkspaceState,
        operation: &'static str,
        required: &'static str,
    },

    #[error("Cannot select or create workspace '{name}':\n{output}")]
    SelectFailed { name: String, output: String },
}

/// Errors from `Setup`. Fatal to the run.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("setup failed during init")]
    Init(#[source] ToolInvocationError),

    #[error(transparent)]
    Workspace(#[from] WorkspaceError),
}

/// Errors from `Plan`, `Apply`, `Destroy`, and read-only queries.
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error(transparent)]
    Workspace(#[from] WorkspaceError),

    #[error(transparent)]
    Tool(#[from] ToolInvocationError),
}

// ── Cleanup errors ────────────────────────────────────────────────────────────

/// Step of the graceful cleanup sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanupStage {
    Destroy,
    SelectDefault,
    Delete,
}

impl std::fmt::Display for CleanupStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Destroy => write!(f, "destroy"),
            Self::SelectDefault => write!(f, "select default workspace"),
            Self::Delete => write!(f, "delete workspace"),
        }
    }
}

/// Graceful cleanup did not complete. Escalates to `ForceCleanup`.
#[derive(Debug, Error)]
pub enum CleanupError {
    #[error("No current workspace to clean up.")]
    NoCurrentWorkspace,

    /// Resources may still exist remotely; the workspace pointer was kept.
    #[error("cleanup of workspace '{workspace}' stopped at {stage}: {source}")]
    Incomplete {
        workspace: String,
        stage: CleanupStage,
        #[source]
        source: ToolInvocationError,
    },
}

// ── Parse errors ──────────────────────────────────────────────────────────────

/// Tool output could not be parsed. Callers degrade to fallback data.
#[derive(Debug, Error)]
#[error("cannot parse {what}: {reason}")]
pub struct ParseError {
    pub what: &'static str,
    pub reason: String,
}

// ── Check errors ──────────────────────────────────────────────────────────────

/// Errors absorbed into failed `CheckResult`s. Never propagated.
#[derive(Debug, Error)]
pub enum CheckError {
    #[error("not found")]
    NotFound(String),

    #[error("cancelled")]
    Cancelled,

    #[error("timed out after {0}s")]
    TimedOut(u64),
}

impl CheckError {
    /// Machine-readable kind recorded in result details.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "check_not_found",
            Self::Cancelled => "cancelled",
            Self::TimedOut(_) => "timed_out",
        }
    }
}

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors related to configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(String),

    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: &'static str, reason: String },
}

// ── Test case errors ──────────────────────────────────────────────────────────

/// Errors related to test case selection.
#[derive(Debug, Error)]
pub enum TestCaseError {
    #[error("No test cases found in {0}")]
    NoneFound(String),

    #[error("Test case '{name}' not found. Available: {available}")]
    NotFound { name: String, available: String },
}
