//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain` — never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::process::Output;
use std::time::Duration;

use anyhow::Result;
use tokio_util::sync::CancellationToken;

use crate::domain::inventory::{RouteTableRecord, SubnetRecord};
use crate::domain::{CheckOutcome, ExecutionResult, OutputSet};

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts process execution so infrastructure can be swapped or mocked.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run a program and capture its output.
    ///
    /// Implementations should delegate to `run_with_timeout` using the
    /// instance's configured default timeout.
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output>;
    /// Run a program with a custom timeout override.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned, exceeds `timeout`,
    /// or is cancelled. On timeout or cancellation the child process must be
    /// killed (not left orphaned).
    async fn run_with_timeout(&self, program: &str, args: &[&str], timeout: Duration)
    -> Result<Output>;
}

// ── Provisioning Tool Port ────────────────────────────────────────────────────

/// Terraform-style provisioning tool.
///
/// Every method maps the invocation onto an [`ExecutionResult`]; a nonzero
/// exit, spawn failure, timeout, or cancellation is reported as
/// `success == false`, never as an `Err`.
#[allow(async_fn_in_trait)]
pub trait ProvisioningTool {
    /// `init` — idempotent.
    async fn init(&self) -> ExecutionResult;
    /// `validate`.
    async fn validate(&self) -> ExecutionResult;
    /// `plan -var-file=F`.
    async fn plan(&self) -> ExecutionResult;
    /// `apply -auto-approve -var-file=F`.
    async fn apply(&self) -> ExecutionResult;
    /// `destroy -auto-approve -var-file=F`.
    async fn destroy(&self) -> ExecutionResult;
    /// `show -json`. On success `output` holds stdout only, so it stays
    /// parseable when the tool prints warnings on stderr.
    async fn show_json(&self) -> ExecutionResult;
    /// `state list`.
    async fn state_list(&self) -> ExecutionResult;
    /// `workspace list`.
    async fn workspace_list(&self) -> ExecutionResult;
    /// `workspace select NAME`.
    async fn workspace_select(&self, name: &str) -> ExecutionResult;
    /// `workspace new NAME`.
    async fn workspace_new(&self, name: &str) -> ExecutionResult;
    /// `workspace delete [-force] NAME`.
    async fn workspace_delete(&self, name: &str, force: bool) -> ExecutionResult;
}

// ── Network Inventory Port ────────────────────────────────────────────────────

/// Read-only cloud inventory lookups keyed by VPC id.
#[allow(async_fn_in_trait)]
pub trait NetworkInventory {
    /// List the subnets of a VPC.
    async fn describe_subnets(&self, vpc_id: &str) -> Result<Vec<SubnetRecord>>;
    /// List the route tables of a VPC.
    async fn describe_route_tables(&self, vpc_id: &str) -> Result<Vec<RouteTableRecord>>;
}

// ── Variables File Port ───────────────────────────────────────────────────────

/// Abstracts writing the variables file consumed via `-var-file`.
pub trait VarFileStore {
    /// Write `contents` and return the path written.
    ///
    /// # Errors
    ///
    /// Returns an error if the file or its parent directory cannot be written.
    fn write_var_file(&self, contents: &str) -> Result<PathBuf>;
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait — no async needed.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
}

// ── Check Port ────────────────────────────────────────────────────────────────

/// Future returned by [`Check::execute`].
///
/// Not `Send`: checks run sequentially on the caller's task.
pub type CheckFuture<'a> = Pin<Box<dyn Future<Output = CheckOutcome> + 'a>>;

/// Cancellation and deadline shared by every check in a batch.
#[derive(Debug, Clone)]
pub struct CheckContext {
    cancel: CancellationToken,
    timeout: Duration,
}

impl CheckContext {
    #[must_use]
    pub fn new(cancel: CancellationToken, timeout: Duration) -> Self {
        Self { cancel, timeout }
    }

    /// Token observed by the executor and by long-running checks.
    #[must_use]
    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Deadline applied to each check individually.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// A named validation run against extracted outputs.
///
/// Implementations are stateless between runs and must not panic; every
/// failure is reported through the returned [`CheckOutcome`].
pub trait Check {
    /// Registry key, e.g. `"validate_cidr_ranges"`.
    fn name(&self) -> &str;
    /// One-line description shown by `tfprobe checks`.
    fn description(&self) -> &str;
    /// Run the check.
    fn execute<'a>(&'a self, ctx: &'a CheckContext, outputs: &'a OutputSet) -> CheckFuture<'a>;
}
