//! Application service — end-to-end test runs.
//!
//! Composes the workspace lifecycle, the variables file, and the check
//! executor. Teardown is guaranteed for ephemeral runs whatever happens in
//! between: graceful cleanup first, forced deletion if that fails.

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;
use tracing::debug;

use crate::application::ports::{
    CheckContext, ProgressReporter, ProvisioningTool, VarFileStore,
};
use crate::application::services::check_registry::CheckRegistry;
use crate::application::services::workspace_manager::{CleanupOutcome, WorkspaceManager};
use crate::domain::outputs::OutputSource;
use crate::domain::test_case::TestCase;
use crate::domain::tfvars::{render_var_file, test_tags};
use crate::domain::workspace::{WorkspaceInfo, is_test_workspace};
use crate::domain::{CheckResult, CheckSummary};

/// How far a run goes and whether the environment survives it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    /// Setup and plan, then tear down. No resources are created.
    PlanOnly,
    /// Full run; always torn down.
    Ephemeral,
    /// Full run; kept on success for later `test` runs, torn down on failure.
    Keep,
}

/// Everything a run produced.
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub test_case: String,
    pub workspace: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_source: Option<OutputSource>,
    pub results: Vec<CheckResult>,
    pub summary: CheckSummary,
    /// `None` when the environment was kept.
    pub teardown: Option<CleanupOutcome>,
    /// Reported for kept environments.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace_info: Option<WorkspaceInfo>,
}

/// Result of sweeping every harness-created workspace.
#[derive(Debug, Default, Serialize)]
pub struct DestroySummary {
    /// Cleaned up gracefully.
    pub cleaned: Vec<String>,
    /// Force-deleted after graceful cleanup failed.
    pub forced: Vec<String>,
    /// Could not be selected; left untouched.
    pub unselectable: Vec<String>,
}

struct Provisioned {
    output_source: Option<OutputSource>,
    results: Vec<CheckResult>,
}

/// Provision an environment for `case`, run its checks, and tear it down.
///
/// # Errors
///
/// Returns an error if setup, the variables file, plan, apply, or output
/// extraction fails. Teardown has already run when the error is returned.
pub async fn run_test_case<T: ProvisioningTool>(
    manager: &mut WorkspaceManager<T>,
    registry: &CheckRegistry,
    ctx: &CheckContext,
    case: &TestCase,
    var_files: &impl VarFileStore,
    mode: RunMode,
    reporter: &impl ProgressReporter,
) -> Result<RunReport> {
    let name = &case.metadata.name;
    reporter.step(&format!("setting up test environment for {name}..."));
    let workspace = manager
        .setup(name)
        .await
        .context("failed to set up test environment")?;
    reporter.success(&format!("test workspace created: {workspace}"));

    let provisioned = provision_and_check(manager, registry, ctx, case, var_files, mode, reporter).await;

    let keep = mode == RunMode::Keep && provisioned.is_ok();
    let (teardown_outcome, workspace_info) = if keep {
        reporter.success(&format!("environment kept in workspace {workspace}"));
        (None, manager.workspace_info().await.ok())
    } else {
        (Some(teardown(manager, reporter).await), None)
    };

    let provisioned = provisioned?;
    Ok(RunReport {
        test_case: name.clone(),
        workspace,
        output_source: provisioned.output_source,
        summary: CheckSummary::of(&provisioned.results),
        results: provisioned.results,
        teardown: teardown_outcome,
        workspace_info,
    })
}

async fn provision_and_check<T: ProvisioningTool>(
    manager: &mut WorkspaceManager<T>,
    registry: &CheckRegistry,
    ctx: &CheckContext,
    case: &TestCase,
    var_files: &impl VarFileStore,
    mode: RunMode,
    reporter: &impl ProgressReporter,
) -> Result<Provisioned> {
    let workspace = manager.current_workspace().unwrap_or_default().to_string();
    let tags = test_tags(&case.metadata.name, &workspace, Utc::now());
    let path = var_files
        .write_var_file(&render_var_file(&case.terraform.tfvars, tags))
        .context("failed to write variables file")?;
    reporter.success(&format!("generated variables file with test tags: {}", path.display()));

    ensure_not_cancelled(ctx)?;
    reporter.step("planning deployment...");
    manager.plan().await.context("terraform plan failed")?;
    reporter.success("plan completed");

    if mode == RunMode::PlanOnly {
        return Ok(Provisioned {
            output_source: None,
            results: Vec::new(),
        });
    }

    ensure_not_cancelled(ctx)?;
    reporter.step("applying deployment...");
    manager.apply().await.context("terraform apply failed")?;
    reporter.success("environment provisioned");

    let (source, results) = check_selected_workspace(manager, registry, ctx, &case.test_functions, reporter).await?;
    Ok(Provisioned {
        output_source: Some(source),
        results,
    })
}

/// Stop before the next provisioning step once the run is interrupted.
///
/// Terraform commands do not observe the token themselves, so this is
/// what keeps an interrupted run from creating infrastructure.
fn ensure_not_cancelled(ctx: &CheckContext) -> Result<()> {
    if ctx.is_cancelled() {
        anyhow::bail!("run cancelled");
    }
    Ok(())
}

async fn check_selected_workspace<T: ProvisioningTool>(
    manager: &WorkspaceManager<T>,
    registry: &CheckRegistry,
    ctx: &CheckContext,
    check_names: &[String],
    reporter: &impl ProgressReporter,
) -> Result<(OutputSource, Vec<CheckResult>)> {
    let (outputs, source) = manager
        .outputs()
        .await
        .context("could not read terraform outputs")?;
    if source == OutputSource::Fallback {
        reporter.warn("terraform outputs were not parseable; checks run against fallback outputs");
    }
    reporter.step(&format!("running {} checks...", check_names.len()));
    let results = registry.execute_all(ctx, check_names, &outputs).await;
    Ok((source, results))
}

/// Tear down the current workspace, escalating to forced deletion.
///
/// Failures are reported as warnings, never returned.
pub async fn teardown<T: ProvisioningTool>(
    manager: &mut WorkspaceManager<T>,
    reporter: &impl ProgressReporter,
) -> CleanupOutcome {
    reporter.step("cleaning up test environment...");
    let outcome = manager.force_cleanup().await;
    match &outcome {
        CleanupOutcome::NothingToClean => {}
        CleanupOutcome::Graceful { workspace } => {
            reporter.success(&format!("test environment {workspace} cleaned up"));
        }
        CleanupOutcome::Forced {
            workspace,
            cleanup_error,
            force_delete_succeeded,
        } => {
            reporter.warn(&format!(
                "cleanup failed for {workspace}, forced deletion: {cleanup_error}"
            ));
            if !force_delete_succeeded {
                reporter.warn(&format!(
                    "workspace {workspace} could not be deleted; remote resources may be orphaned"
                ));
            }
        }
    }
    outcome
}

/// Run checks against the first kept `test-` workspace that has resources.
///
/// # Errors
///
/// Returns an error if workspaces cannot be listed, none with resources
/// exists, or its outputs cannot be read.
pub async fn run_checks_on_existing<T: ProvisioningTool>(
    manager: &mut WorkspaceManager<T>,
    registry: &CheckRegistry,
    ctx: &CheckContext,
    case: &TestCase,
    reporter: &impl ProgressReporter,
) -> Result<RunReport> {
    let workspaces = manager
        .workspace_list()
        .await
        .context("failed to list workspaces")?;

    let mut target = None;
    for ws in workspaces.iter().filter(|ws| is_test_workspace(ws)) {
        if let Err(e) = manager.select_workspace(ws).await {
            debug!(workspace = %ws, error = %e, "skipping workspace");
            continue;
        }
        if manager.has_resources().await.unwrap_or(false) {
            target = Some(ws.clone());
            break;
        }
    }
    let Some(workspace) = target else {
        anyhow::bail!("No test workspace with resources found. Run 'tfprobe run --keep' first.");
    };
    reporter.success(&format!("using existing workspace: {workspace}"));

    let (source, results) =
        check_selected_workspace(manager, registry, ctx, &case.test_functions, reporter).await?;
    Ok(RunReport {
        test_case: case.metadata.name.clone(),
        workspace,
        output_source: Some(source),
        summary: CheckSummary::of(&results),
        results,
        teardown: None,
        workspace_info: None,
    })
}

/// Tear down every harness-created workspace (never `default`).
///
/// # Errors
///
/// Returns an error only if workspaces cannot be listed.
pub async fn destroy_all_test_workspaces<T: ProvisioningTool>(
    manager: &mut WorkspaceManager<T>,
    reporter: &impl ProgressReporter,
) -> Result<DestroySummary> {
    let workspaces = manager
        .workspace_list()
        .await
        .context("failed to list workspaces")?;

    let mut summary = DestroySummary::default();
    for ws in workspaces.into_iter().filter(|ws| is_test_workspace(ws)) {
        reporter.step(&format!("destroying workspace {ws}..."));
        if let Err(e) = manager.select_workspace(&ws).await {
            reporter.warn(&format!("failed to select workspace {ws}: {e}"));
            summary.unselectable.push(ws);
            continue;
        }
        match teardown(manager, reporter).await {
            CleanupOutcome::Forced { .. } => summary.forced.push(ws),
            CleanupOutcome::Graceful { .. } | CleanupOutcome::NothingToClean => {
                summary.cleaned.push(ws);
            }
        }
    }
    Ok(summary)
}
