//! Application service — workspace lifecycle over a provisioning tool.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.
//!
//! ```text
//! NoWorkspace ─setup─▶ WorkspaceActive ─plan─▶ Planned ─apply─▶ Applied
//!                            │                                    ▲
//!                            └──────────── apply_unplanned ───────┘
//! cleanup / force_cleanup ─▶ NoWorkspace
//! ```
//!
//! Lifecycle operations take `&mut self`: the current-workspace pointer is
//! owned by one manager and callers serialize access through it.

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::application::ports::ProvisioningTool;
use crate::domain::error::{
    CleanupError, CleanupStage, LifecycleError, SetupError, ToolInvocationError, WorkspaceError,
};
use crate::domain::outputs::{OutputSet, OutputSource, extract_outputs};
use crate::domain::workspace::{
    DEFAULT_WORKSPACE, WorkspaceInfo, WorkspaceState, has_tracked_resources,
    parse_workspace_list, workspace_name,
};
use crate::domain::ExecutionResult;

/// How a teardown finished.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CleanupOutcome {
    /// There was no current workspace.
    NothingToClean,
    /// Destroy, select-default, and delete all succeeded.
    Graceful { workspace: String },
    /// Graceful cleanup failed and the workspace was force-deleted.
    ///
    /// Lossy: the local pointer was cleared regardless of what the tool
    /// reported, so remote resources may be orphaned and must be reconciled
    /// out of band.
    Forced {
        workspace: String,
        cleanup_error: String,
        force_delete_succeeded: bool,
    },
}

impl CleanupOutcome {
    /// Whether remote state may have been left behind.
    #[must_use]
    pub fn may_have_orphans(&self) -> bool {
        matches!(self, Self::Forced { .. })
    }
}

#[derive(Debug, Clone)]
struct CurrentWorkspace {
    name: String,
    state: WorkspaceState,
}

/// Owns the current workspace and drives the tool through its lifecycle.
pub struct WorkspaceManager<T: ProvisioningTool> {
    tool: T,
    current: Option<CurrentWorkspace>,
}

impl<T: ProvisioningTool> WorkspaceManager<T> {
    #[must_use]
    pub fn new(tool: T) -> Self {
        Self {
            tool,
            current: None,
        }
    }

    /// The underlying tool adapter.
    #[must_use]
    pub fn tool(&self) -> &T {
        &self.tool
    }

    /// Name of the current workspace, if any.
    #[must_use]
    pub fn current_workspace(&self) -> Option<&str> {
        self.current.as_ref().map(|c| c.name.as_str())
    }

    #[must_use]
    pub fn state(&self) -> WorkspaceState {
        self.current
            .as_ref()
            .map_or(WorkspaceState::NoWorkspace, |c| c.state)
    }

    // ── Setup ─────────────────────────────────────────────────────────────────

    /// Create and select a fresh workspace for `test_name`.
    ///
    /// # Errors
    ///
    /// Returns `SetupError` if a workspace is already current, `init` fails,
    /// or the workspace can be neither selected nor created.
    pub async fn setup(&mut self, test_name: &str) -> Result<String, SetupError> {
        self.setup_at(test_name, Utc::now().timestamp()).await
    }

    /// [`setup`](Self::setup) with an explicit Unix timestamp suffix.
    ///
    /// # Errors
    ///
    /// See [`setup`](Self::setup).
    pub async fn setup_at(
        &mut self,
        test_name: &str,
        unix_timestamp: i64,
    ) -> Result<String, SetupError> {
        if let Some(current) = &self.current {
            return Err(WorkspaceError::AlreadyActive(current.name.clone()).into());
        }
        let name = workspace_name(test_name, unix_timestamp);
        info!(workspace = %name, "setting up workspace");

        self.tool
            .init()
            .await
            .into_checked("init")
            .map_err(SetupError::Init)?;
        self.select_or_create(&name).await?;

        self.current = Some(CurrentWorkspace {
            name: name.clone(),
            state: WorkspaceState::WorkspaceActive,
        });
        Ok(name)
    }

    /// Select `name`, creating it if it does not exist.
    ///
    /// The current-workspace pointer moves to `name` only on success.
    ///
    /// # Errors
    ///
    /// Returns `WorkspaceError::SelectFailed` if both select and create fail.
    pub async fn select_workspace(&mut self, name: &str) -> Result<ExecutionResult, WorkspaceError> {
        let result = self.select_or_create(name).await?;
        self.current = Some(CurrentWorkspace {
            name: name.to_string(),
            state: WorkspaceState::WorkspaceActive,
        });
        Ok(result)
    }

    async fn select_or_create(&self, name: &str) -> Result<ExecutionResult, WorkspaceError> {
        let selected = self.tool.workspace_select(name).await;
        if selected.success {
            debug!(workspace = %name, "selected existing workspace");
            return Ok(selected);
        }
        debug!(workspace = %name, "select failed, creating workspace");
        let created = self.tool.workspace_new(name).await;
        if created.success {
            return Ok(created);
        }
        Err(WorkspaceError::SelectFailed {
            name: name.to_string(),
            output: [
                selected.output.trim(),
                selected.error.trim(),
                created.output.trim(),
                created.error.trim(),
            ]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("\n"),
        })
    }

    // ── Plan / Apply / Destroy ────────────────────────────────────────────────

    /// Run `validate` against the configuration. Does not touch state.
    pub async fn validate(&self) -> ExecutionResult {
        self.tool.validate().await
    }

    /// Plan against the variables file. Never mutates remote state.
    ///
    /// Moves `WorkspaceActive → Planned`; planning an already planned or
    /// applied workspace leaves its state unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if there is no current workspace or the plan fails.
    pub async fn plan(&mut self) -> Result<ExecutionResult, LifecycleError> {
        self.require_current()?;
        let result = self.tool.plan().await.into_checked("plan")?;
        self.transition(WorkspaceState::WorkspaceActive, WorkspaceState::Planned);
        Ok(result)
    }

    /// Apply after a successful plan.
    ///
    /// # Errors
    ///
    /// Returns `WorkspaceError::InvalidState` when the workspace has not been
    /// planned, or the tool error when apply fails. A failed apply leaves the
    /// state as it was so the caller can retry.
    pub async fn apply(&mut self) -> Result<ExecutionResult, LifecycleError> {
        let current = self.require_current()?;
        if current.state == WorkspaceState::WorkspaceActive {
            return Err(WorkspaceError::InvalidState {
                workspace: current.name,
                state: current.state,
                operation: "apply",
                required: "a successful plan (or an explicit apply_unplanned)",
            }
            .into());
        }
        self.run_apply().await
    }

    /// Apply directly from `WorkspaceActive`, skipping the plan step.
    ///
    /// This is an explicit opt-in: the tool computes and applies its own plan
    /// in one step, so no plan output is reviewed first.
    ///
    /// # Errors
    ///
    /// Returns an error if there is no current workspace or apply fails.
    pub async fn apply_unplanned(&mut self) -> Result<ExecutionResult, LifecycleError> {
        let current = self.require_current()?;
        if current.state == WorkspaceState::WorkspaceActive {
            warn!(workspace = %current.name, "applying without a prior plan");
        }
        self.run_apply().await
    }

    async fn run_apply(&mut self) -> Result<ExecutionResult, LifecycleError> {
        let result = self.tool.apply().await.into_checked("apply")?;
        if let Some(current) = self.current.as_mut() {
            current.state = WorkspaceState::Applied;
            info!(workspace = %current.name, "workspace applied");
        }
        Ok(result)
    }

    /// Destroy the current workspace's resources, keeping the workspace.
    ///
    /// Destroying an empty workspace is a successful no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if there is no current workspace or destroy fails.
    pub async fn destroy(&mut self) -> Result<ExecutionResult, LifecycleError> {
        self.require_current()?;
        let result = self.tool.destroy().await.into_checked("destroy")?;
        if let Some(current) = self.current.as_mut() {
            current.state = WorkspaceState::WorkspaceActive;
        }
        Ok(result)
    }

    // ── Cleanup ───────────────────────────────────────────────────────────────

    /// Graceful teardown: destroy, select `default`, delete the workspace.
    ///
    /// The workspace pointer clears only when every step succeeds.
    ///
    /// # Errors
    ///
    /// Returns `CleanupError::Incomplete` naming the step that failed, or
    /// `CleanupError::NoCurrentWorkspace`.
    pub async fn cleanup(&mut self) -> Result<(), CleanupError> {
        let name = self
            .current_workspace()
            .map(str::to_owned)
            .ok_or(CleanupError::NoCurrentWorkspace)?;
        info!(workspace = %name, "cleaning up workspace");

        let incomplete = |stage, source| CleanupError::Incomplete {
            workspace: name.clone(),
            stage,
            source,
        };

        self.tool
            .destroy()
            .await
            .into_checked("destroy")
            .map_err(|e| incomplete(CleanupStage::Destroy, e))?;
        if let Some(current) = self.current.as_mut() {
            current.state = WorkspaceState::WorkspaceActive;
        }

        self.tool
            .workspace_select(DEFAULT_WORKSPACE)
            .await
            .into_checked("workspace select")
            .map_err(|e| incomplete(CleanupStage::SelectDefault, e))?;

        self.tool
            .workspace_delete(&name, false)
            .await
            .into_checked("workspace delete")
            .map_err(|e| incomplete(CleanupStage::Delete, e))?;

        self.current = None;
        info!(workspace = %name, "workspace cleaned up");
        Ok(())
    }

    /// Last-resort teardown. Always leaves no current workspace.
    ///
    /// Attempts [`cleanup`](Self::cleanup) first; if that fails, selects
    /// `default` and force-deletes the workspace without checking for
    /// remaining resources. The local pointer is cleared whatever the tool
    /// reports, overriding remote truth with local bookkeeping.
    pub async fn force_cleanup(&mut self) -> CleanupOutcome {
        let Some(name) = self.current_workspace().map(str::to_owned) else {
            return CleanupOutcome::NothingToClean;
        };

        let err = match self.cleanup().await {
            Ok(()) => return CleanupOutcome::Graceful { workspace: name },
            Err(err) => err,
        };
        warn!(workspace = %name, error = %err, "graceful cleanup failed, forcing deletion");

        let selected = self.tool.workspace_select(DEFAULT_WORKSPACE).await;
        if !selected.success {
            warn!(workspace = %name, output = %selected.output.trim(), "could not select default workspace");
        }
        let deleted = self.tool.workspace_delete(&name, true).await;
        if !deleted.success {
            warn!(
                workspace = %name,
                output = %deleted.output.trim(),
                "force delete failed; remote state may be orphaned"
            );
        }

        self.current = None;
        CleanupOutcome::Forced {
            workspace: name,
            cleanup_error: err.to_string(),
            force_delete_succeeded: deleted.success,
        }
    }

    // ── Queries ───────────────────────────────────────────────────────────────

    /// Whether the selected workspace tracks any resources.
    ///
    /// # Errors
    ///
    /// Returns an error if `state list` fails.
    pub async fn has_resources(&self) -> Result<bool, ToolInvocationError> {
        let listing = self.tool.state_list().await.into_checked("state list")?;
        Ok(has_tracked_resources(&listing.output))
    }

    /// Names of all workspaces known to the tool.
    ///
    /// # Errors
    ///
    /// Returns an error if `workspace list` fails.
    pub async fn workspace_list(&self) -> Result<Vec<String>, ToolInvocationError> {
        let listing = self
            .tool
            .workspace_list()
            .await
            .into_checked("workspace list")?;
        Ok(parse_workspace_list(&listing.output))
    }

    /// Raw `show -json` of the selected workspace.
    ///
    /// # Errors
    ///
    /// Returns an error if `show` fails.
    pub async fn show(&self) -> Result<ExecutionResult, ToolInvocationError> {
        self.tool.show_json().await.into_checked("show")
    }

    /// Outputs of the selected workspace, flattened for checks.
    ///
    /// Unparseable output degrades to [`OutputSet::fallback`] with a warning.
    ///
    /// # Errors
    ///
    /// Returns an error if `show` itself fails.
    pub async fn outputs(&self) -> Result<(OutputSet, OutputSource), ToolInvocationError> {
        let shown = self.show().await?;
        let (outputs, source) = extract_outputs(&shown.output);
        if source == OutputSource::Fallback {
            warn!("terraform output was not parseable JSON; using fallback outputs");
        }
        Ok((outputs, source))
    }

    /// Current workspace, lifecycle state, and whether it holds resources.
    ///
    /// # Errors
    ///
    /// Returns an error if `state list` fails.
    pub async fn workspace_info(&self) -> Result<WorkspaceInfo, ToolInvocationError> {
        Ok(WorkspaceInfo {
            current_workspace: self.current_workspace().map(str::to_owned),
            state: self.state(),
            has_resources: self.has_resources().await?,
        })
    }

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn require_current(&self) -> Result<CurrentWorkspace, WorkspaceError> {
        self.current.clone().ok_or(WorkspaceError::NoCurrentWorkspace)
    }

    fn transition(&mut self, from: WorkspaceState, to: WorkspaceState) {
        if let Some(current) = self.current.as_mut().filter(|c| c.state == from) {
            debug!(workspace = %current.name, %from, %to, "state transition");
            current.state = to;
        }
    }
}
