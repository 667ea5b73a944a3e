//! `tfprobe destroy-all` — tear down every harness-created workspace.

use std::process::ExitCode;

use anyhow::Result;

use crate::app::AppContext;
use crate::application::services::test_run::destroy_all_test_workspaces;
use crate::output::human::HumanRenderer;
use crate::output::json;

/// Entry point for `tfprobe destroy-all`.
///
/// Exits non-zero when some workspace could not be selected.
///
/// # Errors
///
/// Returns an error if workspaces cannot be listed.
pub async fn run(app: &AppContext) -> Result<ExitCode> {
    let mut manager = app.workspace_manager();
    let reporter = app.reporter();
    let summary = destroy_all_test_workspaces(&mut manager, &reporter).await?;
    drop(reporter);

    if app.is_json() {
        json::print(&summary)?;
    } else {
        HumanRenderer::new(&app.output).render_destroy_summary(&summary);
    }

    Ok(if summary.unselectable.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
