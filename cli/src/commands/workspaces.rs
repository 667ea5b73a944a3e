//! `tfprobe workspaces` — list the tool's workspaces.

use std::process::ExitCode;

use anyhow::{Context, Result};

use crate::app::AppContext;
use crate::output::human::HumanRenderer;
use crate::output::json;

/// Entry point for `tfprobe workspaces`.
///
/// # Errors
///
/// Returns an error if `workspace list` fails.
pub async fn run(app: &AppContext) -> Result<ExitCode> {
    let workspaces = app
        .workspace_manager()
        .workspace_list()
        .await
        .context("failed to list workspaces")?;
    if app.is_json() {
        json::print(&workspaces)?;
    } else {
        HumanRenderer::new(&app.output).render_workspaces(&workspaces);
    }
    Ok(ExitCode::SUCCESS)
}
