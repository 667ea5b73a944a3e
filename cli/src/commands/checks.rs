//! `tfprobe checks` — list registered checks.

use std::process::ExitCode;

use anyhow::Result;
use serde_json::json;

use crate::app::AppContext;
use crate::output::human::HumanRenderer;
use crate::output::json;

/// Entry point for `tfprobe checks`.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn run(app: &AppContext) -> Result<ExitCode> {
    let registry = app.registry();
    let checks = registry.list_available();
    if app.is_json() {
        let list: Vec<_> = checks
            .iter()
            .map(|(name, description)| json!({"name": name, "description": description}))
            .collect();
        json::print(&list)?;
    } else {
        HumanRenderer::new(&app.output).render_check_list(&checks);
    }
    Ok(ExitCode::SUCCESS)
}
