//! `tfprobe cases` — list loaded test cases.

use std::process::ExitCode;

use anyhow::Result;

use crate::app::AppContext;
use crate::output::human::HumanRenderer;
use crate::output::json;

/// Entry point for `tfprobe cases`.
///
/// # Errors
///
/// Returns an error if the test case directory cannot be read.
pub fn run(app: &AppContext) -> Result<ExitCode> {
    let cases = app.test_cases()?;
    if app.is_json() {
        json::print(&cases)?;
    } else {
        HumanRenderer::new(&app.output).render_cases(&cases);
    }
    Ok(ExitCode::SUCCESS)
}
