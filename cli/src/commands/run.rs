//! `tfprobe run` — provision an environment, run its checks, tear it down.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::services::test_run::{RunMode, run_test_case};
use crate::output::human::HumanRenderer;
use crate::output::json;

/// Arguments for the run command.
#[derive(Args)]
pub struct RunArgs {
    /// Test case to run (by `metadata.name`, case-insensitive)
    #[arg(long)]
    pub case: Option<String>,

    /// Stop after `plan`; no resources are created
    #[arg(long, conflicts_with = "keep")]
    pub plan_only: bool,

    /// Keep the environment after a successful run (for `tfprobe test`)
    #[arg(long)]
    pub keep: bool,
}

impl RunArgs {
    #[must_use]
    pub fn mode(&self) -> RunMode {
        if self.plan_only {
            RunMode::PlanOnly
        } else if self.keep {
            RunMode::Keep
        } else {
            RunMode::Ephemeral
        }
    }
}

/// Entry point for `tfprobe run`.
///
/// # Errors
///
/// Returns an error if the test case cannot be resolved or provisioning fails.
pub async fn run(app: &AppContext, args: &RunArgs) -> Result<ExitCode> {
    let case = app.select_test_case(args.case.as_deref())?;
    let mut manager = app.workspace_manager();
    let registry = app.registry();
    let reporter = app.reporter();

    let report = run_test_case(
        &mut manager,
        &registry,
        &app.check_context(),
        &case,
        &app.var_file_store(),
        args.mode(),
        &reporter,
    )
    .await?;
    drop(reporter);

    if app.is_json() {
        json::print(&report)?;
    } else {
        HumanRenderer::new(&app.output).render_run_report(&report);
    }

    Ok(if report.summary.all_passed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
