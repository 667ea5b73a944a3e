//! CLI argument parsing with clap derive

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;

use crate::app::{AppContext, AppFlags, OutputFlags};
use crate::commands;
use crate::domain::error::{ConfigError, TestCaseError};
use crate::output::json;

/// Provision throwaway Terraform environments and verify them with checks
#[derive(Parser)]
#[command(
    name = "tfprobe",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(
        long,
        global = true,
        env = "NO_COLOR",
        value_parser = clap::builder::FalseyValueParser::new()
    )]
    pub no_color: bool,

    /// Log debug detail to stderr (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file (default: $TFPROBE_CONFIG, then ./tfprobe.yaml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Provision a test case, run its checks, and tear it down
    Run(commands::run::RunArgs),

    /// Run checks against an environment kept by `run --keep`
    Test(commands::test::TestArgs),

    /// Destroy every test workspace
    DestroyAll,

    /// List available checks
    Checks,

    /// List test cases
    Cases,

    /// List Terraform workspaces
    Workspaces,
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// Errors are printed here (as a JSON error object in `--json` mode) and
    /// mapped to a failing exit code.
    pub async fn run(self, cancel: CancellationToken) -> ExitCode {
        let json = self.json;
        match self.dispatch(cancel).await {
            Ok(code) => code,
            Err(e) => {
                report_error(&e, json);
                ExitCode::FAILURE
            }
        }
    }

    async fn dispatch(self, cancel: CancellationToken) -> Result<ExitCode> {
        let Cli {
            json,
            quiet,
            no_color,
            config,
            command,
            ..
        } = self;
        let flags = AppFlags {
            output: OutputFlags {
                no_color,
                quiet,
                json,
            },
            config,
        };
        let app = AppContext::new(&flags, cancel)?;

        match command {
            Command::Run(args) => commands::run::run(&app, &args).await,
            Command::Test(args) => commands::test::run(&app, &args).await,
            Command::DestroyAll => commands::destroy_all::run(&app).await,
            Command::Checks => commands::checks::run(&app),
            Command::Cases => commands::cases::run(&app),
            Command::Workspaces => commands::workspaces::run(&app).await,
        }
    }
}

/// Machine-readable code for the JSON error object.
#[must_use]
pub fn error_code(err: &anyhow::Error) -> &'static str {
    if err.downcast_ref::<ConfigError>().is_some() {
        "invalid_config"
    } else if err.downcast_ref::<TestCaseError>().is_some() {
        "test_case_not_found"
    } else {
        "command_failed"
    }
}

fn report_error(err: &anyhow::Error, json_mode: bool) {
    let message = format!("{err:#}");
    if json_mode && let Ok(obj) = json::format_error(&message, error_code(err)) {
        println!("{obj}");
        return;
    }
    eprintln!("Error: {message}");
}
