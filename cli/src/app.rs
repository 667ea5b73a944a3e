//! Application context — unified state passed to every command handler.
//!
//! `AppContext` owns the loaded configuration, terminal output settings, and
//! the process-wide cancellation token, and builds the infrastructure
//! adapters each command needs.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;

use crate::application::ports::CheckContext;
use crate::application::services::check_registry::CheckRegistry;
use crate::application::services::checks::default_registry;
use crate::application::services::workspace_manager::WorkspaceManager;
use crate::domain::HarnessConfig;
use crate::domain::test_case::{TestCase, select_case};
use crate::infra::aws_inventory::AwsCliInventory;
use crate::infra::command_runner::TokioCommandRunner;
use crate::infra::config::YamlConfigStore;
use crate::infra::fs::LocalVarFile;
use crate::infra::terraform::TerraformCli;
use crate::infra::test_cases::load_test_cases;
use crate::output::OutputContext;
use crate::output::reporter::TerminalReporter;

/// Output rendering mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable terminal output (default).
    Human,
    /// Machine-readable JSON output.
    Json,
}

/// Output rendering flags.
pub struct OutputFlags {
    /// Disable ANSI color output.
    pub no_color: bool,
    /// Suppress non-error output.
    pub quiet: bool,
    /// Enable JSON output mode.
    pub json: bool,
}

/// Flags passed from the top-level CLI to `AppContext::new`.
pub struct AppFlags {
    /// Output rendering options.
    pub output: OutputFlags,
    /// Explicit config file (`--config`).
    pub config: Option<PathBuf>,
}

/// Terraform driven through a tokio runner rooted at the module directory.
pub type Terraform = TerraformCli<TokioCommandRunner>;

/// Unified application context passed to every command handler.
pub struct AppContext {
    /// Terminal output context (colors, quiet mode).
    ///
    /// Always quiet in JSON mode so stdout carries only the document.
    pub output: OutputContext,
    /// Output rendering mode (human vs JSON).
    pub mode: OutputMode,
    /// Loaded and validated configuration.
    pub config: HarnessConfig,
    /// Cancelled on Ctrl-C.
    pub cancel: CancellationToken,
    /// When `true`, skip interactive prompts and use defaults.
    ///
    /// Set in JSON mode, when stdin/stdout is not a terminal, or when the
    /// `CI` environment variable is present.
    pub non_interactive: bool,
}

impl AppContext {
    /// Construct an `AppContext` from top-level CLI flags.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or is invalid.
    pub fn new(flags: &AppFlags, cancel: CancellationToken) -> Result<Self> {
        let config = YamlConfigStore::new(flags.config.clone()).load()?;
        let mode = if flags.output.json {
            OutputMode::Json
        } else {
            OutputMode::Human
        };
        let output = OutputContext::new(flags.output.no_color, flags.output.quiet || flags.output.json);
        let non_interactive = flags.output.json
            || !output.is_tty
            || !console::Term::stderr().is_term()
            || std::env::var("CI").is_ok();

        Ok(Self {
            output,
            mode,
            config,
            cancel,
            non_interactive,
        })
    }

    /// Returns `true` when JSON output mode is active.
    #[must_use]
    pub fn is_json(&self) -> bool {
        self.mode == OutputMode::Json
    }

    /// Progress reporter for application services.
    #[must_use]
    pub fn reporter(&self) -> TerminalReporter<'_> {
        TerminalReporter::new(&self.output)
    }

    /// Terraform adapter.
    ///
    /// Not wired to the Ctrl-C token: the terminal already delivers SIGINT
    /// to Terraform, and teardown must still be able to run afterwards.
    #[must_use]
    pub fn terraform(&self) -> Terraform {
        let tf = &self.config.terraform;
        let runner = TokioCommandRunner::new(tf.command_timeout()).with_working_dir(&tf.working_dir);
        TerraformCli::new(runner, &tf.binary, &tf.var_file)
    }

    #[must_use]
    pub fn workspace_manager(&self) -> WorkspaceManager<Terraform> {
        WorkspaceManager::new(self.terraform())
    }

    /// Registry of built-in checks backed by the AWS CLI.
    #[must_use]
    pub fn registry(&self) -> CheckRegistry {
        let runner = TokioCommandRunner::new(self.config.checks.timeout())
            .with_cancellation(self.cancel.clone());
        default_registry(Arc::new(AwsCliInventory::new(runner, self.config.aws.clone())))
    }

    #[must_use]
    pub fn check_context(&self) -> CheckContext {
        CheckContext::new(self.cancel.clone(), self.config.checks.timeout())
    }

    #[must_use]
    pub fn var_file_store(&self) -> LocalVarFile {
        LocalVarFile::new(self.config.terraform.var_file_path())
    }

    /// Load every test case from the configured directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be read.
    pub fn test_cases(&self) -> Result<Vec<TestCase>> {
        load_test_cases(&self.config.test_cases_dir)
    }

    /// Resolve the test case to run.
    ///
    /// With `name`, match case-insensitively. Without it, a single case is
    /// used directly; several prompt for a choice when interactive, else
    /// the first is used.
    ///
    /// # Errors
    ///
    /// Returns an error if no cases exist, `name` matches none, or the
    /// prompt fails.
    pub fn select_test_case(&self, name: Option<&str>) -> Result<TestCase> {
        let cases = self.test_cases()?;
        let source = self.config.test_cases_dir.display().to_string();
        if name.is_some() || cases.len() <= 1 || self.non_interactive {
            return Ok(select_case(&cases, name, &source)?.clone());
        }

        let items: Vec<String> = cases
            .iter()
            .map(|c| {
                if c.metadata.description.is_empty() {
                    c.metadata.name.clone()
                } else {
                    format!("{} - {}", c.metadata.name, c.metadata.description)
                }
            })
            .collect();
        let index = dialoguer::Select::new()
            .with_prompt("Select a test case")
            .items(&items)
            .default(0)
            .interact()
            .context("test case selection")?;
        let chosen = cases
            .into_iter()
            .nth(index)
            .ok_or_else(|| anyhow::anyhow!("selection out of range"))?;
        Ok(chosen)
    }
}
