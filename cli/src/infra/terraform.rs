//! Infrastructure implementation of the `ProvisioningTool` port.
//!
//! `TerraformCli<R>` routes every Terraform invocation through a
//! `CommandRunner` and maps the process result onto an `ExecutionResult`.

use std::process::Output;

use anyhow::Result;
use tracing::warn;

use crate::application::ports::{CommandRunner, ProvisioningTool};
use crate::domain::ExecutionResult;

/// Terraform (or OpenTofu) driven through its CLI.
///
/// Generic over `R: CommandRunner` so that tests can inject a scripted runner
/// without spawning real processes. The runner owns the working directory.
pub struct TerraformCli<R: CommandRunner> {
    runner: R,
    binary: String,
    var_file: String,
}

impl<R: CommandRunner> TerraformCli<R> {
    /// `var_file` is passed verbatim as `-var-file=<var_file>`, so it must be
    /// relative to the runner's working directory or absolute.
    pub fn new(runner: R, binary: impl Into<String>, var_file: impl Into<String>) -> Self {
        Self {
            runner,
            binary: binary.into(),
            var_file: var_file.into(),
        }
    }

    /// The underlying runner.
    pub fn runner(&self) -> &R {
        &self.runner
    }

    fn var_file_arg(&self) -> String {
        format!("-var-file={}", self.var_file)
    }

    async fn invoke(&self, args: &[&str]) -> ExecutionResult {
        self.invoke_with(args, combined_output).await
    }

    async fn invoke_with(&self, args: &[&str], on_success: fn(&Output) -> String) -> ExecutionResult {
        let result = to_execution_result(self.runner.run(&self.binary, args).await, on_success);
        if !result.success {
            warn!(binary = %self.binary, ?args, error = %result.error, "terraform command failed");
        }
        result
    }
}

/// Combine stdout then stderr into one verbatim string.
fn combined_output(output: &Output) -> String {
    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    text.push_str(&String::from_utf8_lossy(&output.stderr));
    text
}

/// Stdout alone, for commands whose stdout is a machine-readable document.
fn stdout_only(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

/// Nonzero exit keeps the raw combined output; spawn, timeout, and
/// cancellation errors have no output at all.
fn to_execution_result(result: Result<Output>, on_success: fn(&Output) -> String) -> ExecutionResult {
    match result {
        Ok(output) if output.status.success() => ExecutionResult::succeeded(on_success(&output)),
        Ok(output) => ExecutionResult::failed(combined_output(&output), output.status.to_string()),
        Err(e) => ExecutionResult::failed(String::new(), format!("{e:#}")),
    }
}

impl<R: CommandRunner> ProvisioningTool for TerraformCli<R> {
    async fn init(&self) -> ExecutionResult {
        self.invoke(&["init", "-input=false", "-no-color"]).await
    }

    async fn validate(&self) -> ExecutionResult {
        self.invoke(&["validate", "-no-color"]).await
    }

    async fn plan(&self) -> ExecutionResult {
        let var_file = self.var_file_arg();
        self.invoke(&["plan", "-input=false", "-no-color", &var_file])
            .await
    }

    async fn apply(&self) -> ExecutionResult {
        let var_file = self.var_file_arg();
        self.invoke(&["apply", "-auto-approve", "-input=false", "-no-color", &var_file])
            .await
    }

    async fn destroy(&self) -> ExecutionResult {
        let var_file = self.var_file_arg();
        self.invoke(&["destroy", "-auto-approve", "-input=false", "-no-color", &var_file])
            .await
    }

    /// Warnings on stderr must not corrupt the JSON document, so a
    /// successful `show` reports stdout only.
    async fn show_json(&self) -> ExecutionResult {
        self.invoke_with(&["show", "-json"], stdout_only).await
    }

    async fn state_list(&self) -> ExecutionResult {
        self.invoke(&["state", "list"]).await
    }

    async fn workspace_list(&self) -> ExecutionResult {
        self.invoke(&["workspace", "list"]).await
    }

    async fn workspace_select(&self, name: &str) -> ExecutionResult {
        self.invoke(&["workspace", "select", name]).await
    }

    async fn workspace_new(&self, name: &str) -> ExecutionResult {
        self.invoke(&["workspace", "new", name]).await
    }

    async fn workspace_delete(&self, name: &str, force: bool) -> ExecutionResult {
        if force {
            self.invoke(&["workspace", "delete", "-force", name]).await
        } else {
            self.invoke(&["workspace", "delete", name]).await
        }
    }
}
