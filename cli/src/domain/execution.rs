//! Uniform result of a provisioning-tool invocation.

use serde::Serialize;

use crate::domain::error::ToolInvocationError;

/// Outcome of one tool command. Produced once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionResult {
    /// Whether the tool exited with status 0.
    pub success: bool,
    /// Combined stdout and stderr, verbatim.
    pub output: String,
    /// Process-level error text; empty on success.
    pub error: String,
}

impl ExecutionResult {
    #[must_use]
    pub fn succeeded(output: impl Into<String>) -> Self {
        Self {
            success: true,
            output: output.into(),
            error: String::new(),
        }
    }

    #[must_use]
    pub fn failed(output: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            output: output.into(),
            error: error.into(),
        }
    }

    /// Convert an unsuccessful result into a typed error for `command`.
    ///
    /// # Errors
    ///
    /// Returns `ToolInvocationError` carrying the raw output when
    /// `success` is false.
    pub fn into_checked(self, command: &str) -> Result<Self, ToolInvocationError> {
        if self.success {
            Ok(self)
        } else {
            Err(ToolInvocationError {
                command: command.to_string(),
                output: self.output,
                error: self.error,
            })
        }
    }
}
