//! Domain types and validators for tfprobe configuration.
//!
//! Pure functions only — no I/O, no async, no filesystem access.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::domain::error::ConfigError;

// ── Config schema ────────────────────────────────────────────────────────────

/// Top-level configuration stored in `tfprobe.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Provisioning tool settings.
    pub terraform: TerraformConfig,
    /// Check execution settings.
    pub checks: ChecksConfig,
    /// Cloud inventory settings.
    pub aws: AwsConfig,
    /// Directory holding YAML test cases.
    pub test_cases_dir: PathBuf,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            terraform: TerraformConfig::default(),
            checks: ChecksConfig::default(),
            aws: AwsConfig::default(),
            test_cases_dir: PathBuf::from("test-cases"),
        }
    }
}

/// Terraform invocation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TerraformConfig {
    /// Binary to invoke (`terraform`, `tofu`, or an absolute path).
    pub binary: String,
    /// Directory holding the root module; every command runs here.
    pub working_dir: PathBuf,
    /// Variables file name, relative to `working_dir`.
    pub var_file: String,
    /// Deadline for a single command, in seconds.
    pub command_timeout_secs: u64,
}

impl Default for TerraformConfig {
    fn default() -> Self {
        Self {
            binary: "terraform".to_string(),
            working_dir: PathBuf::from("terraform/base"),
            var_file: "generated.tfvars".to_string(),
            command_timeout_secs: 1800,
        }
    }
}

impl TerraformConfig {
    #[must_use]
    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }

    /// Absolute-or-relative path of the variables file on disk.
    #[must_use]
    pub fn var_file_path(&self) -> PathBuf {
        self.working_dir.join(&self.var_file)
    }
}

/// Check executor settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChecksConfig {
    /// Deadline for a single check, in seconds.
    pub timeout_secs: u64,
}

impl Default for ChecksConfig {
    fn default() -> Self {
        Self { timeout_secs: 120 }
    }
}

impl ChecksConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// AWS CLI settings for inventory lookups.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AwsConfig {
    pub binary: String,
    pub region: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
}

impl Default for AwsConfig {
    fn default() -> Self {
        Self {
            binary: "aws".to_string(),
            region: "eu-north-1".to_string(),
            profile: None,
        }
    }
}

// ── Validators ───────────────────────────────────────────────────────────────

/// Reject settings that would make every run fail.
///
/// # Errors
///
/// Returns an error naming the first invalid setting.
pub fn validate_config(config: &HarnessConfig) -> Result<()> {
    if config.terraform.binary.trim().is_empty() {
        return Err(ConfigError::InvalidValue {
            key: "terraform.binary",
            reason: "must not be empty".to_string(),
        }
        .into());
    }
    if config.terraform.var_file.trim().is_empty() {
        return Err(ConfigError::InvalidValue {
            key: "terraform.var_file",
            reason: "must not be empty".to_string(),
        }
        .into());
    }
    if config.terraform.command_timeout_secs == 0 {
        return Err(ConfigError::InvalidValue {
            key: "terraform.command_timeout_secs",
            reason: "must be greater than zero".to_string(),
        }
        .into());
    }
    if config.checks.timeout_secs == 0 {
        return Err(ConfigError::InvalidValue {
            key: "checks.timeout_secs",
            reason: "must be greater than zero".to_string(),
        }
        .into());
    }
    Ok(())
}

// ── Unit tests ───────────────────────────────────────────────────────────────
