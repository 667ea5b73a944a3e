//! YAML configuration loading.
//!
//! Resolution order: explicit `--config` path, then `TFPROBE_CONFIG`, then
//! `./tfprobe.yaml`, then built-in defaults. An explicitly named file must
//! exist; the implicit `./tfprobe.yaml` is optional.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use crate::domain::config::{HarnessConfig, validate_config};
use crate::domain::error::ConfigError;

/// Environment variable naming a config file.
pub const CONFIG_ENV: &str = "TFPROBE_CONFIG";
/// Config file picked up from the current directory when present.
pub const DEFAULT_CONFIG_FILE: &str = "tfprobe.yaml";

/// Production config loader backed by a YAML file on disk.
pub struct YamlConfigStore {
    explicit: Option<PathBuf>,
}

impl YamlConfigStore {
    #[must_use]
    pub fn new(explicit: Option<PathBuf>) -> Self {
        Self { explicit }
    }

    /// The file that will be read, if any, and whether it must exist.
    #[must_use]
    pub fn path(&self) -> Option<(PathBuf, bool)> {
        if let Some(path) = &self.explicit {
            return Some((path.clone(), true));
        }
        if let Ok(val) = std::env::var(CONFIG_ENV)
            && !val.is_empty()
        {
            return Some((PathBuf::from(val), true));
        }
        let local = PathBuf::from(DEFAULT_CONFIG_FILE);
        local.exists().then_some((local, false))
    }

    /// Load and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if a named file is missing, unreadable, malformed,
    /// or holds invalid values.
    pub fn load(&self) -> Result<HarnessConfig> {
        let config = match self.path() {
            Some((path, required)) => {
                if !path.exists() {
                    if required {
                        return Err(ConfigError::NotFound(path.display().to_string()).into());
                    }
                    HarnessConfig::default()
                } else {
                    read_config(&path)?
                }
            }
            None => {
                debug!("no config file, using defaults");
                HarnessConfig::default()
            }
        };
        validate_config(&config)?;
        Ok(config)
    }
}

fn read_config(path: &Path) -> Result<HarnessConfig> {
    debug!(path = %path.display(), "loading config");
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))?;
    serde_yaml::from_str(&content).with_context(|| format!("cannot parse {}", path.display()))
}
