//! Filesystem infrastructure — implements `VarFileStore`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::debug;

use crate::application::ports::VarFileStore;

/// Writes the generated variables file to a fixed path.
pub struct LocalVarFile {
    path: PathBuf,
}

impl LocalVarFile {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl VarFileStore for LocalVarFile {
    fn write_var_file(&self, contents: &str) -> Result<PathBuf> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating directory {}", parent.display()))?;
        }
        std::fs::write(&self.path, contents)
            .with_context(|| format!("writing file {}", self.path.display()))?;
        debug!(path = %self.path.display(), bytes = contents.len(), "wrote variables file");
        Ok(self.path.clone())
    }
}
