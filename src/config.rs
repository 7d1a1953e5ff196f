//! Runtime configuration shared by the binaries
//!
//! Resolved once from command-line arguments or environment and passed
//! explicitly into the dispatcher. Nothing below this layer reads the
//! environment.

use std::path::{Path, PathBuf};

use crate::error::SheetResult;

/// Environment variable naming the documents root.
pub const ROOT_ENV: &str = "EXCEL_FILES_DIR";

/// Root used when neither `--root` nor `EXCEL_FILES_DIR` is set.
pub const DEFAULT_ROOT: &str = "./excel_files";

/// Where documents live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceConfig {
    pub root_dir: PathBuf,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from(DEFAULT_ROOT),
        }
    }
}

impl WorkspaceConfig {
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root_dir
    }

    /// Create the root directory if it does not exist yet.
    pub fn prepare(&self) -> SheetResult<()> {
        std::fs::create_dir_all(&self.root_dir)?;
        Ok(())
    }
}
