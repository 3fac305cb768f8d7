//! Project context resolution for rulecast.
//!
//! Commands can run from anywhere inside a project. The context finds the
//! project root (the git toplevel when available, otherwise the starting
//! directory) and derives the canonical locations of the configuration file
//! and the local variable file from it.

use crate::error::{Result, RulecastError};
use crate::git;
use std::env;
use std::path::{Path, PathBuf};

/// Name of the project configuration file, at the project root.
pub const CONFIG_FILE: &str = "rulecast.yaml";

/// Project-local directory for non-versioned state (variable file).
pub const LOCAL_DIR: &str = ".rulecast";

/// Name of the local variable file inside [`LOCAL_DIR`].
pub const VARIABLES_FILE: &str = "variables.yaml";

/// Resolved paths for a rulecast invocation. All paths are absolute.
#[derive(Debug, Clone)]
pub struct ProjectContext {
    /// The project root (git toplevel, else the invocation directory).
    pub root: PathBuf,
}

impl ProjectContext {
    /// Resolve the project context from the current working directory.
    pub fn resolve() -> Result<Self> {
        let cwd = env::current_dir().map_err(|e| {
            RulecastError::UserError(format!("failed to get current working directory: {}", e))
        })?;
        Ok(Self::resolve_from(cwd))
    }

    /// Resolve the project context from a specific directory.
    ///
    /// Useful for testing or when the working directory is known. Never
    /// fails: outside a git repository the directory itself is the root.
    pub fn resolve_from<P: AsRef<Path>>(cwd: P) -> Self {
        let cwd = cwd.as_ref();
        let root = git::toplevel(cwd).unwrap_or_else(|| cwd.to_path_buf());
        let root = root.canonicalize().unwrap_or(root);
        Self { root }
    }

    /// Path to `rulecast.yaml` at the project root.
    pub fn config_path(&self) -> PathBuf {
        self.root.join(CONFIG_FILE)
    }

    /// Path to the local variable file (`.rulecast/variables.yaml`).
    pub fn variables_path(&self) -> PathBuf {
        self.root.join(LOCAL_DIR).join(VARIABLES_FILE)
    }
}
