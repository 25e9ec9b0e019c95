//! Workspace discovery and structure
//!
//! A workspace is any directory holding a `.fleet/` folder. The folder
//! carries the workspace config, the vehicle database and the report logo.

use miette::Diagnostic;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the marker directory
pub const FLEET_DIR: &str = ".fleet";

/// Represents a fleet workspace
#[derive(Debug, Clone)]
pub struct Workspace {
    /// Root directory of the workspace (parent of .fleet/)
    root: PathBuf,
}

impl Workspace {
    /// Find the workspace root by walking up from the current directory
    pub fn discover() -> Result<Self, WorkspaceError> {
        let current = std::env::current_dir()
            .map_err(|e| WorkspaceError::IoError(e.to_string()))?;
        Self::discover_from(&current)
    }

    /// Find the workspace root by walking up from the given directory
    pub fn discover_from(start: &Path) -> Result<Self, WorkspaceError> {
        let mut current = start
            .canonicalize()
            .map_err(|e| WorkspaceError::IoError(format!("{}: {}", start.display(), e)))?;

        loop {
            if current.join(FLEET_DIR).is_dir() {
                return Ok(Self { root: current });
            }

            if !current.pop() {
                return Err(WorkspaceError::NotFound {
                    searched_from: start.to_path_buf(),
                });
            }
        }
    }

    /// Use an explicit workspace path when given, otherwise discover one
    pub fn locate(explicit: Option<&Path>) -> Result<Self, WorkspaceError> {
        match explicit {
            Some(path) => Self::discover_from(path),
            None => Self::discover(),
        }
    }

    /// Create a new workspace at the given path
    pub fn init(path: &Path) -> Result<Self, WorkspaceError> {
        let root = path
            .canonicalize()
            .unwrap_or_else(|_| path.to_path_buf());

        if root.join(FLEET_DIR).exists() {
            return Err(WorkspaceError::AlreadyExists(root));
        }

        Self::create_structure(root)
    }

    /// Initialize even if .fleet/ exists; the config file is rewritten,
    /// the database is left alone
    pub fn init_force(path: &Path) -> Result<Self, WorkspaceError> {
        let root = path
            .canonicalize()
            .unwrap_or_else(|_| path.to_path_buf());

        Self::create_structure(root)
    }

    fn create_structure(root: PathBuf) -> Result<Self, WorkspaceError> {
        let fleet_dir = root.join(FLEET_DIR);
        std::fs::create_dir_all(&fleet_dir)
            .map_err(|e| WorkspaceError::IoError(e.to_string()))?;

        std::fs::write(fleet_dir.join("config.yaml"), Self::default_config())
            .map_err(|e| WorkspaceError::IoError(e.to_string()))?;

        Ok(Self { root })
    }

    fn default_config() -> &'static str {
        r#"# Fleet workspace configuration
# Relative paths are resolved against the workspace root.

# SQLite database holding the vehicle records
# database: .fleet/vehicles.db

# Directory that receives generated PDF reports
# reports_dir: reports

# Logo shown in the report header (PNG); omitted when missing
# logo: .fleet/logo.png

# Organization printed in the report footer
# organization: "Care Services Consortium"

# Log filter (error, warn, info, debug, trace)
# log_level: warn
"#
    }

    /// Get the workspace root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the .fleet directory
    pub fn fleet_dir(&self) -> PathBuf {
        self.root.join(FLEET_DIR)
    }

    /// Get the workspace config file path
    pub fn config_path(&self) -> PathBuf {
        self.fleet_dir().join("config.yaml")
    }

    /// Resolve a possibly relative path against the workspace root
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

/// Errors that can occur during workspace operations
#[derive(Debug, Error, Diagnostic)]
pub enum WorkspaceError {
    #[error("not a fleet workspace (searched from {searched_from:?})")]
    #[diagnostic(
        code(fleet::workspace::not_found),
        help("run 'fleet init' to create one, or pass --workspace")
    )]
    NotFound { searched_from: PathBuf },

    #[error("fleet workspace already exists at {0:?}")]
    #[diagnostic(code(fleet::workspace::exists))]
    AlreadyExists(PathBuf),

    #[error("IO error: {0}")]
    #[diagnostic(code(fleet::workspace::io))]
    IoError(String),
}
