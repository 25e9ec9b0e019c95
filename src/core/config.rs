//! Configuration management with layered hierarchy

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::core::workspace::Workspace;

/// Default database location inside a workspace
pub const DEFAULT_DATABASE: &str = ".fleet/vehicles.db";
/// Default report output directory inside a workspace
pub const DEFAULT_REPORTS_DIR: &str = "reports";
/// Default logo location inside a workspace
pub const DEFAULT_LOGO: &str = ".fleet/logo.png";
/// Organization printed in report footers when none is configured
pub const DEFAULT_ORGANIZATION: &str = "Care Services Consortium";
/// Product label printed in report footers
pub const PRODUCT_LABEL: &str = "Vehicle Management System";
/// Log filter used when nothing else is configured
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Fleet configuration with layered hierarchy
#[derive(Debug, Default, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// SQLite database file
    pub database: Option<PathBuf>,

    /// Directory receiving generated reports
    pub reports_dir: Option<PathBuf>,

    /// Report header logo
    pub logo: Option<PathBuf>,

    /// Organization shown in report footers
    pub organization: Option<String>,

    /// Log filter directive
    pub log_level: Option<String>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load(workspace: Option<&Workspace>) -> Self {
        let mut config = Config::default();

        // 1. Built-in defaults (resolved lazily by the accessors)

        // 2. Global user config (~/.config/fleet/config.yaml)
        if let Some(global_path) = Self::global_config_path() {
            if let Some(global) = Self::read_file(&global_path) {
                config.merge(global);
            }
        }

        // 3. Workspace config (.fleet/config.yaml)
        if let Some(workspace) = workspace {
            if let Some(local) = Self::read_file(&workspace.config_path()) {
                config.merge(local);
            }
        }

        // 4. Environment variables
        if let Ok(database) = std::env::var("FLEET_DATABASE") {
            config.database = Some(PathBuf::from(database));
        }
        if let Ok(reports_dir) = std::env::var("FLEET_REPORTS_DIR") {
            config.reports_dir = Some(PathBuf::from(reports_dir));
        }
        if let Ok(logo) = std::env::var("FLEET_LOGO") {
            config.logo = Some(PathBuf::from(logo));
        }
        if let Ok(organization) = std::env::var("FLEET_ORGANIZATION") {
            config.organization = Some(organization);
        }

        config
    }

    /// Parse one config file; unreadable or malformed files are skipped
    fn read_file(path: &Path) -> Option<Config> {
        if !path.exists() {
            return None;
        }
        let contents = std::fs::read_to_string(path).ok()?;
        match serde_yml::from_str::<Config>(&contents) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "ignoring malformed config file"
                );
                None
            }
        }
    }

    /// Get the path to the global config file
    fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "fleet")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.database.is_some() {
            self.database = other.database;
        }
        if other.reports_dir.is_some() {
            self.reports_dir = other.reports_dir;
        }
        if other.logo.is_some() {
            self.logo = other.logo;
        }
        if other.organization.is_some() {
            self.organization = other.organization;
        }
        if other.log_level.is_some() {
            self.log_level = other.log_level;
        }
    }

    pub fn database_path(&self, workspace: &Workspace) -> PathBuf {
        workspace.resolve(
            self.database
                .as_deref()
                .unwrap_or_else(|| Path::new(DEFAULT_DATABASE)),
        )
    }

    pub fn reports_dir(&self, workspace: &Workspace) -> PathBuf {
        workspace.resolve(
            self.reports_dir
                .as_deref()
                .unwrap_or_else(|| Path::new(DEFAULT_REPORTS_DIR)),
        )
    }

    pub fn logo_path(&self, workspace: &Workspace) -> PathBuf {
        workspace.resolve(self.logo.as_deref().unwrap_or_else(|| Path::new(DEFAULT_LOGO)))
    }

    pub fn organization(&self) -> &str {
        self.organization.as_deref().unwrap_or(DEFAULT_ORGANIZATION)
    }

    /// Footer label printed on every report page
    pub fn footer_label(&self) -> String {
        format!("{} | {}", PRODUCT_LABEL, self.organization())
    }

    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_resolve_inside_workspace() {
        let tmp = tempdir().unwrap();
        let workspace = Workspace::init(tmp.path()).unwrap();
        let config = Config::default();

        assert_eq!(
            config.database_path(&workspace),
            workspace.root().join(".fleet/vehicles.db")
        );
        assert_eq!(config.reports_dir(&workspace), workspace.root().join("reports"));
        assert_eq!(config.logo_path(&workspace), workspace.root().join(".fleet/logo.png"));
        assert_eq!(
            config.footer_label(),
            "Vehicle Management System | Care Services Consortium"
        );
        assert_eq!(config.log_level(), "warn");
    }

    #[test]
    fn test_merge_prefers_other() {
        let mut base = Config {
            organization: Some("Old Org".to_string()),
            log_level: Some("info".to_string()),
            ..Default::default()
        };
        base.merge(Config {
            organization: Some("New Org".to_string()),
            ..Default::default()
        });

        assert_eq!(base.organization(), "New Org");
        assert_eq!(base.log_level(), "info");
    }

    #[test]
    fn test_workspace_config_file_is_read() {
        let tmp = tempdir().unwrap();
        let workspace = Workspace::init(tmp.path()).unwrap();
        std::fs::write(
            workspace.config_path(),
            "reports_dir: out/pdf\norganization: Faisalabad Depot\n",
        )
        .unwrap();

        let config = Config::read_file(&workspace.config_path()).unwrap();
        assert_eq!(config.reports_dir(&workspace), workspace.root().join("out/pdf"));
        assert_eq!(config.organization(), "Faisalabad Depot");
    }

    #[test]
    fn test_malformed_config_is_skipped() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("config.yaml");
        std::fs::write(&path, "database: [unclosed").unwrap();
        assert!(Config::read_file(&path).is_none());
    }
}
