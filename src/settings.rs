use crate::dashboard::{DashboardController, JsonFileStore, PersistenceAdapter, STORAGE_KEY};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const APP_DIR_NAME: &str = "dashboard_builder";
const FALLBACK_STORAGE_DIR: &str = "dashboard_data";

fn default_storage_key() -> String {
    STORAGE_KEY.into()
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Settings {
    /// When enabled the logger starts at debug level and honours `RUST_LOG`.
    #[serde(default)]
    pub debug_logging: bool,
    /// Optional file receiving log output instead of stdout.
    #[serde(default)]
    pub log_file: Option<String>,
    /// Folder holding the saved dashboard. If `None`, the platform config
    /// directory is used.
    #[serde(default)]
    pub storage_dir: Option<String>,
    /// Key the dashboard is stored under.
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug_logging: false,
            log_file: None,
            storage_dir: None,
            storage_key: default_storage_key(),
        }
    }
}

impl Settings {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path).unwrap_or_default();
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(&content).with_context(|| format!("parse settings file {path}"))
    }

    pub fn save(&self, path: &str) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).with_context(|| format!("write settings file {path}"))?;
        Ok(())
    }

    pub fn resolve_storage_dir(&self) -> PathBuf {
        if let Some(dir) = self.storage_dir.as_deref().filter(|d| !d.trim().is_empty()) {
            return PathBuf::from(dir);
        }
        match dirs_next::config_dir() {
            Some(base) => base.join(APP_DIR_NAME),
            None => {
                tracing::warn!("no platform config directory; storing dashboard locally");
                PathBuf::from(FALLBACK_STORAGE_DIR)
            }
        }
    }

    pub fn log_path(&self) -> Option<PathBuf> {
        self.log_file
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from)
    }

    pub fn open_store(&self) -> JsonFileStore {
        JsonFileStore::new(self.resolve_storage_dir())
    }

    /// Dashboard backed by the configured file store, starting from the saved
    /// layout when one exists.
    pub fn open_dashboard(&self) -> DashboardController<JsonFileStore> {
        let adapter = PersistenceAdapter::with_key(self.open_store(), self.storage_key.clone());
        DashboardController::open(adapter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"debug_logging": true}"#).unwrap();
        assert!(settings.debug_logging);
        assert_eq!(settings.storage_key, STORAGE_KEY);
        assert_eq!(settings.storage_dir, None);
    }

    #[test]
    fn explicit_storage_dir_wins() {
        let settings = Settings {
            storage_dir: Some("/tmp/dash".into()),
            ..Settings::default()
        };
        assert_eq!(settings.resolve_storage_dir(), PathBuf::from("/tmp/dash"));
    }

    #[test]
    fn blank_log_file_means_no_file() {
        let settings = Settings {
            log_file: Some("  ".into()),
            ..Settings::default()
        };
        assert_eq!(settings.log_path(), None);
    }
}
