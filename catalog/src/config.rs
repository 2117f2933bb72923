//! Service Configuration
//!
//! Where the catalog keeps its database and log files. Loaded from a JSON
//! file or from `CATALOG_*` environment variables; missing fields fall back
//! to defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const ENV_DB_PATH: &str = "CATALOG_DB_PATH";
pub const ENV_LOG_DIR: &str = "CATALOG_LOG_DIR";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// SQLite file, or `:memory:`
    pub db_path: PathBuf,
    pub log_dir: PathBuf,
    /// Used as the log file stem
    pub app_name: String,
    /// Size at which the log file is rotated
    pub log_max_bytes: u64,
    /// Rotated files kept next to the active one
    pub log_max_files: usize,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("book_catalog.db"),
            log_dir: PathBuf::from("logs"),
            app_name: "BookCatalog".to_string(),
            log_max_bytes: 5 * 1024 * 1024,
            log_max_files: 5,
        }
    }
}

impl CatalogConfig {
    /// Read configuration from a JSON file
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config {}: {}", path.display(), e))?;
        serde_json::from_str(&content).map_err(|e| format!("Invalid config: {}", e))
    }

    /// Write configuration as pretty JSON
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let content = serde_json::to_string_pretty(self).map_err(|e| e.to_string())?;
        std::fs::write(path, content)
            .map_err(|e| format!("Failed to write config {}: {}", path.display(), e))
    }

    /// Defaults overridden by process environment
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply `CATALOG_*` overrides from any key lookup
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(db_path) = lookup(ENV_DB_PATH).filter(|v| !v.is_empty()) {
            self.db_path = PathBuf::from(db_path);
        }
        if let Some(log_dir) = lookup(ENV_LOG_DIR).filter(|v| !v.is_empty()) {
            self.log_dir = PathBuf::from(log_dir);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_fills_missing_fields_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(&path, r#"{ "db_path": "/var/lib/catalog.db" }"#).unwrap();

        let config = CatalogConfig::load(&path).unwrap();
        assert_eq!(config.db_path, PathBuf::from("/var/lib/catalog.db"));
        assert_eq!(config.app_name, "BookCatalog");
        assert_eq!(config.log_max_files, 5);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");

        let config = CatalogConfig {
            app_name: "Branch".to_string(),
            log_max_bytes: 1024,
            ..CatalogConfig::default()
        };
        config.save(&path).unwrap();

        assert_eq!(CatalogConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_load_rejects_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(CatalogConfig::load(&path).unwrap_err().starts_with("Invalid config"));
        assert!(CatalogConfig::load(&dir.path().join("missing.json")).is_err());
    }

    #[test]
    fn test_overrides() {
        let config = CatalogConfig::default().with_overrides(|key| match key {
            ENV_DB_PATH => Some(":memory:".to_string()),
            ENV_LOG_DIR => Some(String::new()),
            _ => None,
        });

        assert_eq!(config.db_path, PathBuf::from(":memory:"));
        assert_eq!(config.log_dir, PathBuf::from("logs"));
    }
}
