//! Application configuration management.
//!
//! The configuration holds the record database location, the unit name shown
//! in reports, the validation policy and saved counselor name links.
//!
//! Configuration is stored at `~/.config/meritbadge/config.json`.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::validation::ValidationPolicy;

/// Application name used for config/data directory paths
pub const APP_NAME: &str = "meritbadge";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Environment variable that overrides the database directory
pub const DATABASE_ENV: &str = "MERITBADGE_DATABASE";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub database_path: Option<PathBuf>,
    pub unit_name: Option<String>,
    #[serde(default)]
    pub policy: ValidationPolicy,
    /// Counselor names linked by hand to an adult's BSA number.
    #[serde(default)]
    pub counselor_mappings: BTreeMap<String, String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Apply `MERITBADGE_DATABASE` if it is set and non-empty.
    pub fn apply_env(&mut self) {
        if let Some(dir) = std::env::var_os(DATABASE_ENV).filter(|v| !v.is_empty()) {
            self.database_path = Some(PathBuf::from(dir));
        }
    }

    pub fn database_dir(&self) -> Result<PathBuf> {
        if let Some(ref path) = self.database_path {
            return Ok(path.clone());
        }
        let data_dir =
            dirs::data_dir().ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::Severity;

    #[test]
    fn test_database_dir_prefers_configured_path() {
        let config = Config {
            database_path: Some(PathBuf::from("/tmp/troop-db")),
            ..Config::default()
        };
        assert_eq!(config.database_dir().unwrap(), PathBuf::from("/tmp/troop-db"));
    }

    #[test]
    fn test_parse_config_without_policy() {
        let config: Config = serde_json::from_str(r#"{"unit_name": "Troop 12"}"#).unwrap();
        assert_eq!(config.unit_name.as_deref(), Some("Troop 12"));
        assert_eq!(config.policy, ValidationPolicy::default());
    }

    #[test]
    fn test_parse_config_with_partial_policy() {
        let config: Config =
            serde_json::from_str(r#"{"policy": {"unknown_activity_status": "warning"}}"#).unwrap();
        assert_eq!(config.policy.unknown_activity_status, Severity::Warning);
        assert_eq!(config.policy.max_age, 21);
    }

    #[test]
    fn test_parse_counselor_mappings() {
        let config: Config =
            serde_json::from_str(r#"{"counselor_mappings": {"Coach Bob": "130002"}}"#).unwrap();
        assert_eq!(config.counselor_mappings.get("Coach Bob").map(String::as_str), Some("130002"));
        assert!(Config::default().counselor_mappings.is_empty());
    }
}
