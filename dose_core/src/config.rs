//! Configuration file support for dosetrack.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/dosetrack/config.toml`.

use crate::{build_default_regimen, CalendarDay, Error, RegimenRuleSet, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub regimen: RegimenConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Regimen parameters
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RegimenConfig {
    /// First day of the phased course (`YYYY-MM-DD`)
    #[serde(default = "default_start_date")]
    pub start_date: CalendarDay,
}

impl Default for RegimenConfig {
    fn default() -> Self {
        Self {
            start_date: default_start_date(),
        }
    }
}

// Default value functions
fn home_dir_fallback(suffix: &str) -> PathBuf {
    std::env::var_os("HOME")
        .map(|home| PathBuf::from(home).join(suffix))
        .unwrap_or_else(|| PathBuf::from("."))
}

fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| home_dir_fallback(".local/share"));
    base.join("dosetrack")
}

fn default_start_date() -> CalendarDay {
    CalendarDay::from_ymd(2025, 11, 22).expect("Will never fail.")
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| home_dir_fallback(".config"));
        base.join("dosetrack").join("config.toml")
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }

    /// Build the regimen this configuration describes
    pub fn build_regimen(&self) -> RegimenRuleSet {
        build_default_regimen(self.regimen.start_date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.regimen.start_date.to_string(), "2025-11-22");
        assert!(config.data.data_dir.ends_with("dosetrack"));
    }

    #[test]
    fn test_config_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("dosetrack").join("config.toml");

        let mut config = Config::default();
        config.regimen.start_date = "2026-01-05".parse().unwrap();
        config.data.data_dir = temp_dir.path().join("data");
        config.save_to(&path).unwrap();

        let parsed = Config::load_from(&path).unwrap();
        assert_eq!(parsed.regimen.start_date, config.regimen.start_date);
        assert_eq!(parsed.data.data_dir, config.data.data_dir);
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[regimen]
start_date = "2026-02-01"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.regimen.start_date.to_string(), "2026-02-01");
        assert!(config.data.data_dir.ends_with("dosetrack")); // default
    }

    #[test]
    fn test_invalid_start_date_rejected() {
        let toml_str = r#"
[regimen]
start_date = "February first"
"#;
        assert!(toml::from_str::<Config>(toml_str).is_err());
    }

    #[test]
    fn test_build_regimen_uses_start_date() {
        let mut config = Config::default();
        config.regimen.start_date = "2026-01-03".parse().unwrap();
        let regimen = config.build_regimen();

        // Saturday start day carries the course's first doses
        let start = config.regimen.start_date;
        assert_eq!(regimen.obligations_for(start).len(), 3);
        assert_eq!(regimen.obligations_for(start.add_days(-7)).len(), 1);
    }
}
