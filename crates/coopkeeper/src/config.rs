//! Configuration management for coopkeeper.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "coopkeeper";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "flocks.db";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `COOPKEEPER_`)
/// 2. TOML config file at `~/.config/coopkeeper/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Farm configuration.
    pub farm: FarmConfig,
    /// Trend configuration.
    pub trends: TrendsConfig,
    /// Alert configuration.
    pub alerts: AlertsConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/coopkeeper/flocks.db`
    pub database_path: Option<PathBuf>,
}

/// Farm-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FarmConfig {
    /// Number of birds per flock (used for mortality rates).
    pub flock_size: u32,
    /// Known shed/flock identifiers, used as entry hints.
    pub sheds: Vec<String>,
    /// Bird age in days assumed when an entry omits it.
    pub default_bird_age_days: u32,
}

/// Trend-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendsConfig {
    /// Day window for trend queries.
    pub window_days: u32,
}

/// Alert-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertsConfig {
    /// Deaths above this percentage of the flock are critical.
    pub mortality_threshold_pct: f64,
    /// Symptom patterns (regex) that indicate disease onset.
    pub symptom_patterns: Vec<String>,
}

impl Default for FarmConfig {
    fn default() -> Self {
        Self {
            flock_size: 100,
            sheds: vec![
                "Shed1".to_string(),
                "Shed2".to_string(),
                "Shed3".to_string(),
            ],
            default_bird_age_days: 30,
        }
    }
}

impl Default for TrendsConfig {
    fn default() -> Self {
        Self { window_days: 7 }
    }
}

impl Default for AlertsConfig {
    fn default() -> Self {
        Self {
            mortality_threshold_pct: 5.0,
            symptom_patterns: crate::alerts::default_symptom_patterns(),
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// Configuration is loaded in this order (later sources override earlier):
    /// 1. Default values
    /// 2. TOML config file (if exists)
    /// 3. Environment variables (prefixed with `COOPKEEPER_`)
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file).nested())
            .merge(Env::prefixed("COOPKEEPER_").split("_"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.farm.flock_size == 0 {
            return Err(Error::ConfigValidation {
                message: "farm.flock_size must be greater than 0".to_string(),
            });
        }

        if self.trends.window_days == 0 {
            return Err(Error::ConfigValidation {
                message: "trends.window_days must be greater than 0".to_string(),
            });
        }

        if !self.alerts.mortality_threshold_pct.is_finite()
            || !(0.0..=100.0).contains(&self.alerts.mortality_threshold_pct)
        {
            return Err(Error::ConfigValidation {
                message: format!(
                    "alerts.mortality_threshold_pct must be between 0 and 100, got {}",
                    self.alerts.mortality_threshold_pct
                ),
            });
        }

        for pattern in &self.alerts.symptom_patterns {
            if regex::Regex::new(pattern).is_err() {
                return Err(Error::ConfigValidation {
                    message: format!("invalid symptom pattern: {pattern}"),
                });
            }
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Build the alert tunables from this configuration.
    #[must_use]
    pub fn alert_context(&self) -> crate::alerts::AlertContext {
        crate::alerts::AlertContext {
            flock_size: self.farm.flock_size,
            mortality_threshold_pct: self.alerts.mortality_threshold_pct,
            symptoms: crate::alerts::SymptomMatcher::from_patterns(&self.alerts.symptom_patterns),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.farm.flock_size, 100);
        assert_eq!(config.farm.sheds.len(), 3);
        assert_eq!(config.farm.default_bird_age_days, 30);
        assert_eq!(config.trends.window_days, 7);
        assert!((config.alerts.mortality_threshold_pct - 5.0).abs() < f64::EPSILON);
        assert!(!config.alerts.symptom_patterns.is_empty());
    }

    #[test]
    fn test_validate_valid_config() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_zero_flock_size() {
        let mut config = Config::default();
        config.farm.flock_size = 0;

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("flock_size"));
    }

    #[test]
    fn test_validate_zero_window() {
        let mut config = Config::default();
        config.trends.window_days = 0;

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("window_days"));
    }

    #[test]
    fn test_validate_bad_threshold() {
        let mut config = Config::default();
        config.alerts.mortality_threshold_pct = 130.0;
        assert!(config.validate().is_err());

        config.alerts.mortality_threshold_pct = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_invalid_symptom_pattern() {
        let mut config = Config::default();
        config.alerts.symptom_patterns = vec!["[invalid".to_string()];

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("invalid symptom pattern"));
    }

    #[test]
    fn test_database_path_default() {
        let config = Config::default();
        assert!(config
            .database_path()
            .to_string_lossy()
            .contains("flocks.db"));
    }

    #[test]
    fn test_database_path_custom() {
        let mut config = Config::default();
        config.storage.database_path = Some(PathBuf::from("/custom/path/db.sqlite"));

        assert_eq!(
            config.database_path(),
            PathBuf::from("/custom/path/db.sqlite")
        );
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("coopkeeper"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_default_data_dir() {
        let path = Config::default_data_dir();
        assert!(path.to_string_lossy().contains("coopkeeper"));
    }

    #[test]
    fn test_load_nonexistent_config() {
        // Loading from a nonexistent path should work (uses defaults)
        let result = Config::load_from(Some(PathBuf::from("/nonexistent/config.toml")));
        assert!(result.is_ok());

        let config = result.unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_alert_context_from_config() {
        let mut config = Config::default();
        config.farm.flock_size = 500;
        config.alerts.mortality_threshold_pct = 2.5;

        let ctx = config.alert_context();
        assert_eq!(ctx.flock_size, 500);
        assert!((ctx.mortality_threshold_pct - 2.5).abs() < f64::EPSILON);
        assert!(ctx.symptoms.matches("diarrhea"));
    }

    #[test]
    fn test_config_serialize_roundtrip() {
        let config = Config::default();
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("flock_size"));
        assert!(json.contains("window_days"));

        let back: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_farm_config_deserialize_partial() {
        let json = r#"{"flock_size": 250}"#;
        let farm: FarmConfig = serde_json::from_str(json).unwrap();
        assert_eq!(farm.flock_size, 250);
        assert_eq!(farm.sheds.len(), 3);
    }
}
