//! Configuration management for zero-search
//!
//! Loads the TOML configuration, applies `ZERO_SECTION__KEY` environment
//! overrides and validates the result before anything else is constructed.

use crate::error::{Result, ZeroError};
use crate::filtering::FilterConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

mod validator;

pub use validator::ConfigValidator;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(rename = "_meta")]
    pub meta: MetaConfig,
    pub storage: StorageConfig,
    pub trackers: TrackersConfig,
    pub filter: FilterConfig,
    pub feedback: FeedbackConfig,
}

/// Metadata about the configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaConfig {
    pub schema_version: String,
    #[serde(default = "current_timestamp")]
    pub created_at: String,
    #[serde(default = "current_timestamp")]
    pub last_modified: String,
}

fn current_timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Result store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub db_path: PathBuf,
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

fn default_pool_size() -> u32 {
    16
}

fn default_busy_timeout_ms() -> u64 {
    5000
}

/// Tracker blacklist location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackersConfig {
    pub blacklist_file: PathBuf,
}

/// Relevance feedback settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackConfig {
    /// Value stored when a result is marked relevant
    pub relevant_value: i64,
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ZeroError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| ZeroError::Io {
            source: e,
            context: format!("Failed to read config file: {:?}", path),
        })?;
        let mut config: Config = toml::from_str(&content)?;

        config.apply_env_overrides();

        ConfigValidator::validate(&config)?;

        Ok(config)
    }

    /// Load from `path`, or fall back to defaults when the file is missing
    ///
    /// Both paths apply environment overrides and validate the result.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::warn!(
                "Config file not found, using defaults. Run 'zero-search config init' to create one."
            );
            return Self::defaults_with_overrides(std::env::vars());
        }

        Self::load(path)
    }

    fn defaults_with_overrides(vars: impl IntoIterator<Item = (String, String)>) -> Result<Self> {
        let mut config = Config::default();
        config.apply_overrides(vars);

        ConfigValidator::validate(&config)?;

        Ok(config)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| ZeroError::Io {
            source: e,
            context: format!("Failed to write config file: {:?}", path),
        })?;
        Ok(())
    }

    /// Apply environment variable overrides
    /// Environment variables in format: ZERO_SECTION__KEY=value
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(std::env::vars());
    }

    fn apply_overrides(&mut self, vars: impl IntoIterator<Item = (String, String)>) {
        for (key, value) in vars {
            if let Some(config_key) = key.strip_prefix("ZERO_") {
                if let Err(e) = self.set_value_from_env(config_key, &value) {
                    tracing::warn!("Failed to apply env override {}: {}", key, e);
                }
            }
        }
    }

    fn set_value_from_env(&mut self, path: &str, value: &str) -> Result<()> {
        match path {
            "STORAGE__DB_PATH" => self.storage.db_path = PathBuf::from(value),
            "STORAGE__POOL_SIZE" => self.storage.pool_size = parse_value(path, value)?,
            "STORAGE__BUSY_TIMEOUT_MS" => {
                self.storage.busy_timeout_ms = parse_value(path, value)?
            }
            "TRACKERS__BLACKLIST_FILE" => self.trackers.blacklist_file = PathBuf::from(value),
            "FILTER__TRACKER_WEIGHT" => self.filter.tracker_weight = parse_value(path, value)?,
            "FILTER__TRACKER_PENALTY" => self.filter.tracker_penalty = parse_value(path, value)?,
            "FILTER__CONTENT_PENALTY" => self.filter.content_penalty = parse_value(path, value)?,
            "FILTER__THIN_CONTENT_RATIO" => {
                self.filter.thin_content_ratio = parse_value(path, value)?
            }
            "FEEDBACK__RELEVANT_VALUE" => {
                self.feedback.relevant_value = parse_value(path, value)?
            }
            _ => {
                tracing::debug!("Unknown env config key: {}", path);
            }
        }
        Ok(())
    }

    /// Get the default configuration file path
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| ZeroError::Config("Cannot determine config directory".to_string()))?;

        Ok(config_dir.join("zero-search").join("config.toml"))
    }
}

fn parse_value<T: std::str::FromStr>(path: &str, value: &str) -> Result<T> {
    value.parse().map_err(|_| ZeroError::InvalidConfigValue {
        path: path.to_string(),
        message: format!("Cannot parse '{}'", value),
    })
}

/// Expand a leading `~` against the home directory
pub fn expand_path(path: &Path) -> Result<PathBuf> {
    match path.strip_prefix("~") {
        Ok(rest) => {
            let home = dirs::home_dir()
                .ok_or_else(|| ZeroError::Config("Cannot determine home directory".to_string()))?;
            Ok(home.join(rest))
        }
        Err(_) => Ok(path.to_path_buf()),
    }
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = PathBuf::from("~/.zero-search");
        let config_dir = PathBuf::from("~/.config/zero-search");

        Self {
            meta: MetaConfig {
                schema_version: "1.0.0".to_string(),
                created_at: current_timestamp(),
                last_modified: current_timestamp(),
            },
            storage: StorageConfig {
                db_path: data_dir.join("links.db"),
                pool_size: default_pool_size(),
                busy_timeout_ms: default_busy_timeout_ms(),
            },
            trackers: TrackersConfig {
                blacklist_file: config_dir.join("blacklist.txt"),
            },
            filter: FilterConfig::default(),
            feedback: FeedbackConfig { relevant_value: 10 },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(ConfigValidator::validate(&config).is_ok());
        assert_eq!(config.filter.tracker_penalty, 20.0);
        assert_eq!(config.feedback.relevant_value, 10);
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");

        let mut config = Config::default();
        config.filter.content_penalty = 35.0;
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.filter.content_penalty, 35.0);
        assert_eq!(loaded.storage.pool_size, 16);
    }

    #[test]
    fn test_load_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let result = Config::load(&temp_dir.path().join("missing.toml"));
        assert!(matches!(result, Err(ZeroError::ConfigNotFound { .. })));
    }

    #[test]
    fn test_overrides() {
        let mut config = Config::default();
        config.apply_overrides(vec![
            ("ZERO_FILTER__TRACKER_PENALTY".to_string(), "50".to_string()),
            ("ZERO_FEEDBACK__RELEVANT_VALUE".to_string(), "3".to_string()),
            ("ZERO_STORAGE__POOL_SIZE".to_string(), "not-a-number".to_string()),
            ("UNRELATED".to_string(), "x".to_string()),
        ]);

        assert_eq!(config.filter.tracker_penalty, 50.0);
        assert_eq!(config.feedback.relevant_value, 3);
        // Unparseable override leaves the previous value in place
        assert_eq!(config.storage.pool_size, 16);
    }

    #[test]
    fn test_defaults_with_overrides_are_validated() {
        let result = Config::defaults_with_overrides(vec![(
            "ZERO_STORAGE__POOL_SIZE".to_string(),
            "0".to_string(),
        )]);
        match result {
            Err(ZeroError::ConfigValidation { errors }) => {
                assert!(errors.iter().any(|e| e.path == "storage.pool_size"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }

        let result = Config::defaults_with_overrides(vec![(
            "ZERO_FILTER__CONTENT_PENALTY".to_string(),
            "NaN".to_string(),
        )]);
        assert!(matches!(result, Err(ZeroError::ConfigValidation { .. })));

        let config = Config::defaults_with_overrides(vec![(
            "ZERO_STORAGE__POOL_SIZE".to_string(),
            "4".to_string(),
        )])
        .unwrap();
        assert_eq!(config.storage.pool_size, 4);
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::load_or_default(&temp_dir.path().join("missing.toml")).unwrap();
        assert_eq!(config.meta.schema_version, "1.0.0");
    }

    #[test]
    fn test_expand_path() {
        let plain = PathBuf::from("/tmp/links.db");
        assert_eq!(expand_path(&plain).unwrap(), plain);

        let home = dirs::home_dir().unwrap();
        let expanded = expand_path(Path::new("~/.zero-search/links.db")).unwrap();
        assert_eq!(expanded, home.join(".zero-search/links.db"));
    }
}
