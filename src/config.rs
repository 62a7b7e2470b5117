//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and `MATCHSTATS_*` environment overrides.

use crate::stats::DEFAULT_LIMIT;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub query: QueryConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Which store the statistics queries run against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Records loaded from `data_file` and evaluated in process
    #[default]
    Memory,
    /// A MongoDB collection (requires the `mongodb` cargo feature)
    Mongodb,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "mongodb" | "mongo" => Ok(Self::Mongodb),
            other => Err(format!("unknown store backend: {}", other)),
        }
    }
}

/// Match store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,

    #[serde(default = "default_data_file")]
    pub data_file: String,

    #[serde(default = "default_mongodb_uri")]
    pub mongodb_uri: String,

    #[serde(default = "default_database")]
    pub database: String,

    #[serde(default = "default_collection")]
    pub collection: String,
}

fn default_data_file() -> String {
    dirs::data_local_dir()
        .map(|p| p.join("matchstats").join("matches.json"))
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|| "./matches.json".to_string())
}

fn default_mongodb_uri() -> String {
    "mongodb://localhost:27017".to_string()
}

fn default_database() -> String {
    "matchstats".to_string()
}

fn default_collection() -> String {
    "matches".to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            data_file: default_data_file(),
            mongodb_uri: default_mongodb_uri(),
            database: default_database(),
            collection: default_collection(),
        }
    }
}

/// Query defaults
#[derive(Debug, Clone, Deserialize)]
pub struct QueryConfig {
    /// Champions returned by champion stats when no limit is given
    #[serde(default = "default_limit")]
    pub default_limit: u64,
}

fn default_limit() -> u64 {
    DEFAULT_LIMIT
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,

    pub file: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        config.validate().map_err(|error| ConfigError::Invalid {
            path: path.to_path_buf(),
            error,
        })?;

        Ok(config)
    }

    /// Check values that deserialize fine but cannot be used
    pub fn validate(&self) -> Result<(), String> {
        if self.query.default_limit == 0 {
            return Err("query.default_limit must be a positive integer".to_string());
        }
        Ok(())
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("matchstats").join("config.toml")),
            Some(PathBuf::from("/etc/matchstats/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::info!(path = ?path, "Loaded config");
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!(path = ?path, error = %e, "Failed to load config");
                    }
                }
            }
        }

        tracing::debug!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any key lookup; unparsable values are ignored
    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        // Store overrides
        if let Some(backend) = var("MATCHSTATS_STORE_BACKEND") {
            match backend.parse() {
                Ok(b) => self.store.backend = b,
                Err(e) => tracing::warn!(error = %e, "Ignoring MATCHSTATS_STORE_BACKEND"),
            }
        }
        if let Some(data_file) = var("MATCHSTATS_DATA_FILE") {
            self.store.data_file = data_file;
        }
        if let Some(uri) = var("MATCHSTATS_MONGODB_URI") {
            self.store.mongodb_uri = uri;
        }

        // Query overrides
        if let Some(limit) = var("MATCHSTATS_DEFAULT_LIMIT") {
            match limit.parse::<u64>() {
                Ok(l) if l > 0 => self.query.default_limit = l,
                _ => tracing::warn!(value = %limit, "Ignoring MATCHSTATS_DEFAULT_LIMIT"),
            }
        }

        // Logging overrides
        if let Some(level) = var("MATCHSTATS_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("MATCHSTATS_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },

    #[error("Invalid config file {path:?}: {error}")]
    Invalid { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# matchstats Configuration
#
# Environment variables override these settings:
# - MATCHSTATS_STORE_BACKEND
# - MATCHSTATS_DATA_FILE
# - MATCHSTATS_MONGODB_URI
# - MATCHSTATS_DEFAULT_LIMIT
# - MATCHSTATS_LOG_LEVEL
# - MATCHSTATS_LOG_FORMAT

[store]
# Where match records live: "memory" or "mongodb"
backend = "memory"

# JSON array or JSON-lines file loaded by the memory backend
data_file = "~/.local/share/matchstats/matches.json"

# MongoDB connection (backend = "mongodb")
mongodb_uri = "mongodb://localhost:27017"
database = "matchstats"
collection = "matches"

[query]
# Champions returned by champion stats when no limit is given
default_limit = 5

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"

# Optional log file path
# file = "/var/log/matchstats/matchstats.log"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config_parses() {
        let config: Config = toml::from_str(&generate_default_config()).unwrap();
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert_eq!(config.store.collection, "matches");
        assert_eq!(config.query.default_limit, 5);
        assert_eq!(config.logging.format, "pretty");
        assert!(config.logging.file.is_none());
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[store]\nbackend = \"mongodb\"\n\n[query]\ndefault_limit = 10").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.store.backend, StoreBackend::Mongodb);
        assert_eq!(config.store.database, "matchstats");
        assert_eq!(config.query.default_limit, 10);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_load_errors() {
        let err = Config::load(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));

        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[store\nbackend = ").unwrap();
        let err = Config::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("MATCHSTATS_STORE_BACKEND", "mongo"),
            ("MATCHSTATS_DATA_FILE", "/tmp/m.jsonl"),
            ("MATCHSTATS_DEFAULT_LIMIT", "8"),
            ("MATCHSTATS_LOG_FORMAT", "json"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(config.store.backend, StoreBackend::Mongodb);
        assert_eq!(config.store.data_file, "/tmp/m.jsonl");
        assert_eq!(config.query.default_limit, 8);
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_invalid_overrides_ignored() {
        let mut config = Config::default();
        config.apply_overrides(|k| match k {
            "MATCHSTATS_STORE_BACKEND" => Some("sqlite".to_string()),
            "MATCHSTATS_DEFAULT_LIMIT" => Some("0".to_string()),
            _ => None,
        });

        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert_eq!(config.query.default_limit, DEFAULT_LIMIT);
    }

    #[test]
    fn test_zero_default_limit_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[query]\ndefault_limit = 0").unwrap();

        let err = Config::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
        assert!(err.to_string().contains("query.default_limit"));

        let err = Config::load_with_env(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }
}
