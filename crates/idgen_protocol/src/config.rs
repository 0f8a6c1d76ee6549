//! Runtime configuration shared by the CLI and library callers.
//!
//! Values come from built-in defaults, optionally overlaid by a TOML file.
//! Command-line flags are applied on top by the binary.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::defaults::*;
use crate::paths::default_config_path;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Canonical configuration for one idgen session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdGenConfig {
    /// Digest used for content-hash identifiers (md5, sha1, sha256, blake3)
    #[serde(default = "default_hash_algorithm")]
    pub hash_algorithm: String,

    /// Prefix the salt to every hash input
    #[serde(default = "default_salt_enabled")]
    pub salt_enabled: bool,

    #[serde(default = "default_salt")]
    pub default_salt: String,

    /// Sources yielding more names than this are truncated
    #[serde(default = "default_max_names_count")]
    pub max_names_count: usize,

    #[serde(default = "default_max_file_size_mb")]
    pub max_file_size_mb: u64,

    #[serde(default = "default_csv_delimiter")]
    pub csv_delimiter: char,

    #[serde(default = "default_sequential_prefix")]
    pub sequential_prefix: String,

    #[serde(default = "default_sequential_width")]
    pub sequential_width: usize,
}

fn default_hash_algorithm() -> String {
    DEFAULT_HASH_ALGORITHM.to_string()
}

fn default_salt_enabled() -> bool {
    DEFAULT_SALT_ENABLED
}

fn default_salt() -> String {
    DEFAULT_SALT.to_string()
}

fn default_max_names_count() -> usize {
    DEFAULT_MAX_NAMES_COUNT
}

fn default_max_file_size_mb() -> u64 {
    DEFAULT_MAX_FILE_SIZE_MB
}

fn default_csv_delimiter() -> char {
    DEFAULT_CSV_DELIMITER
}

fn default_sequential_prefix() -> String {
    DEFAULT_SEQUENTIAL_PREFIX.to_string()
}

fn default_sequential_width() -> usize {
    DEFAULT_SEQUENTIAL_WIDTH
}

impl Default for IdGenConfig {
    fn default() -> Self {
        Self {
            hash_algorithm: default_hash_algorithm(),
            salt_enabled: default_salt_enabled(),
            default_salt: default_salt(),
            max_names_count: default_max_names_count(),
            max_file_size_mb: default_max_file_size_mb(),
            csv_delimiter: default_csv_delimiter(),
            sequential_prefix: default_sequential_prefix(),
            sequential_width: default_sequential_width(),
        }
    }
}

impl IdGenConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: IdGenConfig = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve the effective configuration.
    ///
    /// An explicit path must exist. Without one, `~/.idgen/config.toml` is
    /// used when present and built-in defaults otherwise.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let path = default_config_path();
        if path.is_file() {
            return Self::load(&path);
        }
        Ok(Self::default())
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_names_count == 0 {
            return Err(ConfigError::Invalid(
                "max_names_count must be greater than zero".to_string(),
            ));
        }
        if self.max_file_size_mb == 0 {
            return Err(ConfigError::Invalid(
                "max_file_size_mb must be greater than zero".to_string(),
            ));
        }
        if !self.csv_delimiter.is_ascii() || self.csv_delimiter == '"' {
            return Err(ConfigError::Invalid(format!(
                "csv_delimiter must be a single ASCII character other than '\"', got {:?}",
                self.csv_delimiter
            )));
        }
        Ok(())
    }

    /// Salt to prefix hash inputs with, if salting is active.
    pub fn effective_salt(&self) -> Option<&str> {
        if self.salt_enabled && !self.default_salt.is_empty() {
            Some(&self.default_salt)
        } else {
            None
        }
    }

    pub fn max_file_size_bytes(&self) -> u64 {
        self.max_file_size_mb.saturating_mul(1024 * 1024)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = IdGenConfig::default();
        assert_eq!(config.hash_algorithm, "md5");
        assert!(!config.salt_enabled);
        assert_eq!(config.max_names_count, 10_000);
        assert_eq!(config.max_file_size_mb, 50);
        assert_eq!(config.csv_delimiter, ',');
        assert_eq!(config.effective_salt(), None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: IdGenConfig = toml::from_str(
            r#"
            hash_algorithm = "sha256"
            salt_enabled = true
            default_salt = "pepper"
            csv_delimiter = ";"
            "#,
        )
        .unwrap();
        assert_eq!(config.hash_algorithm, "sha256");
        assert_eq!(config.effective_salt(), Some("pepper"));
        assert_eq!(config.csv_delimiter, ';');
        assert_eq!(config.max_names_count, DEFAULT_MAX_NAMES_COUNT);
        assert_eq!(config.sequential_prefix, "ID");
    }

    #[test]
    fn test_salt_enabled_but_empty_is_inactive() {
        let config = IdGenConfig {
            salt_enabled: true,
            ..IdGenConfig::default()
        };
        assert_eq!(config.effective_salt(), None);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let config = IdGenConfig {
            max_names_count: 25,
            ..IdGenConfig::default()
        };
        config.save(&path).unwrap();

        let loaded = IdGenConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let config = IdGenConfig {
            max_names_count: 0,
            ..IdGenConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let config = IdGenConfig {
            csv_delimiter: 'é',
            ..IdGenConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_explicit_missing_path_errors() {
        let dir = tempfile::tempdir().unwrap();
        let err = IdGenConfig::resolve(Some(&dir.path().join("missing.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
