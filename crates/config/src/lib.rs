#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Configuration management for selutils
//!
//! This crate handles loading and merging configuration from:
//! - Default values (hard-coded)
//! - Configuration file (~/.config/selutils/config.toml)
//! - Environment variables
//! - CLI flags (applied by the front end)

use serde::{Deserialize, Serialize};
use selutils_errors::{ConfigError, Error};
use selutils_types::LogFormat;
use std::fs;
use std::path::{Path, PathBuf};

/// Extended attribute holding SELinux labels
pub const DEFAULT_XATTR_NAME: &str = "security.selinux";

/// Same bound the kernel uses before reporting `ELOOP`
pub const DEFAULT_MAX_SYMLINK_CHAIN: usize = 40;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub traversal: TraversalConfig,

    #[serde(default)]
    pub label: LabelConfig,
}

/// General configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[serde(default)]
    pub verbose: bool,
    #[serde(default = "default_log_format")]
    pub log_format: LogFormat,
}

/// Traversal configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraversalConfig {
    #[serde(default)]
    pub preserve_root: bool,
    #[serde(default = "default_max_symlink_chain")]
    pub max_symlink_chain: usize,
    #[serde(default = "default_sort_entries")]
    pub sort_entries: bool,
}

/// Label configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelConfig {
    #[serde(default = "default_xattr_name")]
    pub xattr_name: String,
}

// Default implementations

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            log_format: LogFormat::Plain,
        }
    }
}

impl Default for TraversalConfig {
    fn default() -> Self {
        Self {
            preserve_root: false, // matches --no-preserve-root being the default
            max_symlink_chain: DEFAULT_MAX_SYMLINK_CHAIN,
            sort_entries: true,
        }
    }
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            xattr_name: DEFAULT_XATTR_NAME.to_string(),
        }
    }
}

// Default value functions for serde
fn default_log_format() -> LogFormat {
    LogFormat::Plain
}

fn default_max_symlink_chain() -> usize {
    DEFAULT_MAX_SYMLINK_CHAIN
}

fn default_sort_entries() -> bool {
    true
}

fn default_xattr_name() -> String {
    DEFAULT_XATTR_NAME.to_string()
}

fn parse_bool(field: &str, value: String) -> Result<bool, Error> {
    match value.as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            field: field.to_string(),
            value,
        }
        .into()),
    }
}

impl Config {
    /// Get the default config file path
    ///
    /// # Errors
    ///
    /// Returns an error if the system config directory cannot be determined.
    pub fn default_path() -> Result<PathBuf, Error> {
        let config_dir = dirs::config_dir().ok_or_else(|| ConfigError::NotFound {
            path: "config directory".to_string(),
        })?;
        Ok(config_dir.join("selutils").join("config.toml"))
    }

    /// Load configuration from file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the file contents
    /// contain invalid TOML syntax that cannot be parsed.
    pub fn load_from_file(path: &Path) -> Result<Self, Error> {
        let contents = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound {
                    path: path.display().to_string(),
                }
            } else {
                ConfigError::ReadFailed {
                    path: path.display().to_string(),
                    message: e.to_string(),
                }
            }
        })?;

        let config: Self = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            message: e.to_string(),
        })?;
        config.validate()?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Load configuration with fallback to defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file exists but cannot be read
    /// or contains invalid TOML syntax.
    pub fn load() -> Result<Self, Error> {
        // No resolvable config directory is not an error for the default path.
        let Ok(config_path) = Self::default_path() else {
            return Ok(Self::default());
        };

        if config_path.exists() {
            Self::load_from_file(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from an optional path or use default
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, Error> {
        match path {
            Some(config_path) => Self::load_from_file(config_path),
            None => Self::load(),
        }
    }

    /// Merge with environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if environment variables contain invalid values
    /// that cannot be parsed into the expected types.
    pub fn merge_env(&mut self) -> Result<(), Error> {
        // SELUTILS_VERBOSE
        if let Ok(verbose) = std::env::var("SELUTILS_VERBOSE") {
            self.general.verbose = parse_bool("SELUTILS_VERBOSE", verbose)?;
        }

        // SELUTILS_LOG_FORMAT
        if let Ok(format) = std::env::var("SELUTILS_LOG_FORMAT") {
            self.general.log_format = match format.as_str() {
                "plain" => LogFormat::Plain,
                "json" => LogFormat::Json,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        field: "SELUTILS_LOG_FORMAT".to_string(),
                        value: format,
                    }
                    .into())
                }
            };
        }

        // SELUTILS_PRESERVE_ROOT
        if let Ok(preserve) = std::env::var("SELUTILS_PRESERVE_ROOT") {
            self.traversal.preserve_root = parse_bool("SELUTILS_PRESERVE_ROOT", preserve)?;
        }

        // SELUTILS_MAX_SYMLINK_CHAIN
        if let Ok(chain) = std::env::var("SELUTILS_MAX_SYMLINK_CHAIN") {
            self.traversal.max_symlink_chain =
                chain.parse().map_err(|_| ConfigError::InvalidValue {
                    field: "SELUTILS_MAX_SYMLINK_CHAIN".to_string(),
                    value: chain,
                })?;
        }

        self.validate()
    }

    /// Check cross-field constraints
    ///
    /// # Errors
    ///
    /// Returns an error if a value is out of range.
    pub fn validate(&self) -> Result<(), Error> {
        if self.traversal.max_symlink_chain == 0 {
            return Err(ConfigError::InvalidValue {
                field: "traversal.max_symlink_chain".to_string(),
                value: "0".to_string(),
            }
            .into());
        }
        if self.label.xattr_name.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "label.xattr_name".to_string(),
                value: String::new(),
            }
            .into());
        }
        Ok(())
    }
}
