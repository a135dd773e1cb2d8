//! Configuration module for the photo dedup tool
//!
//! Supports loading configuration from a TOML file.
//! Configuration is stored in a standard location:
//! - Windows: %APPDATA%\photo_dedup_tool\config.toml
//! - Linux/macOS: ~/.config/photo_dedup_tool/config.toml
//!
//! A `./config.toml` in the working directory overrides the standard
//! location, which is handy for per-collection settings.

use crate::core::scope::{
    default_allowed_extensions, default_excluded_folders, Scope, DEFAULT_COMPLETION_SUFFIX,
    DEFAULT_IGNORE_MARKER,
};
use crate::fsops::namer::Disposition;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Application name used for the config directory
const APP_NAME: &str = "photo_dedup_tool";

/// Default config file name
const CONFIG_FILE_NAME: &str = "config.toml";

/// Get the standard configuration directory for the application.
pub fn get_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_NAME))
}

/// Get the standard configuration file path.
pub fn get_config_path() -> Option<PathBuf> {
    get_config_dir().map(|dir| dir.join(CONFIG_FILE_NAME))
}

/// Initialize the configuration file if it doesn't exist.
///
/// Creates the config directory and writes the default config template.
/// Returns the path to the config file.
pub fn init_config() -> Result<PathBuf, ConfigError> {
    let config_dir = get_config_dir().ok_or(ConfigError::ConfigDirNotFound)?;

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)
            .map_err(|e| ConfigError::WriteError(config_dir.clone(), e.to_string()))?;
    }

    let config_path = config_dir.join(CONFIG_FILE_NAME);
    if !config_path.exists() {
        fs::write(&config_path, Config::generate_default_config())
            .map_err(|e| ConfigError::WriteError(config_path.clone(), e.to_string()))?;
    }

    Ok(config_path)
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Scan settings
    pub scan: ScanConfig,

    /// Disposition settings
    pub disposition: DispositionConfig,

    /// Naming settings
    pub naming: NamingConfig,

    /// Logging settings
    pub logging: LoggingConfig,

    /// Performance settings
    pub performance: PerformanceConfig,
}

/// Traversal configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// File extensions considered for fingerprinting (case-insensitive)
    pub allowed_extensions: Vec<String>,

    /// Trailing filename marker meaning "already triaged, skip"
    pub ignore_marker: String,

    /// Folder names never traversed (case-sensitive exact match)
    pub excluded_folders: Vec<String>,
}

/// Disposition configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DispositionConfig {
    /// Where non-canonical duplicates are placed
    pub mode: Disposition,
}

/// Naming configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NamingConfig {
    /// Suffix appended to a scope's folder name when a run completes
    pub completion_suffix: String,

    /// Reuse a `WxH` token already embedded in the filename instead of
    /// reformatting the measured resolution (legacy-name compatibility)
    pub legacy_resolution_tokens: bool,

    /// Maximum `-N` collision probes per target name
    pub collision_limit: u32,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log to file
    pub log_to_file: bool,

    /// Log file path
    pub log_file: PathBuf,
}

/// Performance configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceConfig {
    /// Fingerprint files in parallel. Disposition and quarantine stay
    /// serialized regardless.
    pub parallel: bool,

    /// Per-file decode timeout in seconds when running in parallel
    /// (0 = unbounded)
    pub decode_timeout_secs: u64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            allowed_extensions: default_allowed_extensions(),
            ignore_marker: DEFAULT_IGNORE_MARKER.to_string(),
            excluded_folders: default_excluded_folders(),
        }
    }
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            completion_suffix: DEFAULT_COMPLETION_SUFFIX.to_string(),
            legacy_resolution_tokens: true,
            collision_limit: 9_999,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_to_file: false,
            log_file: PathBuf::from("./photo_dedup.log"),
        }
    }
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            decode_timeout_secs: 30,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(path.to_path_buf(), e.to_string()))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| ConfigError::ParseError(path.to_path_buf(), e.to_string()))?;

        Ok(config)
    }

    /// Load configuration from default locations
    ///
    /// Search order:
    /// 1. ./config.toml (current directory - for per-collection overrides)
    /// 2. Standard config location
    ///
    /// If no config file is found, returns default configuration.
    pub fn load_default() -> Result<Self, ConfigError> {
        let local = PathBuf::from("./config.toml");
        if local.exists() {
            return Self::load(&local);
        }

        if let Some(config_path) = get_config_path() {
            if config_path.exists() {
                return Self::load(&config_path);
            }
        }

        Ok(Self::default())
    }

    /// Get the path where the config file is (or would be) located.
    pub fn get_active_config_path() -> PathBuf {
        let local = PathBuf::from("./config.toml");
        if local.exists() {
            return local;
        }
        get_config_path().unwrap_or_else(|| PathBuf::from("./config.toml"))
    }

    /// Save configuration to a TOML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        fs::write(path.as_ref(), content)
            .map_err(|e| ConfigError::WriteError(path.as_ref().to_path_buf(), e.to_string()))?;

        Ok(())
    }

    /// Generate a default config file with comments
    /// This uses the example config file to ensure it stays up to date
    pub fn generate_default_config() -> String {
        include_str!("../../config.example.toml").to_string()
    }

    /// Build a [`Scope`] for `root` from the configured scan/naming rules.
    pub fn scope_for<P: Into<PathBuf>>(&self, root: P) -> Scope {
        Scope::new(root)
            .with_allowed_extensions(&self.scan.allowed_extensions)
            .with_excluded_folders(&self.scan.excluded_folders)
            .with_ignore_marker(&self.scan.ignore_marker)
            .with_completion_suffix(&self.naming.completion_suffix)
    }
}

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file was not found at the specified path
    #[error("Configuration file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Failed to read the configuration file
    #[error("Failed to read config file '{}': {1}", .0.display())]
    ReadError(PathBuf, String),

    /// Failed to parse the configuration file (invalid TOML)
    #[error("Failed to parse config file '{}': {1}", .0.display())]
    ParseError(PathBuf, String),

    /// Failed to serialize configuration to TOML
    #[error("Failed to serialize configuration: {0}")]
    SerializeError(String),

    /// Failed to write configuration file
    #[error("Failed to write config file '{}': {1}", .0.display())]
    WriteError(PathBuf, String),

    /// Could not determine config directory
    #[error("Could not determine configuration directory")]
    ConfigDirNotFound,
}
