//! # Config Loader
//!
//! Configuration loading and resolution module.
//!
//! Responsibilities:
//! - Parse TOML/JSON configuration files
//! - Merge command-line overrides over file values over defaults
//! - Build per-manager option lists and enforce the broadcast-or-match rule
//! - Generate one `SinkConfig` per manager
//!
//! # Example
//!
//! ```no_run
//! use config_loader::{ConfigLoader, SettingsSource};
//! use std::path::Path;
//!
//! let file = ConfigLoader::load_from_path(Path::new("config/config.toml")).unwrap();
//! let settings = ConfigLoader::resolve(Some(file), SettingsSource::default()).unwrap();
//! for config in settings.manager_configs() {
//!     println!("{}", config.name);
//! }
//! ```

mod config_list;
mod parser;
mod settings;
mod source;
mod validator;

pub use config_list::ConfigList;
pub use parser::ConfigFormat;
pub use settings::{Settings, DEFAULT_HOST, DEFAULT_MGR_COUNT, DEFAULT_PORT};
pub use source::{non_empty, OneOrMany, SettingsSource};
pub use validator::validate_manager_configs;

use contracts::ContractError;
use std::path::Path;
use tracing::debug;

/// Configuration loader
///
/// Provides static methods to load configuration from files or strings.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from file path
    ///
    /// Automatically detects format from file extension (.toml / .json).
    ///
    /// # Errors
    /// - File read failure
    /// - Unsupported format
    /// - Parse failure
    pub fn load_from_path(path: &Path) -> Result<SettingsSource, ContractError> {
        let format = Self::detect_format(path)?;
        let content = Self::read_file(path)?;
        debug!(path = %path.display(), ?format, "loading config file");
        Self::load_from_str(&content, format)
    }

    /// Load configuration from string
    ///
    /// # Errors
    /// - Parse failure
    pub fn load_from_str(
        content: &str,
        format: ConfigFormat,
    ) -> Result<SettingsSource, ContractError> {
        parser::parse(content, format)
    }

    /// Merge sources and resolve them into validated settings
    ///
    /// `overrides` (command line) take precedence over `file`.
    ///
    /// # Errors
    /// - Validation failure
    /// - List cardinality failure
    /// - Duplicate manager names
    pub fn resolve(
        file: Option<SettingsSource>,
        overrides: SettingsSource,
    ) -> Result<Settings, ContractError> {
        let merged = file.unwrap_or_default().overlay(overrides);
        Settings::from_source(merged)
    }

    /// Serialize settings source to TOML string
    pub fn to_toml(source: &SettingsSource) -> Result<String, ContractError> {
        toml::to_string_pretty(source)
            .map_err(|e| ContractError::config_parse(format!("TOML serialize error: {e}")))
    }

    /// Serialize settings source to JSON string
    pub fn to_json(source: &SettingsSource) -> Result<String, ContractError> {
        serde_json::to_string_pretty(source)
            .map_err(|e| ContractError::config_parse(format!("JSON serialize error: {e}")))
    }
}

impl ConfigLoader {
    /// Infer configuration format from file extension
    fn detect_format(path: &Path) -> Result<ConfigFormat, ContractError> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            ContractError::config_parse("cannot determine file format from extension")
        })?;

        ConfigFormat::from_extension(ext).ok_or_else(|| {
            ContractError::config_parse(format!("unsupported config format: .{ext}"))
        })
    }

    /// Read configuration file content
    fn read_file(path: &Path) -> Result<String, ContractError> {
        Ok(std::fs::read_to_string(path)?)
    }
}
