//! Layered error definitions
//!
//! Categorized by source: config / registry / manager

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    /// A multi-valued option has neither 1 value nor one value per manager
    #[error(
        "incorrect number of values for '{option}': got {len}, expected 1 (shared by all managers) or {expected} (one per manager)"
    )]
    ConfigCardinality {
        option: String,
        len: usize,
        expected: usize,
    },

    // ===== Registry Errors =====
    /// Two managers resolve to the same name (case-insensitive)
    #[error("duplicate manager name '{name}': names must be unique regardless of capitalization")]
    DuplicateSinkName { name: String },

    /// Manager construction rejected its configuration
    #[error("failed to construct manager '{name}': {message}")]
    SinkConstruction { name: String, message: String },

    // ===== Manager Errors =====
    /// Manager failed while processing an event
    #[error("manager '{sink_name}' update error: {message}")]
    SinkUpdate { sink_name: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create cardinality error for a list option
    pub fn config_cardinality(option: impl Into<String>, len: usize, expected: usize) -> Self {
        Self::ConfigCardinality {
            option: option.into(),
            len,
            expected,
        }
    }

    /// Create duplicate manager name error
    pub fn duplicate_sink_name(name: impl Into<String>) -> Self {
        Self::DuplicateSinkName { name: name.into() }
    }

    /// Create manager construction error
    pub fn sink_construction(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkConstruction {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create manager update error
    pub fn sink_update(sink_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkUpdate {
            sink_name: sink_name.into(),
            message: message.into(),
        }
    }

    /// Whether this error must stop the process before it serves traffic
    pub fn is_fatal_at_startup(&self) -> bool {
        matches!(
            self,
            Self::ConfigParse { .. }
                | Self::ConfigValidation { .. }
                | Self::ConfigCardinality { .. }
                | Self::DuplicateSinkName { .. }
                | Self::SinkConstruction { .. }
        )
    }
}
