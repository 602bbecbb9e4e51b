//! Error types for CLI operations.

use std::path::Path;

use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Configuration file could not be read or parsed
    #[error("Failed to load configuration from {path}: {source}")]
    ConfigLoad {
        path: String,
        #[source]
        source: contracts::ContractError,
    },

    /// Settings resolution error (cardinality, validation, duplicate names)
    #[error(transparent)]
    Config(#[from] contracts::ContractError),

    /// Manager registry construction error
    #[error(transparent)]
    Registry(#[from] dispatcher::DispatcherError),

    /// Listener could not bind
    #[error("Failed to bind webhook server to {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// Prometheus exporter could not start
    #[error("Failed to start metrics endpoint on port {port}: {message}")]
    Metrics { port: u16, message: String },

    /// Webhook server error
    #[error("Webhook server failed: {0}")]
    Server(#[from] ingestion::IngestionError),

    /// Dispatch worker ended abnormally
    #[error("Dispatch worker failed: {message}")]
    Worker { message: String },
}

impl CliError {
    pub fn config_not_found(path: impl AsRef<Path>) -> Self {
        Self::ConfigNotFound {
            path: path.as_ref().display().to_string(),
        }
    }

    pub fn config_load(path: impl AsRef<Path>, source: contracts::ContractError) -> Self {
        Self::ConfigLoad {
            path: path.as_ref().display().to_string(),
            source,
        }
    }

    pub fn bind(addr: impl Into<String>, source: std::io::Error) -> Self {
        Self::Bind {
            addr: addr.into(),
            source,
        }
    }

    pub fn metrics(port: u16, message: impl Into<String>) -> Self {
        Self::Metrics {
            port,
            message: message.into(),
        }
    }

    pub fn worker(message: impl Into<String>) -> Self {
        Self::Worker {
            message: message.into(),
        }
    }
}

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
