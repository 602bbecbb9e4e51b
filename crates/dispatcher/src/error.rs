//! Dispatcher error types

use thiserror::Error;

/// Dispatcher-specific errors
#[derive(Debug, Error)]
pub enum DispatcherError {
    /// Registry construction or manager error (from contract)
    #[error(transparent)]
    Contract(#[from] contracts::ContractError),
}
