//! Manager trait - Dispatcher output interface
//!
//! Defines the capability interface every event-processing sink implements.

use async_trait::async_trait;

use crate::{ContractError, Event, SinkConfig};

/// Event-processing sink ("manager")
///
/// The dispatch worker is the only caller and never invokes a manager
/// concurrently, so `update` takes `&mut self` and implementations may keep
/// internal state without their own locking.
#[async_trait]
pub trait Manager: Send {
    /// Manager name (used for logging/metrics and registry keys)
    fn name(&self) -> &str;

    /// Whether this manager wants the event at all
    fn accepts(&self, _event: &Event) -> bool {
        true
    }

    /// Process one event
    ///
    /// # Errors
    /// Returns processing error (should include context). Errors are isolated
    /// by the worker and never affect other managers.
    async fn update(&mut self, event: &Event) -> Result<(), ContractError>;
}

/// Manager construction interface
///
/// Turns a resolved configuration bundle into a live manager or rejects it.
pub trait ManagerFactory {
    /// Build a manager from configuration
    ///
    /// # Errors
    /// Returns `ContractError::SinkConstruction` when the configuration is unusable.
    fn build(&self, config: &SinkConfig) -> Result<Box<dyn Manager>, ContractError>;
}

impl<F> ManagerFactory for F
where
    F: Fn(&SinkConfig) -> Result<Box<dyn Manager>, ContractError>,
{
    fn build(&self, config: &SinkConfig) -> Result<Box<dyn Manager>, ContractError> {
        self(config)
    }
}
