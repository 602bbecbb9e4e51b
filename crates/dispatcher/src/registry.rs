//! SinkRegistry - the named managers owned by the dispatch worker

use std::collections::HashMap;

use contracts::{registry_key, ContractError, Manager, ManagerFactory, SinkConfig};
use tracing::{info, instrument};

use crate::error::DispatcherError;

/// Managers keyed case-insensitively by name, iterated in registration order
#[derive(Default)]
pub struct SinkRegistry {
    managers: Vec<Box<dyn Manager>>,
    index: HashMap<String, usize>,
}

impl SinkRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Build one manager per configuration
    ///
    /// # Errors
    /// - `SinkConstruction` when the factory rejects a configuration
    /// - `DuplicateSinkName` when two managers share a name (case-insensitive)
    #[instrument(
        name = "sink_registry_build",
        skip(configs, factory),
        fields(managers = configs.len())
    )]
    pub fn build(
        configs: &[SinkConfig],
        factory: &dyn ManagerFactory,
    ) -> Result<Self, DispatcherError> {
        let mut registry = Self::new();
        for config in configs {
            let manager = factory.build(config).map_err(|e| match e {
                ContractError::SinkConstruction { .. } => e,
                other => ContractError::sink_construction(&config.name, other.to_string()),
            })?;
            registry.insert(manager)?;
        }
        info!(managers = ?registry.names(), "Sink registry ready");
        Ok(registry)
    }

    /// Register a manager
    ///
    /// # Errors
    /// `DuplicateSinkName` if the name is taken; the existing entry is kept.
    pub fn insert(&mut self, manager: Box<dyn Manager>) -> Result<(), DispatcherError> {
        let key = registry_key(manager.name());
        if self.index.contains_key(&key) {
            return Err(ContractError::duplicate_sink_name(manager.name()).into());
        }
        self.index.insert(key, self.managers.len());
        self.managers.push(manager);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.managers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.managers.is_empty()
    }

    /// Case-insensitive lookup
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(&registry_key(name))
    }

    /// Names in registration order
    pub fn names(&self) -> Vec<&str> {
        self.managers.iter().map(|m| m.name()).collect()
    }

    /// Managers in registration order
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Box<dyn Manager>> {
        self.managers.iter_mut()
    }
}

impl std::fmt::Debug for SinkRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SinkRegistry")
            .field("managers", &self.names())
            .finish()
    }
}
