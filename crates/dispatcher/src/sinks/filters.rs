//! Per-manager filters file

use std::path::Path;

use contracts::{ContractError, EventKind};
use serde::Deserialize;

/// Filters file contents
///
/// Every section is optional and enabled unless it says otherwise. Extra keys
/// inside a section are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Filters {
    #[serde(default)]
    pub pokemon: KindFilter,
    #[serde(default)]
    pub pokestops: KindFilter,
    #[serde(default)]
    pub gyms: KindFilter,
}

/// One section of the filters file
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct KindFilter {
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

impl Default for KindFilter {
    fn default() -> Self {
        Self { enabled: true }
    }
}

fn enabled_by_default() -> bool {
    true
}

impl Filters {
    /// Load from a JSON file
    pub fn load(path: &Path) -> Result<Self, ContractError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse JSON content
    pub fn parse(content: &str) -> Result<Self, ContractError> {
        serde_json::from_str(content)
            .map_err(|e| ContractError::config_parse(format!("invalid filters: {e}")))
    }

    /// Whether events of this kind pass
    pub fn enabled(&self, kind: EventKind) -> bool {
        match kind {
            EventKind::Pokemon => self.pokemon.enabled,
            EventKind::Pokestop => self.pokestops.enabled,
            EventKind::Gym => self.gyms.enabled,
        }
    }
}
