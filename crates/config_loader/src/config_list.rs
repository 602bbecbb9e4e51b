//! Typed multi-valued configuration option
//!
//! A list is either broadcast (exactly one value, shared by every manager) or
//! positional (exactly one value per manager). Any other length is rejected
//! when the list is built.

use contracts::ContractError;

/// Validated per-manager option values
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigList<T> {
    values: Vec<T>,
    count: usize,
}

impl<T: Clone> ConfigList<T> {
    /// Build a list for `count` managers
    ///
    /// # Errors
    /// `ContractError::ConfigCardinality` when `values.len()` is neither 1 nor `count`.
    pub fn new(option: &str, values: Vec<T>, count: usize) -> Result<Self, ContractError> {
        let len = values.len();
        if len == 1 || (len == count && count > 0) {
            Ok(Self { values, count })
        } else {
            Err(ContractError::config_cardinality(option, len, count))
        }
    }

    /// One value shared by all `count` managers
    pub fn broadcast(value: T, count: usize) -> Self {
        Self {
            values: vec![value],
            count,
        }
    }

    /// Value for manager `index`, `None` when out of range
    pub fn get(&self, index: usize) -> Option<&T> {
        if index >= self.count {
            return None;
        }
        match self.values.as_slice() {
            [single] => Some(single),
            values => values.get(index),
        }
    }

    /// One value per manager, in manager order
    pub fn resolve(&self) -> Vec<T> {
        (0..self.count)
            .filter_map(|index| self.get(index))
            .cloned()
            .collect()
    }
}
