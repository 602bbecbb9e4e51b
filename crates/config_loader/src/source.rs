//! Unresolved settings as read from one source (config file or command line)

use contracts::{Locale, Units};
use serde::{Deserialize, Serialize};

/// A list option written either as a scalar or as an array
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(value) => vec![value],
            OneOrMany::Many(values) => values,
        }
    }
}

/// Settings from a single source; every field is optional
///
/// Field names follow the long command-line options so that a config file
/// reads the same as the equivalent invocation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SettingsSource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mgr_count: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub managers: Option<OneOrMany<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<OneOrMany<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<OneOrMany<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alarms: Option<OneOrMany<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geofences: Option<OneOrMany<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<OneOrMany<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<OneOrMany<Locale>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<OneOrMany<Units>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timelimit: Option<OneOrMany<u64>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<OneOrMany<String>>,
}

impl SettingsSource {
    /// Layer `overrides` on top of `self`
    ///
    /// Any value present in `overrides` wins. Lists are replaced wholesale,
    /// never appended to.
    pub fn overlay(self, overrides: SettingsSource) -> SettingsSource {
        SettingsSource {
            debug: overrides.debug.or(self.debug),
            host: overrides.host.or(self.host),
            port: overrides.port.or(self.port),
            mgr_count: overrides.mgr_count.or(self.mgr_count),
            managers: overrides.managers.or(self.managers),
            key: overrides.key.or(self.key),
            filters: overrides.filters.or(self.filters),
            alarms: overrides.alarms.or(self.alarms),
            geofences: overrides.geofences.or(self.geofences),
            location: overrides.location.or(self.location),
            locale: overrides.locale.or(self.locale),
            units: overrides.units.or(self.units),
            timelimit: overrides.timelimit.or(self.timelimit),
            timezone: overrides.timezone.or(self.timezone),
        }
    }
}

/// Wrap a non-empty list, `None` when empty
///
/// Used by command-line front ends where "not given" arrives as an empty `Vec`.
pub fn non_empty<T>(values: Vec<T>) -> Option<OneOrMany<T>> {
    if values.is_empty() {
        None
    } else {
        Some(OneOrMany::Many(values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlay_prefers_overrides() {
        let file = SettingsSource {
            host: Some("0.0.0.0".into()),
            port: Some(4000),
            filters: Some(OneOrMany::Many(vec!["a.json".into(), "b.json".into()])),
            ..Default::default()
        };
        let cli = SettingsSource {
            port: Some(5000),
            filters: Some(OneOrMany::One("c.json".into())),
            ..Default::default()
        };

        let merged = file.overlay(cli);
        assert_eq!(merged.host.as_deref(), Some("0.0.0.0"));
        assert_eq!(merged.port, Some(5000));
        assert_eq!(
            merged.filters.map(OneOrMany::into_vec),
            Some(vec!["c.json".to_string()])
        );
    }

    #[test]
    fn test_non_empty() {
        assert!(non_empty::<String>(Vec::new()).is_none());
        assert_eq!(
            non_empty(vec![1u64]).map(OneOrMany::into_vec),
            Some(vec![1])
        );
    }
}
