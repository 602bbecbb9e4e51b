//! Resolved settings
//!
//! Applies defaults, builds one `ConfigList` per multi-valued option against
//! `mgr_count`, and derives the per-manager `SinkConfig`s.

use std::path::PathBuf;

use contracts::{
    ContractError, Locale, SinkConfig, Units, DEFAULT_ALARMS_FILE, DEFAULT_FILTERS_FILE,
};
use tracing::{debug, warn};

use crate::config_list::ConfigList;
use crate::source::{OneOrMany, SettingsSource};
use crate::validator;

/// Default listen host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default listen port
pub const DEFAULT_PORT: u16 = 4000;

/// Default number of managers
pub const DEFAULT_MGR_COUNT: usize = 1;

/// Fully validated settings
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub debug: bool,
    pub host: String,
    pub port: u16,
    pub mgr_count: usize,
    /// Explicit names; shorter than `mgr_count` means generated names for the rest
    pub managers: Vec<String>,
    pub keys: ConfigList<Option<String>>,
    pub filters: ConfigList<PathBuf>,
    pub alarms: ConfigList<PathBuf>,
    pub geofences: ConfigList<Option<PathBuf>>,
    pub locations: ConfigList<Option<String>>,
    pub locales: ConfigList<Locale>,
    pub units: ConfigList<Units>,
    pub time_limits: ConfigList<u64>,
    pub timezones: ConfigList<Option<String>>,
}

impl Settings {
    /// Resolve a merged source into validated settings
    ///
    /// # Errors
    /// - `ConfigValidation` for bad scalars (zero managers, empty host)
    /// - `ConfigCardinality` for any list that is neither 1 long nor `mgr_count` long
    /// - `DuplicateSinkName` when two managers resolve to the same name
    pub fn from_source(source: SettingsSource) -> Result<Self, ContractError> {
        validator::validate_source(&source)?;

        let mgr_count = source.mgr_count.unwrap_or(DEFAULT_MGR_COUNT);
        let mut managers = source.managers.map(OneOrMany::into_vec).unwrap_or_default();
        if managers.len() > mgr_count {
            warn!(
                ignored = ?&managers[mgr_count..],
                mgr_count,
                "More manager names than managers, ignoring the extra names"
            );
            managers.truncate(mgr_count);
        }

        let settings = Self {
            debug: source.debug.unwrap_or(false),
            host: source.host.unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: source.port.unwrap_or(DEFAULT_PORT),
            mgr_count,
            managers,
            keys: list("key", source.key, None, mgr_count, Some)?,
            filters: list(
                "filters",
                source.filters,
                PathBuf::from(DEFAULT_FILTERS_FILE),
                mgr_count,
                PathBuf::from,
            )?,
            alarms: list(
                "alarms",
                source.alarms,
                PathBuf::from(DEFAULT_ALARMS_FILE),
                mgr_count,
                PathBuf::from,
            )?,
            geofences: list("geofences", source.geofences, None, mgr_count, |path| {
                Some(PathBuf::from(path))
            })?,
            locations: list("location", source.location, None, mgr_count, Some)?,
            locales: list("locale", source.locale, Locale::default(), mgr_count, |l| l)?,
            units: list("units", source.units, Units::default(), mgr_count, |u| u)?,
            time_limits: list("timelimit", source.timelimit, 0, mgr_count, |t| t)?,
            timezones: list("timezone", source.timezone, None, mgr_count, Some)?,
        };

        validator::validate_manager_configs(&settings.manager_configs())?;
        Ok(settings)
    }

    /// `host:port` for the listener
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Name of manager `index`: explicit when given, `Manager_<index>` otherwise
    pub fn manager_name(&self, index: usize) -> String {
        self.managers
            .get(index)
            .cloned()
            .unwrap_or_else(|| format!("Manager_{index}"))
    }

    /// One configuration bundle per manager, in manager order
    pub fn manager_configs(&self) -> Vec<SinkConfig> {
        let keys = self.keys.resolve();
        let filters = self.filters.resolve();
        let alarms = self.alarms.resolve();
        let geofences = self.geofences.resolve();
        let locations = self.locations.resolve();
        let locales = self.locales.resolve();
        let units = self.units.resolve();
        let time_limits = self.time_limits.resolve();
        let timezones = self.timezones.resolve();

        (0..self.mgr_count)
            .map(|i| SinkConfig {
                name: self.manager_name(i),
                api_key: keys[i].clone(),
                filters: filters[i].clone(),
                alarms: alarms[i].clone(),
                geofences: geofences[i].clone(),
                location: locations[i].clone(),
                locale: locales[i],
                units: units[i],
                time_limit: time_limits[i],
                timezone: timezones[i].clone(),
            })
            .collect()
    }
}

/// Build a list from an optional source value, falling back to a single default
fn list<S, T: Clone>(
    option: &str,
    supplied: Option<OneOrMany<S>>,
    default: T,
    count: usize,
    convert: impl Fn(S) -> T,
) -> Result<ConfigList<T>, ContractError> {
    match supplied {
        Some(values) => {
            let values: Vec<T> = values.into_vec().into_iter().map(convert).collect();
            debug!(option, len = values.len(), count, "resolving option list");
            ConfigList::new(option, values, count)
        }
        None => Ok(ConfigList::broadcast(default, count)),
    }
}
