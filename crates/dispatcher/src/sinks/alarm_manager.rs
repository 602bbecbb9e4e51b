//! AlarmManager - default `Manager` built from a `SinkConfig`

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use contracts::{
    ContractError, Event, EventKind, Locale, Manager, ManagerFactory, SinkConfig, Units,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{info, instrument};

use super::file::FileAlarm;
use super::filters::Filters;
use super::log::LogAlarm;

/// One entry of the alarms file
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AlarmConfig {
    /// Structured log line
    Log,
    /// JSON-lines file
    File { path: PathBuf },
}

impl AlarmConfig {
    /// Load the alarms file (a JSON array)
    pub fn load_all(path: &Path) -> Result<Vec<Self>, ContractError> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| ContractError::config_parse(format!("invalid alarms: {e}")))
    }

    fn open(&self) -> std::io::Result<Alarm> {
        Ok(match self {
            AlarmConfig::Log => Alarm::Log(LogAlarm::new()),
            AlarmConfig::File { path } => Alarm::File(FileAlarm::new(path)?),
        })
    }
}

enum Alarm {
    Log(LogAlarm),
    File(FileAlarm),
}

impl Alarm {
    fn notify(&mut self, notification: &Notification) -> Result<(), ContractError> {
        match self {
            Alarm::Log(alarm) => {
                alarm.notify(notification);
                Ok(())
            }
            Alarm::File(alarm) => alarm.notify(notification),
        }
    }
}

/// What an alarm is told about an accepted event
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub manager: String,
    pub kind: EventKind,
    pub id: String,
    /// Seconds until the pokemon despawns or the lure expires
    pub time_left: Option<i64>,
    pub expires_at: Option<DateTime<Utc>>,
    pub locale: Locale,
    pub units: Units,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    pub fields: Map<String, Value>,
}

impl Notification {
    /// Build the notification for `event` as seen at unix time `now`
    pub fn new(config: &SinkConfig, event: &Event, now: i64) -> Self {
        let expires = expiry(event);
        Self {
            manager: config.name.clone(),
            kind: event.kind,
            id: event.id.clone(),
            time_left: expires.map(|t| t.saturating_sub(now)),
            expires_at: expires.and_then(|t| DateTime::from_timestamp(t, 0)),
            locale: config.locale,
            units: config.units,
            location: config.location.clone(),
            timezone: config.timezone.clone(),
            fields: event.fields.clone(),
        }
    }
}

/// Unix time at which the event stops being relevant
fn expiry(event: &Event) -> Option<i64> {
    match event.kind {
        EventKind::Pokemon => event.field_i64("disappear_time"),
        EventKind::Pokestop => event.field_i64("lure_expiration"),
        EventKind::Gym => None,
    }
}

/// Manager that filters events and notifies its alarms
pub struct AlarmManager {
    config: SinkConfig,
    filters: Filters,
    alarms: Vec<Alarm>,
}

impl AlarmManager {
    /// Load filters and alarms for one manager
    ///
    /// # Errors
    /// `SinkConstruction` when the filters or alarms file is missing or
    /// invalid, no alarm is configured, or the geofence file does not exist.
    #[instrument(name = "alarm_manager_new", skip(config), fields(manager = %config.name))]
    pub fn new(config: SinkConfig) -> Result<Self, ContractError> {
        let fail = |message: String| ContractError::sink_construction(&config.name, message);

        let filters = Filters::load(&config.filters)
            .map_err(|e| fail(format!("filters file '{}': {e}", config.filters.display())))?;

        let entries = AlarmConfig::load_all(&config.alarms)
            .map_err(|e| fail(format!("alarms file '{}': {e}", config.alarms.display())))?;
        if entries.is_empty() {
            return Err(fail(format!(
                "alarms file '{}' configures no alarms",
                config.alarms.display()
            )));
        }

        if let Some(geofences) = &config.geofences {
            if !geofences.is_file() {
                return Err(fail(format!(
                    "geofence file '{}' does not exist",
                    geofences.display()
                )));
            }
        }

        let alarms = entries
            .iter()
            .map(AlarmConfig::open)
            .collect::<std::io::Result<Vec<_>>>()
            .map_err(|e| fail(format!("cannot open alarm: {e}")))?;

        info!(
            alarms = alarms.len(),
            locale = %config.locale,
            units = %config.units,
            time_limit = config.time_limit,
            "AlarmManager ready"
        );

        Ok(Self {
            config,
            filters,
            alarms,
        })
    }

    /// `accepts` evaluated at unix time `now`
    pub fn accepts_at(&self, event: &Event, now: i64) -> bool {
        if !self.filters.enabled(event.kind) {
            return false;
        }
        if event.kind == EventKind::Pokemon {
            if let Some(disappear) = event.field_i64("disappear_time") {
                let time_limit = i64::try_from(self.config.time_limit).unwrap_or(i64::MAX);
                return disappear.saturating_sub(now) >= time_limit;
            }
        }
        true
    }
}

#[async_trait]
impl Manager for AlarmManager {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn accepts(&self, event: &Event) -> bool {
        self.accepts_at(event, Utc::now().timestamp())
    }

    /// Every alarm is notified; the first failure is reported afterwards.
    async fn update(&mut self, event: &Event) -> Result<(), ContractError> {
        let notification = Notification::new(&self.config, event, Utc::now().timestamp());

        let mut first_error = None;
        for alarm in &mut self.alarms {
            if let Err(e) = alarm.notify(&notification) {
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

/// Builds an `AlarmManager` for each configuration
#[derive(Debug, Clone, Copy, Default)]
pub struct AlarmManagerFactory;

impl ManagerFactory for AlarmManagerFactory {
    fn build(&self, config: &SinkConfig) -> Result<Box<dyn Manager>, ContractError> {
        Ok(Box::new(AlarmManager::new(config.clone())?))
    }
}
