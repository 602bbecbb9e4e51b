//! CLI argument definitions using clap.

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use config_loader::{non_empty, ConfigLoader, Settings, SettingsSource};
use contracts::{Locale, Units};
use tracing::debug;

use crate::error::{CliError, Result};

/// Config file read when `--config` is not given (skipped if absent)
pub const DEFAULT_CONFIG_PATH: &str = "config/config.toml";

/// PokeAlarm - webhook ingestion and fan-out dispatcher
#[derive(Parser, Debug)]
#[command(
    name = "pokealarm",
    author,
    version,
    about = "PokemonGo-Map webhook ingestion and notification dispatcher",
    long_about = "Accepts PokemonGo-Map webhooks over HTTP, queues them, and fans every \n\
                  recognized event out to a set of independently configured managers."
)]
pub struct Cli {
    /// Debug mode (debug level logging)
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "POKEALARM_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Manager options of whichever subcommand was chosen
    pub fn manager_args(&self) -> &ManagerArgs {
        match &self.command {
            Commands::Serve(args) => &args.manager,
            Commands::Validate(args) => &args.manager,
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the webhook server and dispatch worker
    Serve(ServeArgs),

    /// Resolve configuration and build every manager without serving
    Validate(ValidateArgs),
}

/// Arguments for the `serve` command
#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    #[command(flatten)]
    pub manager: ManagerArgs,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "9000", env = "POKEALARM_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Args, Debug, Clone)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub manager: ManagerArgs,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Server and per-manager options
///
/// List options are repeatable: give one value to share it between all
/// managers, or exactly one value per manager.
#[derive(Args, Debug, Clone, Default)]
pub struct ManagerArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(short, long, env = "POKEALARM_CONFIG")]
    pub config: Option<PathBuf>,

    /// Web server listening host
    #[arg(short = 'H', long, env = "POKEALARM_HOST")]
    pub host: Option<String>,

    /// Web server listening port
    #[arg(short = 'P', long, env = "POKEALARM_PORT")]
    pub port: Option<u16>,

    /// Number of managers to start
    #[arg(short, long)]
    pub mgr_count: Option<usize>,

    /// Manager names (default Manager_<index>)
    #[arg(short = 'M', long)]
    pub managers: Vec<String>,

    /// Google API key
    #[arg(short, long)]
    pub key: Vec<String>,

    /// Filters file [default: filters.json]
    #[arg(short, long)]
    pub filters: Vec<String>,

    /// Alarms file [default: alarms.json]
    #[arg(short, long)]
    pub alarms: Vec<String>,

    /// Geofence file
    #[arg(long, visible_alias = "gf")]
    pub geofences: Vec<String>,

    /// Location, an address or coordinates
    #[arg(short, long)]
    pub location: Vec<String>,

    /// Locale for names (de, en, fr, it, pt_br, ru, zh_cn, zh_hk, zh_tw) [default: en]
    #[arg(short = 'L', long)]
    pub locale: Vec<Locale>,

    /// Distance units (metric, imperial) [default: imperial]
    #[arg(short, long)]
    pub units: Vec<Units>,

    /// Minimum seconds remaining on a pokemon to notify [default: 0]
    #[arg(long, visible_alias = "tl")]
    pub timelimit: Vec<u64>,

    /// Timezone used for notifications, e.g. "America/Los_Angeles"
    #[arg(long, visible_alias = "tz")]
    pub timezone: Vec<String>,
}

impl ManagerArgs {
    /// Command-line values as the highest-precedence settings source
    pub fn to_source(&self, debug: bool) -> SettingsSource {
        SettingsSource {
            debug: debug.then_some(true),
            host: self.host.clone(),
            port: self.port,
            mgr_count: self.mgr_count,
            managers: non_empty(self.managers.clone()),
            key: non_empty(self.key.clone()),
            filters: non_empty(self.filters.clone()),
            alarms: non_empty(self.alarms.clone()),
            geofences: non_empty(self.geofences.clone()),
            location: non_empty(self.location.clone()),
            locale: non_empty(self.locale.clone()),
            units: non_empty(self.units.clone()),
            timelimit: non_empty(self.timelimit.clone()),
            timezone: non_empty(self.timezone.clone()),
        }
    }

    /// Read the config file, if any
    ///
    /// An explicit path must exist; the default path is skipped when absent.
    pub fn load_file(&self) -> Result<Option<SettingsSource>> {
        let path = match &self.config {
            Some(path) if !path.exists() => return Err(CliError::config_not_found(path)),
            Some(path) => path.as_path(),
            None => {
                let default = Path::new(DEFAULT_CONFIG_PATH);
                if !default.exists() {
                    debug!(path = DEFAULT_CONFIG_PATH, "No config file, using defaults");
                    return Ok(None);
                }
                default
            }
        };

        let source = ConfigLoader::load_from_path(path)
            .map_err(|e| CliError::config_load(path, e))?;
        Ok(Some(source))
    }

    /// Merge command line over config file over defaults
    pub fn resolve(&self, debug: bool) -> Result<Settings> {
        let file = self.load_file()?;
        Ok(ConfigLoader::resolve(file, self.to_source(debug))?)
    }
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => observability::LogFormat::Json,
            LogFormat::Pretty => observability::LogFormat::Pretty,
            LogFormat::Compact => observability::LogFormat::Compact,
        }
    }
}
