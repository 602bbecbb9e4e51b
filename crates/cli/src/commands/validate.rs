//! `validate` command implementation.

use anyhow::{Context, Result};
use config_loader::Settings;
use contracts::SinkConfig;
use dispatcher::AlarmManagerFactory;
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;
use crate::error::CliError;
use crate::pipeline::Pipeline;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    config_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    listen: Option<String>,
    managers: Vec<SinkConfig>,
}

/// Execute the `validate` command
pub fn run_validate(
    args: &ValidateArgs,
    settings: std::result::Result<Settings, CliError>,
) -> Result<()> {
    info!("Validating configuration");

    let result = validate(args, settings);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{json}");
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate(
    args: &ValidateArgs,
    settings: std::result::Result<Settings, CliError>,
) -> ValidationResult {
    let mut result = ValidationResult {
        valid: false,
        config_path: args
            .manager
            .config
            .as_ref()
            .map(|p| p.display().to_string()),
        error: None,
        listen: None,
        managers: Vec::new(),
    };

    let settings = match settings {
        Ok(settings) => settings,
        Err(e) => {
            result.error = Some(e.to_string());
            return result;
        }
    };

    result.listen = Some(settings.listen_addr());
    result.managers = settings.manager_configs();

    // Managers load their filters and alarms here, same as at startup.
    match Pipeline::new(settings).build_registry(&AlarmManagerFactory) {
        Ok(_) => result.valid = true,
        Err(e) => result.error = Some(e.to_string()),
    }
    result
}

fn print_validation_result(result: &ValidationResult) {
    let source = result.config_path.as_deref().unwrap_or("defaults");
    if result.valid {
        println!("✓ Configuration is valid: {source}");
    } else {
        println!("✗ Configuration is invalid: {source}");
        if let Some(ref error) = result.error {
            println!("\n  Error: {error}");
        }
    }

    if let Some(ref listen) = result.listen {
        println!("\n  Listen: http://{listen}");
    }
    if !result.managers.is_empty() {
        println!("\n  Managers ({}):", result.managers.len());
        for manager in &result.managers {
            println!(
                "  - {} (filters: {}, alarms: {}, locale: {}, units: {}, timelimit: {}s)",
                manager.name,
                manager.filters.display(),
                manager.alarms.display(),
                manager.locale,
                manager.units,
                manager.time_limit
            );
        }
    }
}
