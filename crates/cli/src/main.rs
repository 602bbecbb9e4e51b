//! # PokeAlarm CLI
//!
//! 命令行接口入口点。
//!
//! 提供：
//! - 配置加载与验证 (命令行 > 配置文件 > 默认值)
//! - Webhook 服务与分发 worker 的生命周期管理
//! - 优雅关闭处理

mod cli;
mod commands;
mod error;
mod pipeline;

use anyhow::Result;
use clap::Parser;
use observability::ObservabilityConfig;
use tracing::{debug, info};

use cli::{Cli, Commands};
use commands::{run_serve, run_validate};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Resolve before logging starts so `debug = true` in the config file counts.
    let settings = cli.manager_args().resolve(cli.debug);
    let debug = cli.debug || settings.as_ref().is_ok_and(|s| s.debug);

    init_observability(&cli, debug)?;
    if debug {
        debug!("Debug mode enabled!");
    }

    info!(version = env!("CARGO_PKG_VERSION"), "PokeAlarm starting");

    // Execute command
    let result = match &cli.command {
        Commands::Serve(args) => run_serve(args, settings).await,
        Commands::Validate(args) => run_validate(args, settings),
    };

    if let Err(ref e) = result {
        tracing::error!(error = %format!("{e:#}"), "Command failed");
    }

    result
}

/// Initialize logging only; `serve` starts the metrics endpoint once its
/// managers are built.
fn init_observability(cli: &Cli, debug: bool) -> Result<()> {
    observability::init_with_config(ObservabilityConfig {
        log_format: cli.log_format.into(),
        metrics_port: None,
        default_log_level: if debug { "debug" } else { "info" }.to_string(),
    })
}
