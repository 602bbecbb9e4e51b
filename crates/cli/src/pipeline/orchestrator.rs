//! Pipeline orchestrator - coordinates all components.
//!
//! Startup order: registry, then metrics endpoint, then listener, then dispatch
//! worker. A failure at any step stops the process before any port is bound
//! by a later step.

use std::future::Future;
use std::time::Instant;

use config_loader::Settings;
use contracts::ManagerFactory;
use dispatcher::{DispatchWorker, SinkRegistry};
use tokio::net::TcpListener;
use tracing::{info, instrument};

use super::PipelineStats;
use crate::error::{CliError, Result};

/// Main pipeline orchestrator
pub struct Pipeline {
    settings: Settings,
    metrics_port: Option<u16>,
}

impl Pipeline {
    /// Create a new pipeline from resolved settings
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            metrics_port: None,
        }
    }

    /// Serve Prometheus metrics on `port` once every manager is built
    pub fn with_metrics_port(mut self, port: Option<u16>) -> Self {
        self.metrics_port = port;
        self
    }

    /// Build every manager; fails on the first construction or naming error
    #[instrument(name = "pipeline_build_registry", skip(self, factory))]
    pub fn build_registry(&self, factory: &dyn ManagerFactory) -> Result<SinkRegistry> {
        let configs = self.settings.manager_configs();
        Ok(SinkRegistry::build(&configs, factory)?)
    }

    /// Serve until `shutdown` resolves, then drain the queue
    pub async fn run<F>(self, factory: &dyn ManagerFactory, shutdown: F) -> Result<PipelineStats>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let registry = self.build_registry(factory)?;

        if let Some(port) = self.metrics_port {
            observability::init_metrics_only(port)
                .map_err(|e| CliError::metrics(port, format!("{e:#}")))?;
        }

        let addr = self.settings.listen_addr();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| CliError::bind(&addr, e))?;

        self.run_with(registry, listener, shutdown).await
    }

    /// Run over an already built registry and bound listener
    pub async fn run_with<F>(
        self,
        registry: SinkRegistry,
        listener: TcpListener,
        shutdown: F,
    ) -> Result<PipelineStats>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let start_time = Instant::now();
        let (queue, consumer) = ingestion::ingestion_queue();
        let worker = DispatchWorker::new(consumer, registry).spawn();

        ingestion::serve(listener, queue, shutdown).await?;

        info!("Listener closed, draining remaining events");
        let summary = worker
            .await
            .map_err(|e| CliError::worker(e.to_string()))?;

        Ok(PipelineStats::new(summary, start_time.elapsed()))
    }
}
