//! DispatchWorker - single consumer loop fanning events out to managers

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::{Duration, Instant};

use futures::FutureExt;
use ingestion::{EventNormalizer, QueueConsumer, RawPayload};
use observability::{StatsSummary, UpdateLatencyAggregator};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

use crate::metrics::{DispatchMetrics, MetricsSnapshot};
use crate::registry::SinkRegistry;

/// Queue depth above which every iteration logs a delay warning
pub const BACKPRESSURE_THRESHOLD: usize = 300;

/// What the worker did before the queue closed
#[derive(Debug, Clone)]
pub struct DispatchSummary {
    /// Final counters
    pub metrics: MetricsSnapshot,
    /// Update latency per manager (ms)
    pub latency: Vec<(String, StatsSummary)>,
    /// Manager names in registration order
    pub managers: Vec<String>,
    /// Time spent in the loop
    pub elapsed: Duration,
}

/// The dispatch loop
///
/// Owns the registry; it is the only code that ever calls a manager.
pub struct DispatchWorker {
    consumer: QueueConsumer,
    registry: SinkRegistry,
    normalizer: EventNormalizer,
    metrics: DispatchMetrics,
    latency: UpdateLatencyAggregator,
    backpressure_threshold: usize,
}

impl DispatchWorker {
    /// Create a worker over a populated registry
    pub fn new(consumer: QueueConsumer, registry: SinkRegistry) -> Self {
        Self {
            consumer,
            registry,
            normalizer: EventNormalizer::new(),
            metrics: DispatchMetrics::new(),
            latency: UpdateLatencyAggregator::new(),
            backpressure_threshold: BACKPRESSURE_THRESHOLD,
        }
    }

    /// Override the backpressure warning threshold
    pub fn with_backpressure_threshold(mut self, threshold: usize) -> Self {
        self.backpressure_threshold = threshold;
        self
    }

    /// Run until every producer is gone and the queue is drained
    #[instrument(name = "dispatch_worker_run", skip(self), fields(managers = self.registry.len()))]
    pub async fn run(mut self) -> DispatchSummary {
        info!(managers = ?self.registry.names(), "Dispatch worker started");
        let started = Instant::now();

        loop {
            self.check_backpressure();

            let Some(payload) = self.consumer.get().await else {
                break;
            };
            self.metrics.inc_received();
            self.dispatch(&payload).await;
        }

        let summary = DispatchSummary {
            metrics: self.metrics.snapshot(),
            latency: self.latency.summary(),
            managers: self.registry.names().into_iter().map(String::from).collect(),
            elapsed: started.elapsed(),
        };
        info!(
            received = summary.metrics.received,
            dispatched = summary.metrics.dispatched,
            failures = summary.metrics.sink_failures,
            "Dispatch worker queue closed, shutting down"
        );
        summary
    }

    /// Spawn the worker as a background task
    pub fn spawn(self) -> JoinHandle<DispatchSummary> {
        tokio::spawn(self.run())
    }

    /// Advisory only: never blocks producers and never drops
    fn check_backpressure(&self) {
        let depth = self.consumer.size();
        observability::record_queue_depth(depth);

        if depth > self.backpressure_threshold {
            warn!(
                depth,
                "Queue length is at {depth}... this may be causing a delay in notifications"
            );
            self.metrics.inc_backpressure_warnings();
            observability::record_backpressure_warning(depth);
        }
    }

    async fn dispatch(&mut self, payload: &RawPayload) {
        let Some(event) = self.normalizer.normalize(payload) else {
            debug!("Payload not recognized, skipping");
            self.metrics.inc_unrecognized();
            observability::record_unrecognized_payload();
            return;
        };
        let kind = event.kind.as_str();

        for manager in self.registry.iter_mut() {
            let name = manager.name().to_string();

            let accepted = std::panic::catch_unwind(AssertUnwindSafe(|| manager.accepts(&event)));
            match accepted {
                Ok(true) => {}
                Ok(false) => {
                    debug!(manager = %name, id = %event.id, "Filtered out");
                    continue;
                }
                Err(panic) => {
                    error!(
                        manager = %name,
                        panic = %panic_message(&*panic),
                        "Manager panicked in accepts"
                    );
                    self.metrics.inc_sink_failures();
                    observability::record_event_dispatched(&name, kind, false);
                    continue;
                }
            }

            let started = Instant::now();
            let outcome = AssertUnwindSafe(manager.update(&event)).catch_unwind().await;
            self.latency.record(&name, started.elapsed().as_secs_f64() * 1000.0);

            match outcome {
                Ok(Ok(())) => {
                    debug!(manager = %name, "Distributed to {name}");
                    self.metrics.inc_dispatched();
                    observability::record_event_dispatched(&name, kind, true);
                }
                Ok(Err(e)) => {
                    error!(manager = %name, id = %event.id, error = %e, "Manager update failed");
                    self.metrics.inc_sink_failures();
                    observability::record_event_dispatched(&name, kind, false);
                }
                Err(panic) => {
                    error!(
                        manager = %name,
                        id = %event.id,
                        panic = %panic_message(&*panic),
                        "Manager panicked during update"
                    );
                    self.metrics.inc_sink_failures();
                    observability::record_event_dispatched(&name, kind, false);
                }
            }
        }

        debug!(id = %event.id, "Finished distributing event");
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
