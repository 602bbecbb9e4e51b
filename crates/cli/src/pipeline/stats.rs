//! Pipeline statistics and run summary.

use std::time::Duration;

use dispatcher::DispatchSummary;
use observability::StatsSummary;

/// Statistics from a pipeline run
#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    /// Payloads taken off the queue
    pub events_received: u64,

    /// Successful manager updates
    pub events_dispatched: u64,

    /// Payloads that were not a recognized event
    pub unrecognized: u64,

    /// Manager updates that failed or panicked
    pub sink_failures: u64,

    /// Times the queue depth exceeded the warning threshold
    pub backpressure_warnings: u64,

    /// Manager names in registration order
    pub managers: Vec<String>,

    /// Update latency per manager (ms)
    pub latency: Vec<(String, StatsSummary)>,

    /// Total duration of the pipeline run
    pub duration: Duration,
}

impl PipelineStats {
    pub fn new(summary: DispatchSummary, duration: Duration) -> Self {
        Self {
            events_received: summary.metrics.received,
            events_dispatched: summary.metrics.dispatched,
            unrecognized: summary.metrics.unrecognized,
            sink_failures: summary.metrics.sink_failures,
            backpressure_warnings: summary.metrics.backpressure_warnings,
            managers: summary.managers,
            latency: summary.latency,
            duration,
        }
    }

    /// Received payloads per second
    pub fn events_per_sec(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.events_received as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n=== PokeAlarm Run Summary ===\n");

        println!("Overview");
        println!("   Duration: {:.2}s", self.duration.as_secs_f64());
        println!("   Events received: {}", self.events_received);
        println!("   Events/s: {:.2}", self.events_per_sec());
        println!("   Unrecognized: {}", self.unrecognized);
        println!("   Manager updates: {}", self.events_dispatched);
        println!("   Manager failures: {}", self.sink_failures);
        println!("   Backpressure warnings: {}", self.backpressure_warnings);
        println!("   Managers: {}", self.managers.join(", "));

        if !self.latency.is_empty() {
            println!("\nUpdate latency (ms)");
            for (manager, stats) in &self.latency {
                println!("   {manager}: {stats}");
            }
        }

        println!();
    }
}
