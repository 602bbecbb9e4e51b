//! # Ingestion
//!
//! Webhook ingestion module.
//!
//! Responsibilities:
//! - Accept webhook POSTs and answer the liveness probe
//! - Push parsed JSON bodies onto an unbounded FIFO queue
//! - Expose queue depth for backpressure warnings
//! - Normalize raw payloads into `Event`s for the dispatch worker
//!
//! ## Usage Example
//!
//! ```ignore
//! use ingestion::{ingestion_queue, serve, EventNormalizer};
//!
//! let (queue, consumer) = ingestion_queue();
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:4000").await?;
//! tokio::spawn(serve(listener, queue, shutdown_signal()));
//!
//! let normalizer = EventNormalizer::new();
//! while let Some(payload) = consumer.get().await {
//!     if let Some(event) = normalizer.normalize(&payload) {
//!         // fan out
//!     }
//! }
//! ```

mod error;
mod normalizer;
mod queue;
mod server;

// Re-exports
pub use contracts::RawPayload;
pub use error::{IngestionError, Result};
pub use normalizer::EventNormalizer;
pub use queue::{ingestion_queue, IngestionQueue, QueueConsumer};
pub use server::{router, serve, ACCEPTED_MESSAGE, LIVENESS_MESSAGE};
