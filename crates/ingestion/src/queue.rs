//! Ingestion queue - unbounded FIFO between HTTP handlers and the dispatch worker
//!
//! Many producers (one per in-flight request) push without ever blocking; one
//! consumer awaits items. Depth is observable from both ends and is the only
//! backpressure signal.

use async_channel::{unbounded, Receiver, Sender, TrySendError};
use contracts::RawPayload;
use tracing::trace;

use crate::error::{IngestionError, Result};

/// Create a connected producer/consumer pair
pub fn ingestion_queue() -> (IngestionQueue, QueueConsumer) {
    let (tx, rx) = unbounded();
    (IngestionQueue { tx }, QueueConsumer { rx })
}

/// Producer handle (cheap to clone, one per request handler)
#[derive(Debug, Clone)]
pub struct IngestionQueue {
    tx: Sender<RawPayload>,
}

impl IngestionQueue {
    /// Enqueue a payload without blocking
    ///
    /// Returns the queue depth right after the push.
    ///
    /// # Errors
    /// `IngestionError::QueueClosed` when the consumer is gone.
    pub fn put(&self, payload: RawPayload) -> Result<usize> {
        match self.tx.try_send(payload) {
            Ok(()) => {
                let depth = self.tx.len();
                trace!(depth, "payload enqueued");
                Ok(depth)
            }
            // Unbounded: Full cannot happen, treat it like a closed queue.
            Err(TrySendError::Closed(_)) | Err(TrySendError::Full(_)) => {
                Err(IngestionError::QueueClosed)
            }
        }
    }

    /// Current number of pending payloads
    pub fn size(&self) -> usize {
        self.tx.len()
    }

    /// Whether the consumer has been dropped
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Consumer handle, owned by the dispatch worker
#[derive(Debug)]
pub struct QueueConsumer {
    rx: Receiver<RawPayload>,
}

impl QueueConsumer {
    /// Wait for the next payload
    ///
    /// Returns `None` once every producer is dropped and the queue is drained.
    pub async fn get(&self) -> Option<RawPayload> {
        self.rx.recv().await.ok()
    }

    /// Current number of pending payloads
    pub fn size(&self) -> usize {
        self.rx.len()
    }

    /// Whether every producer has been dropped
    pub fn is_closed(&self) -> bool {
        self.rx.is_closed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_fifo_order() {
        let (queue, consumer) = ingestion_queue();
        for i in 0..5 {
            queue.put(json!({ "seq": i })).unwrap();
        }
        assert_eq!(queue.size(), 5);
        assert_eq!(consumer.size(), 5);

        for i in 0..5 {
            let payload = consumer.get().await.unwrap();
            assert_eq!(payload["seq"], i);
        }
        assert_eq!(consumer.size(), 0);
    }

    #[tokio::test]
    async fn test_put_reports_depth() {
        let (queue, _consumer) = ingestion_queue();
        assert_eq!(queue.put(json!({})).unwrap(), 1);
        assert_eq!(queue.put(json!({})).unwrap(), 2);
    }

    #[tokio::test]
    async fn test_get_drains_then_ends_after_producers_drop() {
        let (queue, consumer) = ingestion_queue();
        queue.put(json!(1)).unwrap();
        queue.put(json!(2)).unwrap();
        drop(queue);

        assert_eq!(consumer.get().await, Some(json!(1)));
        assert_eq!(consumer.get().await, Some(json!(2)));
        assert_eq!(consumer.get().await, None);
    }

    #[test]
    fn test_put_fails_once_consumer_dropped() {
        let (queue, consumer) = ingestion_queue();
        drop(consumer);
        assert!(queue.is_closed());
        assert!(matches!(
            queue.put(json!({})),
            Err(IngestionError::QueueClosed)
        ));
    }

    #[tokio::test]
    async fn test_many_producers() {
        let (queue, consumer) = ingestion_queue();
        let mut handles = Vec::new();
        for p in 0..4 {
            let queue = queue.clone();
            handles.push(tokio::spawn(async move {
                for i in 0..50 {
                    queue.put(json!({ "p": p, "i": i })).unwrap();
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(consumer.size(), 200);
    }
}
