//! Webhook HTTP listener
//!
//! `GET /` is a liveness probe, `POST /` parses the body as JSON and pushes it
//! onto the ingestion queue. Handlers never wait on dispatch.

use std::future::Future;

use axum::extract::State;
use axum::routing::get;
use axum::Router;
use bytes::Bytes;
use contracts::RawPayload;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use crate::error::{IngestionError, Result};
use crate::queue::IngestionQueue;

/// Liveness response body
pub const LIVENESS_MESSAGE: &str = "PokeAlarm Running!";

/// Webhook acknowledgement body
pub const ACCEPTED_MESSAGE: &str = "OK";

/// Build the webhook router
pub fn router(queue: IngestionQueue) -> Router {
    Router::new()
        .route("/", get(index).post(accept_webhook))
        .with_state(queue)
}

/// Serve webhooks on an already bound listener until `shutdown` resolves
///
/// The router (and with it every queue producer) is dropped on return, which
/// lets the consumer drain and finish.
pub async fn serve<F>(listener: TcpListener, queue: IngestionQueue, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    info!("Webhook server running on http://{addr}");

    axum::serve(listener, router(queue))
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("Webhook server stopped");
    Ok(())
}

async fn index() -> &'static str {
    LIVENESS_MESSAGE
}

async fn accept_webhook(
    State(queue): State<IngestionQueue>,
    body: Bytes,
) -> Result<&'static str> {
    debug!(bytes = body.len(), "POST request received");

    let payload: RawPayload = serde_json::from_slice(&body).map_err(|e| {
        warn!(error = %e, "rejecting malformed webhook body");
        observability::record_malformed_payload();
        IngestionError::malformed(e.to_string())
    })?;

    let depth = queue.put(payload)?;
    observability::record_event_received();
    observability::record_queue_depth(depth);

    Ok(ACCEPTED_MESSAGE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::ingestion_queue;
    use axum::body::{self, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt; // for `oneshot`

    fn post(body: &'static str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    async fn body_text(resp: axum::response::Response) -> String {
        let bytes = body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_liveness() {
        let (queue, _consumer) = ingestion_queue();
        let resp = router(queue)
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_text(resp).await, LIVENESS_MESSAGE);
    }

    #[tokio::test]
    async fn test_post_enqueues_payload() {
        let (queue, consumer) = ingestion_queue();
        let resp = router(queue)
            .oneshot(post(r#"{"type":"pokemon","message":{"encounter_id":"a"}}"#))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_text(resp).await, ACCEPTED_MESSAGE);
        assert_eq!(consumer.size(), 1);

        let payload = consumer.get().await.unwrap();
        assert_eq!(payload["type"], "pokemon");
    }

    #[tokio::test]
    async fn test_post_accepts_unrecognized_json() {
        let (queue, consumer) = ingestion_queue();
        let resp = router(queue).oneshot(post("[1, 2, 3]")).await.unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(consumer.size(), 1);
    }

    #[tokio::test]
    async fn test_malformed_body_is_rejected() {
        let (queue, consumer) = ingestion_queue();
        let resp = router(queue).oneshot(post("{not json")).await.unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(consumer.size(), 0);
    }

    #[tokio::test]
    async fn test_closed_queue_is_unavailable() {
        let (queue, consumer) = ingestion_queue();
        drop(consumer);
        let resp = router(queue).oneshot(post("{}")).await.unwrap();

        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_serve_stops_on_shutdown() {
        let (queue, consumer) = ingestion_queue();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();

        serve(listener, queue, async {}).await.unwrap();

        // Every producer is gone once the server returns.
        assert!(consumer.is_closed());
        assert_eq!(consumer.get().await, None);
    }
}
