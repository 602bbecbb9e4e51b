//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - HTTP 接入 -> 队列 -> 分发 worker -> manager 的完整链路
//! - 启动期致命错误 (数量不匹配、重名、构建失败)
//! - 失败/panic manager 的隔离与背压告警

#[cfg(test)]
mod support {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use contracts::{ContractError, Event, Manager, SinkConfig};

    /// Event ids seen per manager name
    pub type Deliveries = Arc<Mutex<HashMap<String, Vec<String>>>>;

    /// Manager that records every event id it receives
    pub struct Recording {
        name: String,
        deliveries: Deliveries,
        fail: bool,
        panic: bool,
    }

    #[async_trait]
    impl Manager for Recording {
        fn name(&self) -> &str {
            &self.name
        }

        async fn update(&mut self, event: &Event) -> Result<(), ContractError> {
            if self.panic {
                panic!("{} cannot handle {}", self.name, event.id);
            }
            if self.fail {
                return Err(ContractError::sink_update(&self.name, "delivery refused"));
            }
            self.deliveries
                .lock()
                .unwrap()
                .entry(self.name.clone())
                .or_default()
                .push(event.id.clone());
            Ok(())
        }
    }

    /// Factory whose managers fail or panic when their name says so
    pub fn recording_factory(
        deliveries: &Deliveries,
    ) -> impl Fn(&SinkConfig) -> Result<Box<dyn Manager>, ContractError> {
        let deliveries = Arc::clone(deliveries);
        move |config: &SinkConfig| -> Result<Box<dyn Manager>, ContractError> {
            Ok(Box::new(Recording {
                name: config.name.clone(),
                deliveries: Arc::clone(&deliveries),
                fail: config.name.starts_with("Failing"),
                panic: config.name.starts_with("Panicking"),
            }))
        }
    }

    pub fn delivered(deliveries: &Deliveries, name: &str) -> Vec<String> {
        deliveries
            .lock()
            .unwrap()
            .get(name)
            .cloned()
            .unwrap_or_default()
    }

    pub fn pokemon_body(id: &str) -> String {
        serde_json::json!({
            "type": "pokemon",
            "message": {
                "encounter_id": id,
                "pokemon_id": 147,
                "latitude": 37.7749,
                "longitude": -122.4194
            }
        })
        .to_string()
    }
}

#[cfg(test)]
mod http_tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use ingestion::{ingestion_queue, router};
    use tower::ServiceExt; // for `oneshot`

    use crate::support::pokemon_body;

    fn post(body: String) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_post_grows_queue_by_one() {
        let (queue, consumer) = ingestion_queue();
        let before = consumer.size();

        let resp = router(queue.clone())
            .oneshot(post(pokemon_body("e1")))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(consumer.size(), before + 1);
    }

    #[tokio::test]
    async fn test_malformed_post_leaves_queue_unchanged() {
        let (queue, consumer) = ingestion_queue();
        queue.put(serde_json::json!({"type": "gym"})).unwrap();

        let resp = router(queue)
            .oneshot(post("{\"type\": \"pokemon\",".to_string()))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(consumer.size(), 1);
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::time::Duration;

    use config_loader::{ConfigLoader, OneOrMany, SettingsSource};
    use dispatcher::{DispatchSummary, DispatchWorker, SinkRegistry};
    use ingestion::{ingestion_queue, serve};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::sync::oneshot;

    use crate::support::{delivered, pokemon_body, recording_factory, Deliveries};

    /// Full pipeline on an ephemeral port
    struct Running {
        addr: std::net::SocketAddr,
        shutdown: oneshot::Sender<()>,
        server: tokio::task::JoinHandle<ingestion::Result<()>>,
        worker: tokio::task::JoinHandle<DispatchSummary>,
    }

    impl Running {
        async fn start(registry: SinkRegistry) -> Self {
            let (queue, consumer) = ingestion_queue();
            let worker = DispatchWorker::new(consumer, registry).spawn();

            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            let (shutdown, stopped) = oneshot::channel::<()>();
            let server = tokio::spawn(serve(listener, queue, async move {
                let _ = stopped.await;
            }));

            Self {
                addr,
                shutdown,
                server,
                worker,
            }
        }

        async fn post(&self, body: &str) -> String {
            let mut stream = TcpStream::connect(self.addr).await.unwrap();
            let request = format!(
                "POST / HTTP/1.1\r\nHost: localhost\r\nContent-Type: application/json\r\n\
                 Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(request.as_bytes()).await.unwrap();

            let mut response = String::new();
            stream.read_to_string(&mut response).await.unwrap();
            response
        }

        async fn stop(self) -> DispatchSummary {
            self.shutdown.send(()).unwrap();
            self.server.await.unwrap().unwrap();
            tokio::time::timeout(Duration::from_secs(5), self.worker)
                .await
                .unwrap()
                .unwrap()
        }
    }

    fn source(mgr_count: usize, names: &[&str]) -> SettingsSource {
        SettingsSource {
            mgr_count: Some(mgr_count),
            managers: Some(OneOrMany::Many(
                names.iter().map(|n| n.to_string()).collect(),
            )),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_each_manager_receives_one_update() {
        let settings = ConfigLoader::resolve(None, source(2, &["Alpha", "Beta"])).unwrap();
        let deliveries = Deliveries::default();
        let registry =
            SinkRegistry::build(&settings.manager_configs(), &recording_factory(&deliveries))
                .unwrap();

        let running = Running::start(registry).await;
        let response = running.post(&pokemon_body("enc-1")).await;
        assert!(response.starts_with("HTTP/1.1 200"), "{response}");
        assert!(response.ends_with("OK"), "{response}");

        let summary = running.stop().await;
        assert_eq!(delivered(&deliveries, "Alpha"), vec!["enc-1"]);
        assert_eq!(delivered(&deliveries, "Beta"), vec!["enc-1"]);
        assert_eq!(summary.metrics.dispatched, 2);
    }

    #[tokio::test]
    async fn test_unrecognized_and_malformed_bodies_reach_no_manager() {
        let settings = ConfigLoader::resolve(None, source(1, &["Alpha"])).unwrap();
        let deliveries = Deliveries::default();
        let registry =
            SinkRegistry::build(&settings.manager_configs(), &recording_factory(&deliveries))
                .unwrap();

        let running = Running::start(registry).await;
        let ok = running.post(r#"{"type": "captcha", "message": {}}"#).await;
        assert!(ok.starts_with("HTTP/1.1 200"), "{ok}");
        let bad = running.post("not json").await;
        assert!(bad.starts_with("HTTP/1.1 400"), "{bad}");

        let summary = running.stop().await;
        assert!(delivered(&deliveries, "Alpha").is_empty());
        assert_eq!(summary.metrics.received, 1);
        assert_eq!(summary.metrics.unrecognized, 1);
    }

    #[tokio::test]
    async fn test_failing_and_panicking_managers_do_not_affect_others() {
        let settings = ConfigLoader::resolve(
            None,
            source(3, &["Failing", "Panicking", "Healthy"]),
        )
        .unwrap();
        let deliveries = Deliveries::default();
        let registry =
            SinkRegistry::build(&settings.manager_configs(), &recording_factory(&deliveries))
                .unwrap();

        let running = Running::start(registry).await;
        for id in ["e1", "e2"] {
            let response = running.post(&pokemon_body(id)).await;
            assert!(response.starts_with("HTTP/1.1 200"), "{response}");
        }

        let summary = running.stop().await;
        assert_eq!(delivered(&deliveries, "Healthy"), vec!["e1", "e2"]);
        assert_eq!(summary.metrics.sink_failures, 4);
    }

    #[tokio::test]
    async fn test_backlog_over_threshold_is_delivered_in_order() {
        let deliveries = Deliveries::default();
        let settings = ConfigLoader::resolve(None, source(1, &["Alpha"])).unwrap();
        let registry =
            SinkRegistry::build(&settings.manager_configs(), &recording_factory(&deliveries))
                .unwrap();

        let (queue, consumer) = ingestion_queue();
        let count = dispatcher::BACKPRESSURE_THRESHOLD + 1;
        for i in 0..count {
            let payload: serde_json::Value =
                serde_json::from_str(&pokemon_body(&format!("e{i}"))).unwrap();
            queue.put(payload).unwrap();
        }
        drop(queue);

        let summary = DispatchWorker::new(consumer, registry).run().await;

        let seen = delivered(&deliveries, "Alpha");
        let expected: Vec<String> = (0..count).map(|i| format!("e{i}")).collect();
        assert_eq!(seen, expected);
        assert!(summary.metrics.backpressure_warnings >= 1);
        assert_eq!(summary.metrics.received as usize, count);
    }
}

#[cfg(test)]
mod startup_tests {
    use config_loader::{ConfigLoader, OneOrMany, SettingsSource};
    use contracts::{ContractError, SinkConfig};
    use dispatcher::{DispatcherError, SinkRegistry};

    use crate::support::{recording_factory, Deliveries};

    #[test]
    fn test_case_insensitive_duplicate_names_are_fatal() {
        let source = SettingsSource {
            mgr_count: Some(2),
            managers: Some(OneOrMany::Many(vec!["Team".into(), "team".into()])),
            ..Default::default()
        };
        let err = ConfigLoader::resolve(None, source).unwrap_err();
        assert!(matches!(err, ContractError::DuplicateSinkName { .. }), "got: {err}");

        // The registry enforces the same rule on its own.
        let configs = vec![SinkConfig::new("Team"), SinkConfig::new("team")];
        let err = SinkRegistry::build(&configs, &recording_factory(&Deliveries::default()))
            .unwrap_err();
        assert!(matches!(
            err,
            DispatcherError::Contract(ContractError::DuplicateSinkName { .. })
        ));
    }

    #[test]
    fn test_two_values_for_three_managers_is_fatal() {
        let source = SettingsSource {
            mgr_count: Some(3),
            filters: Some(OneOrMany::Many(vec!["a.json".into(), "b.json".into()])),
            ..Default::default()
        };
        let err = ConfigLoader::resolve(None, source).unwrap_err();
        match err {
            ContractError::ConfigCardinality {
                option,
                len,
                expected,
            } => {
                assert_eq!(option, "filters");
                assert_eq!(len, 2);
                assert_eq!(expected, 3);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_single_value_is_shared_by_all_managers() {
        let source = SettingsSource {
            mgr_count: Some(3),
            alarms: Some(OneOrMany::One("shared_alarms.json".into())),
            ..Default::default()
        };
        let settings = ConfigLoader::resolve(None, source).unwrap();
        let configs = settings.manager_configs();
        assert_eq!(configs.len(), 3);
        assert!(configs
            .iter()
            .all(|c| c.alarms == std::path::PathBuf::from("shared_alarms.json")));
    }
}

#[cfg(test)]
mod alarm_manager_tests {
    use std::fs;

    use config_loader::{ConfigLoader, OneOrMany, SettingsSource};
    use dispatcher::{AlarmManagerFactory, DispatchWorker, SinkRegistry};
    use ingestion::{ingestion_queue, EventNormalizer};
    use serde_json::json;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_alarm_managers_write_notifications() {
        let dir = tempdir().unwrap();
        let filters = dir.path().join("filters.json");
        let alpha_alarms = dir.path().join("alpha_alarms.json");
        let beta_alarms = dir.path().join("beta_alarms.json");
        let alpha_out = dir.path().join("alpha.jsonl");
        let beta_out = dir.path().join("beta.jsonl");

        fs::write(&filters, r#"{"gyms": {"enabled": false}}"#).unwrap();
        fs::write(
            &alpha_alarms,
            json!([{"type": "file", "path": alpha_out}]).to_string(),
        )
        .unwrap();
        fs::write(
            &beta_alarms,
            json!([{"type": "log"}, {"type": "file", "path": beta_out}]).to_string(),
        )
        .unwrap();

        let source = SettingsSource {
            mgr_count: Some(2),
            managers: Some(OneOrMany::Many(vec!["Alpha".into(), "Beta".into()])),
            filters: Some(OneOrMany::One(filters.display().to_string())),
            alarms: Some(OneOrMany::Many(vec![
                alpha_alarms.display().to_string(),
                beta_alarms.display().to_string(),
            ])),
            ..Default::default()
        };
        let settings = ConfigLoader::resolve(None, source).unwrap();
        let registry =
            SinkRegistry::build(&settings.manager_configs(), &AlarmManagerFactory).unwrap();

        let (queue, consumer) = ingestion_queue();
        queue
            .put(json!({
                "type": "pokestop",
                "message": { "pokestop_id": "stop-1", "lure_expiration": 4102444800i64 }
            }))
            .unwrap();
        queue
            .put(json!({"type": "gym", "message": {"gym_id": "gym-1"}}))
            .unwrap();
        drop(queue);

        let summary = DispatchWorker::new(consumer, registry).run().await;
        assert_eq!(summary.metrics.dispatched, 2);
        assert_eq!(summary.metrics.sink_failures, 0);

        for out in [alpha_out, beta_out] {
            let content = fs::read_to_string(out).unwrap();
            let lines: Vec<&str> = content.lines().collect();
            assert_eq!(lines.len(), 1);
            let record: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
            assert_eq!(record["id"], "stop-1");
            assert_eq!(record["kind"], "pokestop");
        }

        // Normalizer output and manager input agree on the event shape.
        assert!(EventNormalizer::new()
            .normalize(&json!({"type": "gym", "message": {"gym_id": "gym-1"}}))
            .is_some());
    }
}
