use std::{net::SocketAddr, sync::Arc, time::Duration};

use chrono::{Timelike, Utc};
use reqwest::Client;
use tokio::task;
use tokio_util::sync::CancellationToken;
use valohub::{
    config::{AppConfig, ServerConfig},
    context::{AppMetrics, build_engine},
    http_server,
    models::RegionConfig,
    providers::GuardedUpstream,
    test_helpers::{InMemoryUpstream, RecordingSink},
};

/// Region whose window is open for the duration of a test run.
pub const OPEN_REGION: &str = "open";

/// Region whose window is closed for the duration of a test run.
pub const CLOSED_REGION: &str = "closed";

pub const API_KEY: &str = "test-key";

/// Builds two regions relative to the current UTC hour: one whose window
/// spans this hour and the next, and one that opens two hours from now.
pub fn create_test_server_config(address: &str, api_key: Option<&str>) -> AppConfig {
    let hour = Utc::now().hour() as u8;
    AppConfig {
        regions: vec![
            RegionConfig::new(OPEN_REGION, hour, (hour + 2) % 24),
            RegionConfig::new(CLOSED_REGION, (hour + 2) % 24, (hour + 3) % 24),
        ],
        server: ServerConfig {
            listen_address: address.into(),
            api_key: api_key.map(str::to_string),
            ..Default::default()
        },
        ..Default::default()
    }
}

pub struct TestServer {
    pub address: SocketAddr,
    pub server_handle: task::JoinHandle<()>,
    pub client: Client,
    pub sink: Arc<RecordingSink>,
    shutdown: CancellationToken,
}

impl TestServer {
    pub async fn new(upstream: InMemoryUpstream, api_key: Option<&str>) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to get address");
        drop(listener); // Release port for the app to use

        let config = Arc::new(create_test_server_config(&addr.to_string(), api_key));
        let upstream = Arc::new(upstream);
        let sink = Arc::new(RecordingSink::new());
        let engine = Arc::new(
            build_engine(
                &config,
                GuardedUpstream::new(upstream.clone(), upstream, Duration::from_millis(500)),
                sink.clone(),
            )
            .expect("Failed to build engine"),
        );

        let shutdown = CancellationToken::new();
        let server_shutdown = shutdown.clone();
        let server_handle = task::spawn(async move {
            http_server::run_server_from_config(
                config,
                engine,
                AppMetrics::default(),
                server_shutdown,
            )
            .await
            .expect("Server failed");
        });

        // Wait for server to start
        tokio::time::sleep(Duration::from_millis(500)).await;

        Self { address: addr, server_handle, client: Client::new(), sink, shutdown }
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        let url = format!("http://{}{}", self.address, path);
        self.client.get(&url).send().await.expect("Request failed")
    }

    pub async fn post(&self, path: &str) -> reqwest::RequestBuilder {
        let url = format!("http://{}{}", self.address, path);
        self.client.post(&url)
    }

    pub fn cleanup(self) {
        self.shutdown.cancel();
        self.server_handle.abort();
    }
}
