//! Construction of the HTTP clients used by the upstream adapter and the
//! relay sink.

use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{Jitter, RetryTransientMiddleware, policies::ExponentialBackoff};

use crate::config::{EndpointConnection, HttpRetryConfig, JitterSetting};

/// Builds the underlying `reqwest` client for one endpoint.
pub fn build_base_client(
    connection: &EndpointConnection,
) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .pool_max_idle_per_host(connection.max_idle)
        .pool_idle_timeout(Some(connection.idle_timeout_secs))
        .connect_timeout(connection.connect_timeout_ms)
        .build()
}

/// Wraps `base_client` with a middleware retrying transient failures
/// (connection errors, 5xx, 429) with exponential backoff.
pub fn create_retryable_http_client(
    config: &HttpRetryConfig,
    base_client: reqwest::Client,
) -> ClientWithMiddleware {
    let policy_builder = match config.jitter {
        JitterSetting::None => ExponentialBackoff::builder().jitter(Jitter::None),
        JitterSetting::Full => ExponentialBackoff::builder().jitter(Jitter::Full),
    };

    let retry_policy = policy_builder
        .base(config.base_for_backoff)
        .retry_bounds(config.initial_backoff_ms, config.max_backoff_secs)
        .build_with_max_retries(config.max_retries);

    ClientBuilder::new(base_client)
        .with(RetryTransientMiddleware::new_with_policy(retry_policy))
        .build()
}

/// Wraps `base_client` without any retry layer. Each request is sent once.
pub fn create_single_shot_http_client(base_client: reqwest::Client) -> ClientWithMiddleware {
    ClientBuilder::new(base_client).build()
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn test_retries_server_errors_until_success() {
        let mut server = mockito::Server::new_async().await;
        let failing = server.mock("GET", "/").with_status(503).expect(2).create_async().await;

        let config = HttpRetryConfig {
            max_retries: 1,
            initial_backoff_ms: Duration::from_millis(1),
            max_backoff_secs: Duration::from_millis(2),
            jitter: JitterSetting::None,
            ..Default::default()
        };
        let base = build_base_client(&EndpointConnection::default()).unwrap();
        let client = create_retryable_http_client(&config, base);

        let response = client.get(server.url()).send().await.unwrap();
        assert_eq!(response.status(), 503);
        failing.assert_async().await;
    }

    #[tokio::test]
    async fn test_single_shot_client_does_not_retry() {
        let mut server = mockito::Server::new_async().await;
        let failing = server.mock("POST", "/push").with_status(503).expect(1).create_async().await;

        let base = build_base_client(&EndpointConnection::default()).unwrap();
        let client = create_single_shot_http_client(base);

        let response = client.post(format!("{}/push", server.url())).send().await.unwrap();
        assert_eq!(response.status(), 503);
        failing.assert_async().await;
    }
}
