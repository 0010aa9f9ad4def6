//! A reusable, thread-safe pool of HTTP clients.
//!
//! Clients are keyed by their connection settings and retry policy, so the
//! upstream adapter and the relay sink only share a client when both agree
//! on how to connect and whether to retry.

use std::{collections::HashMap, sync::Arc};

use reqwest_middleware::ClientWithMiddleware;
use thiserror::Error;
use tokio::sync::RwLock;

use super::client::{
    build_base_client, create_retryable_http_client, create_single_shot_http_client,
};
use crate::config::{EndpointConnection, HttpRetryConfig};

/// Errors that can occur within the `HttpClientPool`.
#[derive(Debug, Error)]
pub enum HttpClientPoolError {
    /// An error occurred while building the underlying `reqwest::Client`.
    #[error("Failed to create HTTP client: {0}")]
    HttpClientBuildError(String),
}

type ClientKey = (EndpointConnection, Option<String>);

/// A pool for managing and reusing HTTP clients.
#[derive(Default)]
pub struct HttpClientPool {
    clients: Arc<RwLock<HashMap<ClientKey, Arc<ClientWithMiddleware>>>>,
}

impl HttpClientPool {
    /// Creates a new, empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets the client for `connection`, creating it on first use. With a
    /// `retry_policy` the client retries transient failures; without one it
    /// sends every request exactly once.
    pub async fn get_or_create(
        &self,
        connection: &EndpointConnection,
        retry_policy: Option<&HttpRetryConfig>,
    ) -> Result<Arc<ClientWithMiddleware>, HttpClientPoolError> {
        let key = (connection.clone(), retry_policy.map(|policy| format!("{policy:?}")));

        if let Some(client) = self.clients.read().await.get(&key) {
            return Ok(client.clone());
        }

        let mut clients = self.clients.write().await;
        // Another task may have created it while we waited for the write lock.
        if let Some(client) = clients.get(&key) {
            return Ok(client.clone());
        }

        let base_client = build_base_client(connection)
            .map_err(|e| HttpClientPoolError::HttpClientBuildError(e.to_string()))?;

        let new_client = Arc::new(match retry_policy {
            Some(policy) => create_retryable_http_client(policy, base_client),
            None => create_single_shot_http_client(base_client),
        });
        clients.insert(key, new_client.clone());

        Ok(new_client)
    }

    /// Returns the number of clients in the pool.
    pub async fn len(&self) -> usize {
        self.clients.read().await.len()
    }

    /// Returns true if no client was created yet.
    pub async fn is_empty(&self) -> bool {
        self.clients.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_pool_init_empty() {
        let pool = HttpClientPool::default();
        assert!(pool.is_empty().await);
    }

    #[tokio::test]
    async fn test_pool_returns_same_client() {
        let pool = HttpClientPool::default();
        let connection = EndpointConnection::default();
        let retry_config = HttpRetryConfig::default();
        let client1 = pool.get_or_create(&connection, Some(&retry_config)).await.unwrap();
        let client2 = pool.get_or_create(&connection, Some(&retry_config)).await.unwrap();

        assert!(Arc::ptr_eq(&client1, &client2));
        assert_eq!(pool.len().await, 1);
    }

    #[tokio::test]
    async fn test_pool_separates_retrying_and_single_shot_clients() {
        let pool = HttpClientPool::default();
        let connection = EndpointConnection::default();
        let retry_config = HttpRetryConfig::default();

        let retrying = pool.get_or_create(&connection, Some(&retry_config)).await.unwrap();
        let single_shot = pool.get_or_create(&connection, None).await.unwrap();

        assert!(!Arc::ptr_eq(&retrying, &single_shot));
        assert_eq!(pool.len().await, 2);
    }

    #[tokio::test]
    async fn test_pool_separates_connection_settings() {
        let pool = HttpClientPool::default();
        let fast = EndpointConnection {
            connect_timeout_ms: std::time::Duration::from_millis(100),
            ..Default::default()
        };

        let client1 = pool.get_or_create(&EndpointConnection::default(), None).await.unwrap();
        let client2 = pool.get_or_create(&fast, None).await.unwrap();

        assert!(!Arc::ptr_eq(&client1, &client2));
        assert_eq!(pool.len().await, 2);
    }

    #[tokio::test]
    async fn test_pool_concurrent_access() {
        let pool = Arc::new(HttpClientPool::default());
        let retry_config = HttpRetryConfig::default();

        let tasks: Vec<_> = (0..10)
            .map(|_| {
                let pool = Arc::clone(&pool);
                let retry_config = retry_config.clone();
                tokio::spawn(async move {
                    pool.get_or_create(&EndpointConnection::default(), Some(&retry_config))
                        .await
                        .is_ok()
                })
            })
            .collect();

        for result in futures::future::join_all(tasks).await {
            assert!(result.unwrap());
        }
        assert_eq!(pool.len().await, 1);
    }
}
