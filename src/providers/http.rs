//! HTTP adapter for the upstream interest and subscription service.
//!
//! Transient failures are retried by the client's middleware. Anything that
//! still fails surfaces as an [`UpstreamError`], which the dispatch engine
//! turns into an empty answer.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest_middleware::ClientWithMiddleware;
use serde::de::DeserializeOwned;
use url::Url;

use super::traits::{InterestSource, SubscriptionSource, UpstreamError};
use crate::models::{InterestRecord, SubscriptionRecord};

/// Reads interest and subscription records from a REST service.
///
/// - `GET {base}/active-items?source={source}` returns `[InterestRecord]`
/// - `GET {base}/subscriptions/{item_id}` returns `[SubscriptionRecord]`
pub struct HttpUpstream {
    base_url: Url,
    client: Arc<ClientWithMiddleware>,
    api_key: Option<String>,
}

impl HttpUpstream {
    /// Creates a new adapter for the service at `base_url`.
    pub fn new(base_url: Url, client: Arc<ClientWithMiddleware>, api_key: Option<String>) -> Self {
        Self { base_url, client, api_key }
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, UpstreamError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| UpstreamError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, UpstreamError> {
        let mut headers = HeaderMap::new();
        if let Some(key) = &self.api_key {
            let value = HeaderValue::from_str(&format!("Bearer {key}"))
                .map_err(|e| UpstreamError::Unavailable(format!("Invalid API key header: {e}")))?;
            headers.insert(AUTHORIZATION, value);
        }

        tracing::debug!(url = %url, "Querying upstream.");
        let response = self.client.get(url).headers(headers).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status(status.as_u16()));
        }

        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl InterestSource for HttpUpstream {
    async fn get_active_items(&self, source: &str) -> Result<Vec<InterestRecord>, UpstreamError> {
        let mut url = self.endpoint(&["active-items"])?;
        url.query_pairs_mut().append_pair("source", source);
        self.get_json(url).await
    }
}

#[async_trait]
impl SubscriptionSource for HttpUpstream {
    async fn get_subscriptions(
        &self,
        item_id: &str,
    ) -> Result<Vec<SubscriptionRecord>, UpstreamError> {
        let url = self.endpoint(&["subscriptions", item_id])?;
        self.get_json(url).await
    }
}
