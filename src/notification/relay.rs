//! Push relay notification sink.
//!
//! Posts each notification as JSON to a relay endpoint which fans it out to
//! the subscribers of the channel. When a secret is configured the payload is
//! signed with HMAC-SHA256 so the relay can authenticate the sender.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use chrono::Utc;
use hmac::{Hmac, Mac};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest_middleware::ClientWithMiddleware;
use serde_json::json;
use sha2::Sha256;
use url::Url;

use super::{NotificationSink, error::NotificationError};
use crate::models::Notification;

/// HMAC SHA256 type alias
type HmacSha256 = Hmac<Sha256>;

/// Sends notifications to an HTTP push relay.
#[derive(Debug)]
pub struct RelaySink {
    /// Relay endpoint receiving the notifications.
    url: Url,
    /// Configured HTTP client with retry capabilities.
    client: Arc<ClientWithMiddleware>,
    /// Secret used to sign payloads.
    secret: Option<String>,
    /// Extra headers sent with every request.
    headers: HashMap<String, String>,
}

impl RelaySink {
    /// Creates a new relay sink.
    pub fn new(
        url: Url,
        client: Arc<ClientWithMiddleware>,
        secret: Option<String>,
        headers: Option<HashMap<String, String>>,
    ) -> Self {
        Self { url, client, secret, headers: headers.unwrap_or_default() }
    }

    /// Signs `payload` and returns the hex signature together with the
    /// millisecond timestamp that was signed.
    pub fn sign_payload(
        &self,
        secret: &str,
        payload: &serde_json::Value,
    ) -> Result<(String, String), NotificationError> {
        // `new_from_slice` accepts empty keys, so reject them here.
        if secret.is_empty() {
            return Err(NotificationError::NotifyFailed(
                "Invalid secret: cannot be empty.".to_string(),
            ));
        }

        let timestamp = Utc::now().timestamp_millis();

        let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
            .map_err(|e| NotificationError::ConfigError(format!("Invalid secret: {e}")))?;

        let serialized_payload = serde_json::to_string(payload).map_err(|e| {
            NotificationError::InternalError(format!("Failed to serialize payload: {e}"))
        })?;
        mac.update(format!("{serialized_payload}{timestamp}").as_bytes());

        let signature = hex::encode(mac.finalize().into_bytes());

        Ok((signature, timestamp.to_string()))
    }

    fn build_headers(&self, payload: &serde_json::Value) -> Result<HeaderMap, NotificationError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static("content-type"),
            HeaderValue::from_static("application/json"),
        );

        if let Some(secret) = &self.secret {
            let (signature, timestamp) = self.sign_payload(secret, payload)?;
            headers.insert(
                HeaderName::from_static("x-signature"),
                HeaderValue::from_str(&signature).map_err(|e| {
                    NotificationError::NotifyFailed(format!("Invalid signature value: {e}"))
                })?,
            );
            headers.insert(
                HeaderName::from_static("x-timestamp"),
                HeaderValue::from_str(&timestamp).map_err(|e| {
                    NotificationError::NotifyFailed(format!("Invalid timestamp value: {e}"))
                })?,
            );
        }

        for (key, value) in &self.headers {
            let header_name = HeaderName::from_bytes(key.as_bytes()).map_err(|e| {
                NotificationError::NotifyFailed(format!("Invalid header name: {key}: {e}"))
            })?;
            let header_value = HeaderValue::from_str(value).map_err(|e| {
                NotificationError::NotifyFailed(format!(
                    "Invalid header value for {key}: {value}: {e}"
                ))
            })?;
            headers.insert(header_name, header_value);
        }

        Ok(headers)
    }
}

#[async_trait]
impl NotificationSink for RelaySink {
    async fn send(&self, notification: &Notification) -> Result<(), NotificationError> {
        let payload = json!({
            "channel": notification.channel,
            "title": notification.title,
            "body": notification.body,
            "icon": notification.icon,
        });
        let headers = self.build_headers(&payload)?;

        let response =
            self.client.post(self.url.as_str()).headers(headers).json(&payload).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotificationError::NotifyFailed(format!(
                "Relay request failed with status: {status}"
            )));
        }

        Ok(())
    }
}
