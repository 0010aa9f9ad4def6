//! # Notifications
//!
//! Everything needed to turn an eligible batch item into a delivered push
//! notification.
//!
//! - **`NotificationSink`**: the capability the dispatch engine sends through.
//!   Implementations are [`RelaySink`] (HTTP push relay) and [`StdoutSink`]
//!   (dry runs).
//! - **`ChannelNamer`**: derives `{namespace}/{region}/{source}/{item_id}`.
//! - **`MessageComposer`**: renders titles and bodies from item metadata with
//!   minijinja templates.
//!
//! Delivery failures are reported as [`NotificationError`] and are never fatal
//! to a batch.

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::models::Notification;

pub mod channel;
pub mod error;
pub mod relay;
pub mod stdout;
pub mod template;

pub use channel::{ChannelNamer, DEFAULT_NAMESPACE};
pub use error::NotificationError;
pub use relay::RelaySink;
pub use stdout::StdoutSink;
pub use template::{
    DEFAULT_BODY_TEMPLATE, DEFAULT_TITLE_TEMPLATE, MessageComposer, TemplateService,
    TemplateServiceError,
};

/// Sends a rendered notification to a named channel.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Delivers the notification. An error means it was not delivered.
    async fn send(&self, notification: &Notification) -> Result<(), NotificationError>;
}
