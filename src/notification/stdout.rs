use async_trait::async_trait;

use super::{NotificationSink, error::NotificationError};
use crate::models::Notification;

/// A sink that prints notifications to standard output.
#[derive(Debug, Default)]
pub struct StdoutSink;

#[async_trait]
impl NotificationSink for StdoutSink {
    async fn send(&self, notification: &Notification) -> Result<(), NotificationError> {
        println!(
            "=== Notification: {} ===\n{}\n{}\n",
            notification.channel, notification.title, notification.body
        );
        Ok(())
    }
}
