use std::{collections::HashSet, sync::Mutex};

use async_trait::async_trait;

use crate::{
    models::Notification,
    notification::{NotificationError, NotificationSink},
};

/// A sink that records every notification and can be told to fail for
/// specific channels.
#[derive(Default)]
pub struct RecordingSink {
    sent: Mutex<Vec<Notification>>,
    failing_channels: Mutex<HashSet<String>>,
}

impl RecordingSink {
    /// Creates a sink that accepts everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes delivery to `channel` fail.
    pub fn fail_channel(&self, channel: &str) {
        self.failing_channels.lock().unwrap().insert(channel.to_string());
    }

    /// Returns the notifications delivered so far.
    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }

    /// Returns the channels delivered to so far, in order.
    pub fn channels(&self) -> Vec<String> {
        self.sent.lock().unwrap().iter().map(|n| n.channel.clone()).collect()
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn send(&self, notification: &Notification) -> Result<(), NotificationError> {
        if self.failing_channels.lock().unwrap().contains(&notification.channel) {
            return Err(NotificationError::NotifyFailed(format!(
                "delivery to {} refused",
                notification.channel
            )));
        }
        self.sent.lock().unwrap().push(notification.clone());
        Ok(())
    }
}
