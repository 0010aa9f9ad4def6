//! Data models for notifications.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Title and body templates used to render a notification.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct NotificationMessage {
    /// The title of the notification message.
    pub title: String,
    /// The body content of the notification message.
    pub body: String,
}

/// A fully rendered notification addressed to a channel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Notification {
    /// The channel the notification is published to.
    pub channel: String,
    /// The rendered title.
    pub title: String,
    /// The rendered body.
    pub body: String,
    /// Optional icon URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

/// A notification that was successfully handed to the sink.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SentNotification {
    /// The item the notification was about.
    pub item_id: String,
    /// The channel it was published to.
    pub channel: String,
    /// The rendered title.
    pub title: String,
    /// When the notification was sent.
    pub sent_at: DateTime<Utc>,
}
