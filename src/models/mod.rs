//! Data models shared across the engine, adapters and HTTP surface.

pub mod batch;
pub mod dispatch;
pub mod interest;
pub mod notification;
pub mod region;

pub use batch::{BatchItem, DEFAULT_SOURCE, InboundBatch};
pub use dispatch::{DispatchResult, SkipReason};
pub use interest::{InterestRecord, SubscriptionRecord};
pub use notification::{Notification, NotificationMessage, SentNotification};
pub use region::{RegionConfig, RegionId};
