//! Adapters for the upstream services that say which items matter and who is
//! subscribed to them.

pub mod guard;
pub mod http;
pub mod traits;

pub use guard::GuardedUpstream;
pub use http::HttpUpstream;
pub use traits::{InterestSource, SubscriptionSource, UpstreamError};
