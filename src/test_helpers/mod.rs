//! A set of helpers for testing

mod engine;
mod http_client;
mod sink;
mod upstream;

pub use engine::{EngineBuilder, test_time};
pub use http_client::create_test_http_client;
pub use sink::RecordingSink;
pub use upstream::InMemoryUpstream;
