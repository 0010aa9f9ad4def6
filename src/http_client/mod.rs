//! HTTP clients for the upstream service and the push relay, and a pool
//! sharing them.

mod client;
mod pool;

pub use client::{
    build_base_client, create_retryable_http_client, create_single_shot_http_client,
};
pub use pool::{HttpClientPool, HttpClientPoolError};
