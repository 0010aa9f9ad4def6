#![warn(missing_docs)]
//! Valohub watches per-region store snapshots and pushes a notification when
//! an item someone is waiting for shows up in their region.

pub mod cmd;
pub mod config;
pub mod context;
pub mod engine;
pub mod http_client;
pub mod http_server;
pub mod models;
pub mod notification;
pub mod providers;
pub mod supervisor;
pub mod test_helpers;
