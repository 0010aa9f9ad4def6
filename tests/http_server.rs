// Integration test root for http_server tests.
// Submodules live under `tests/http_server/` directory.

#[path = "http_server/helpers.rs"]
mod helpers;

#[path = "http_server/health.rs"]
mod health;

#[path = "http_server/status.rs"]
mod status;

#[path = "http_server/ingest.rs"]
mod ingest;
