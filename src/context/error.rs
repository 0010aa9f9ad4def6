use thiserror::Error;

use crate::{config::ConfigValidationError, http_client::HttpClientPoolError};

/// Errors that can occur during application context initialization.
#[derive(Debug, Error)]
pub enum AppContextError {
    /// Configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),

    /// Configuration was loaded but is invalid.
    #[error("Invalid configuration: {0}")]
    Validation(#[from] ConfigValidationError),

    /// An HTTP client could not be created.
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] HttpClientPoolError),
}
