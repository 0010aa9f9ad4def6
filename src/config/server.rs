use serde::Deserialize;

/// Configuration for the HTTP ingest and status server.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Whether the server is started by the supervisor.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Address and port for the HTTP server to listen on.
    #[serde(default = "default_listen_address")]
    pub listen_address: String,

    /// Optional API key protecting the ingest endpoint.
    /// If not set in config, falls back to the `VALOHUB_API_KEY` env var.
    #[serde(default = "default_api_key_from_env")]
    pub api_key: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            listen_address: default_listen_address(),
            api_key: None,
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_listen_address() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_api_key_from_env() -> Option<String> {
    std::env::var("VALOHUB_API_KEY").ok()
}
