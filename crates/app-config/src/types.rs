// In crates/app-config/src/types.rs

use serde::Deserialize;

/// The top-level application settings, deserialized from the layered
/// configuration sources.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub server: ServerSettings,
    pub insights: InsightSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

/// Settings for the AI-insight generation path.
#[derive(Debug, Clone, Deserialize)]
pub struct InsightSettings {
    /// Chat-completions style endpoint, e.g. `https://api.groq.com/openai/v1`.
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    /// How long a generated insight stays fresh.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
    /// Hard timeout on a single generation request.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_max_connections() -> u32 {
    5
}

fn default_cache_ttl_secs() -> u64 {
    3600
}

fn default_request_timeout_secs() -> u64 {
    30
}
