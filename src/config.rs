use anyhow::{Context, Result};
use serde::Deserialize;
use std::fmt;

use crate::prejoin::TranslationSettings;
use crate::session::{QualityOptions, VideoCodec};

#[derive(Debug, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub credentials: CredentialsConfig,
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub translation: TranslationConfig,
    #[serde(default)]
    pub room: RoomConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Deserialize)]
pub struct CredentialsConfig {
    /// Connection-details URL the client fetches credentials from
    pub endpoint: String,
    /// Media server address handed out with every token
    pub server_url: String,
    pub api_key: String,
    pub api_secret: String,
    #[serde(default = "default_token_ttl_secs")]
    pub token_ttl_secs: u64,
}

impl fmt::Debug for CredentialsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialsConfig")
            .field("endpoint", &self.endpoint)
            .field("server_url", &self.server_url)
            .field("api_key", &self.api_key)
            .field("api_secret", &"[REDACTED]")
            .field("token_ttl_secs", &self.token_ttl_secs)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
pub struct GatewayConfig {
    /// Notification gateway URL the client posts to
    pub endpoint: String,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    #[serde(default = "default_stop_timeout_ms")]
    pub stop_timeout_ms: u64,
    /// Simulated backend latency when serving `start_translation`
    #[serde(default = "default_start_delay_ms")]
    pub start_delay_ms: u64,
}

#[derive(Debug, Default, Deserialize)]
pub struct TranslationConfig {
    /// Identities allowed to toggle translation
    #[serde(default)]
    pub allowed_identities: Vec<String>,
    #[serde(default)]
    pub settings: TranslationSettings,
}

#[derive(Debug, Default, Deserialize)]
pub struct RoomConfig {
    #[serde(default)]
    pub hq: bool,
    #[serde(default)]
    pub codec: VideoCodec,
    pub region: Option<String>,
}

impl RoomConfig {
    pub fn quality(&self) -> QualityOptions {
        QualityOptions {
            hq: self.hq,
            codec: self.codec,
        }
    }
}

fn default_token_ttl_secs() -> u64 {
    300
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

fn default_stop_timeout_ms() -> u64 {
    5_000
}

fn default_start_delay_ms() -> u64 {
    2_000
}

impl Config {
    /// Load from a TOML file, overridden by `KNECT_*` environment variables
    /// (e.g. `KNECT_GATEWAY__ENDPOINT`)
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(
                config::Environment::with_prefix("KNECT")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .with_context(|| format!("Failed to read config from {}", path))?;

        settings
            .try_deserialize()
            .context("Invalid configuration")
    }
}
