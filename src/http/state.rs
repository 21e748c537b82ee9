use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::credentials::TokenIssuer;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Signs participant tokens for `/api/connection-details`
    pub issuer: Arc<TokenIssuer>,

    /// Simulated backend latency for `start_translation`
    pub start_delay: Duration,
}

impl AppState {
    pub fn new(issuer: TokenIssuer, start_delay: Duration) -> Self {
        Self {
            issuer: Arc::new(issuer),
            start_delay,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let issuer = TokenIssuer::new(
            &config.credentials.api_key,
            &config.credentials.api_secret,
            &config.credentials.server_url,
            Duration::from_secs(config.credentials.token_ttl_secs),
        );

        Self::new(issuer, Duration::from_millis(config.gateway.start_delay_ms))
    }
}
