use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{error, info};

use super::messages::{ConnectionDetails, CredentialRequest};
use crate::error::CredentialError;

/// Maximum length of an error body carried into error messages
const MAX_ERROR_BODY_LEN: usize = 256;

/// Source of connection credentials
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    async fn fetch(&self, request: &CredentialRequest) -> Result<ConnectionDetails, CredentialError>;
}

/// HTTP client for the connection-details endpoint
pub struct HttpCredentialClient {
    client: Client,
    endpoint: String,
}

impl HttpCredentialClient {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, CredentialError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }
}

#[async_trait]
impl CredentialProvider for HttpCredentialClient {
    async fn fetch(&self, request: &CredentialRequest) -> Result<ConnectionDetails, CredentialError> {
        info!(
            "Requesting credentials for {} in room {}",
            request.participant_name, request.room_name
        );

        let response = self
            .client
            .get(&self.endpoint)
            .query(&request.query_pairs())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Credential service returned {}", status);
            return Err(CredentialError::RequestFailed {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        let details: ConnectionDetails = response.json().await?;
        info!("Received credentials for server {}", details.server_url);

        Ok(details)
    }
}

fn truncate_body(body: &str) -> String {
    if body.len() <= MAX_ERROR_BODY_LEN {
        return body.to_string();
    }

    let mut end = MAX_ERROR_BODY_LEN;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...[truncated]", &body[..end])
}
