use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{info, warn};

use super::messages::{ErrorResponse, NotifyAck, NotifyRequest};
use crate::error::NotifyError;

/// Channel to the external translation backend.
///
/// Treated as fallible and possibly slow.
#[async_trait]
pub trait NotificationGateway: Send + Sync {
    async fn notify(&self, request: &NotifyRequest) -> Result<NotifyAck, NotifyError>;
}

/// HTTP client for `POST /api/notify-bot`
pub struct HttpNotificationGateway {
    client: Client,
    endpoint: String,
}

impl HttpNotificationGateway {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, NotifyError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }
}

#[async_trait]
impl NotificationGateway for HttpNotificationGateway {
    async fn notify(&self, request: &NotifyRequest) -> Result<NotifyAck, NotifyError> {
        info!(
            "Notifying gateway: {:?} for {}",
            request.action, request.username
        );

        let response = self.client.post(&self.endpoint).json(request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let error = match response.json::<ErrorResponse>().await {
                Ok(body) => body.error,
                Err(_) => status.canonical_reason().unwrap_or("unknown error").to_string(),
            };
            warn!("Gateway rejected {:?}: {} ({})", request.action, error, status);
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                error,
            });
        }

        let ack: NotifyAck = response.json().await?;
        if !ack.success {
            return Err(NotifyError::NotAcknowledged);
        }

        info!("Gateway acknowledged {:?}: {}", request.action, ack.message);

        Ok(ack)
    }
}
