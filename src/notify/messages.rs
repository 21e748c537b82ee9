use serde::{Deserialize, Serialize};

use crate::prejoin::TranslationSettings;

/// Action requested from the translation backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotifyAction {
    StartTranslation,
    StopTranslation,
}

/// Request body posted to the notification gateway
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotifyRequest {
    pub action: NotifyAction,
    pub username: String,
    /// Present only for `start_translation`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<TranslationSettings>,
}

impl NotifyRequest {
    pub fn start(username: &str, settings: TranslationSettings) -> Self {
        Self {
            action: NotifyAction::StartTranslation,
            username: username.to_string(),
            settings: Some(settings),
        }
    }

    pub fn stop(username: &str) -> Self {
        Self {
            action: NotifyAction::StopTranslation,
            username: username.to_string(),
            settings: None,
        }
    }
}

/// Successful gateway acknowledgement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotifyAck {
    pub success: bool,
    pub message: String,
}

/// Error body returned by the gateway and the token endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
