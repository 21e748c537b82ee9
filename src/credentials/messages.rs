use serde::{Deserialize, Serialize};
use std::fmt;

/// Query sent to the credential service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialRequest {
    pub room_name: String,
    pub participant_name: String,
    /// Opaque metadata stored on the participant (JSON-encoded translation settings)
    pub metadata: Option<String>,
    pub region: Option<String>,
}

impl CredentialRequest {
    pub(crate) fn query_pairs(&self) -> Vec<(&'static str, &str)> {
        let mut pairs = vec![
            ("roomName", self.room_name.as_str()),
            ("participantName", self.participant_name.as_str()),
        ];
        if let Some(metadata) = &self.metadata {
            pairs.push(("metadata", metadata.as_str()));
        }
        if let Some(region) = &self.region {
            pairs.push(("region", region.as_str()));
        }
        pairs
    }
}

/// Server address plus signed participant token
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionDetails {
    pub server_url: String,
    pub participant_token: String,
}

impl fmt::Debug for ConnectionDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionDetails")
            .field("server_url", &self.server_url)
            .field("participant_token", &"[REDACTED]")
            .finish()
    }
}

/// Room permissions embedded in the token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoGrant {
    pub room: String,
    pub room_join: bool,
    pub can_publish: bool,
    pub can_subscribe: bool,
}

/// JWT claims of a participant token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// API key that signed the token
    pub iss: String,
    /// Participant identity
    pub sub: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<String>,
    pub nbf: i64,
    pub exp: i64,
    pub video: VideoGrant,
}
