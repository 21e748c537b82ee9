use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use std::time::Duration;
use tracing::debug;

use super::messages::{AccessClaims, ConnectionDetails, VideoGrant};

/// Mints signed participant tokens for the connection-details endpoint
pub struct TokenIssuer {
    api_key: String,
    api_secret: String,
    server_url: String,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(api_key: &str, api_secret: &str, server_url: &str, ttl: Duration) -> Self {
        Self {
            api_key: api_key.to_string(),
            api_secret: api_secret.to_string(),
            server_url: server_url.to_string(),
            ttl,
        }
    }

    /// Issue a token letting `identity` join, publish and subscribe in `room`
    pub fn issue(
        &self,
        room: &str,
        identity: &str,
        metadata: Option<&str>,
    ) -> Result<ConnectionDetails, jsonwebtoken::errors::Error> {
        let now = Utc::now().timestamp();
        let ttl = i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX);
        let claims = AccessClaims {
            iss: self.api_key.clone(),
            sub: identity.to_string(),
            name: identity.to_string(),
            metadata: metadata.map(str::to_string),
            nbf: now,
            exp: now.saturating_add(ttl),
            video: VideoGrant {
                room: room.to_string(),
                room_join: true,
                can_publish: true,
                can_subscribe: true,
            },
        };

        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.api_secret.as_bytes()),
        )?;

        debug!("Issued token for {} in room {}", identity, room);

        Ok(ConnectionDetails {
            server_url: self.server_url.clone(),
            participant_token: token,
        })
    }

    /// Verify signature and expiry of a token this issuer minted
    pub fn verify(&self, token: &str) -> Result<AccessClaims, jsonwebtoken::errors::Error> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[self.api_key.as_str()]);

        let data = decode::<AccessClaims>(
            token,
            &DecodingKey::from_secret(self.api_secret.as_bytes()),
            &validation,
        )?;

        Ok(data.claims)
    }
}

/// Read token claims without checking the signature.
///
/// Only the media server can verify a token; clients use this to learn
/// their own identity and grant.
pub fn peek_claims(token: &str) -> Result<AccessClaims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.required_spec_claims.clear();

    let data = decode::<AccessClaims>(token, &DecodingKey::from_secret(&[]), &validation)?;
    Ok(data.claims)
}
