//! Connection credentials
//!
//! - `HttpCredentialClient` fetches `{serverUrl, participantToken}` for the controller
//! - `TokenIssuer` mints those tokens behind `GET /api/connection-details`

mod client;
mod issuer;
mod messages;

pub use client::{CredentialProvider, HttpCredentialClient};
pub use issuer::{peek_claims, TokenIssuer};
pub use messages::{AccessClaims, ConnectionDetails, CredentialRequest, VideoGrant};
