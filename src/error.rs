//! Error types for the session lifecycle and its collaborators.
//!
//! Setup and connect failures abort a connection attempt. Device failures are
//! reported as warnings on the session event feed and never surface here as
//! fatal errors. Translation stop failures are logged only.

use thiserror::Error;

use crate::session::SessionPhase;
use crate::transport::DeviceKind;

/// Pre-join capture and room-join entry errors.
#[derive(Debug, Error)]
pub enum PreJoinError {
    #[error("Username must not be empty")]
    EmptyUsername,

    #[error("Invalid room URL: {0}")]
    InvalidUrl(String),

    #[error("Room URL does not name a room")]
    MissingRoom,
}

/// Credential service client errors.
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Credential request failed with status {status}: {body}")]
    RequestFailed { status: u16, body: String },

    #[error("Failed to encode translation metadata: {0}")]
    Metadata(#[from] serde_json::Error),
}

/// Notification gateway client errors.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Gateway rejected request with status {status}: {error}")]
    Rejected { status: u16, error: String },

    #[error("Gateway did not acknowledge the request")]
    NotAcknowledged,
}

/// Errors raised by a real-time session implementation.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Connect failed: {0}")]
    ConnectFailed(String),

    #[error("Invalid credential: {0}")]
    InvalidCredential(String),

    #[error("Failed to enable {device}: {reason}")]
    Device { device: DeviceKind, reason: String },

    #[error("Session is not connected")]
    NotConnected,
}

/// Session lifecycle controller errors.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Cannot request a connection while {0}")]
    InvalidPhase(SessionPhase),

    #[error("Connection setup failed: {0}")]
    ConnectionSetupFailed(#[source] CredentialError),

    #[error("Connection failed: {0}")]
    ConnectionFailed(#[source] TransportError),

    /// The user left before this attempt completed; its result was discarded.
    #[error("Connection attempt abandoned after leave")]
    Abandoned,
}

/// Translation coordinator errors.
#[derive(Debug, Error)]
pub enum TranslationError {
    #[error("Translation requires a connected session")]
    NotConnected,

    #[error("Participant {0} is not authorized to use translation")]
    NotAuthorized(String),

    #[error("A translation request is already in flight")]
    RequestInFlight,

    #[error("Translation is already active")]
    AlreadyActive,

    #[error("Translation request failed: {0}")]
    RequestFailed(#[source] NotifyError),
}
