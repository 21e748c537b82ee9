use serde::Serialize;
use std::fmt;

use crate::transport::{DeviceKind, DisconnectReason};
use crate::translation::TranslationPhase;

/// Connection phase of the session lifecycle controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionPhase {
    Idle,
    AwaitingCredential,
    Connecting,
    Connected,
    Disconnected,
}

impl SessionPhase {
    /// Phases in which a teardown has something to release
    pub fn is_live(&self) -> bool {
        matches!(
            self,
            SessionPhase::AwaitingCredential | SessionPhase::Connecting | SessionPhase::Connected
        )
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionPhase::Idle => "idle",
            SessionPhase::AwaitingCredential => "awaiting credential",
            SessionPhase::Connecting => "connecting",
            SessionPhase::Connected => "connected",
            SessionPhase::Disconnected => "disconnected",
        };
        f.write_str(name)
    }
}

/// Why a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EndReason {
    /// The local user left
    Left,
    /// The remote side closed the session
    Remote(DisconnectReason),
}

/// Feed of everything the UI needs to render or surface to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SessionEvent {
    PhaseChanged(SessionPhase),
    TranslationPhaseChanged(TranslationPhase),
    /// Non-fatal capture failure; the session stays up
    DeviceEnableFailed { device: DeviceKind, reason: String },
    /// User-facing failure message
    Alert(String),
    /// The session is over; the UI should navigate away
    Ended(EndReason),
}
