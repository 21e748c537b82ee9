//! Real-time session abstraction
//!
//! The media engine (track encoding, signaling, jitter buffering) is consumed
//! as a black box behind `RoomSession`. `Transport` creates session objects;
//! the controller owns exactly one at a time.

mod loopback;

use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::error::TransportError;
use crate::session::{ConnectOptions, RoomOptions};

pub use loopback::{LoopbackSession, LoopbackTransport};

/// Local capture device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DeviceKind {
    Camera,
    Microphone,
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceKind::Camera => f.write_str("camera"),
            DeviceKind::Microphone => f.write_str("microphone"),
        }
    }
}

/// Why the session reported a disconnect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DisconnectReason {
    ClientInitiated,
    ParticipantRemoved,
    RoomDeleted,
    ServerShutdown,
    ConnectionLost,
}

/// Session-level events observed by the controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomEvent {
    Disconnected { reason: DisconnectReason },
}

/// One live real-time session
#[async_trait]
pub trait RoomSession: Send + Sync {
    /// Register an observer. Events sent after this call are never missed.
    fn subscribe(&self) -> broadcast::Receiver<RoomEvent>;

    async fn connect(
        &self,
        server_url: &str,
        token: &str,
        options: &ConnectOptions,
    ) -> Result<(), TransportError>;

    async fn set_camera_enabled(&self, enabled: bool) -> Result<(), TransportError>;

    async fn set_microphone_enabled(&self, enabled: bool) -> Result<(), TransportError>;

    /// Identity the server assigned to the local participant, once connected
    fn local_identity(&self) -> Option<String>;

    /// Close the session. Must be safe to call more than once.
    async fn disconnect(&self);

    /// Implementation name for logging
    fn name(&self) -> &str;
}

/// Session factory
pub trait Transport: Send + Sync {
    fn create_session(&self, options: RoomOptions) -> Arc<dyn RoomSession>;
}
