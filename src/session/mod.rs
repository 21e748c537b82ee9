//! Session lifecycle management
//!
//! This module provides the `SessionController` that manages:
//! - Credential fetch and transport connect for one room
//! - Camera/microphone enablement after connect
//! - Teardown on leave or remote disconnect, exactly once
//! - The translation coordinator layered on top of the connection

mod config;
mod controller;
mod phase;
mod subscription;

pub use config::{ConnectOptions, QualityOptions, RoomOptions, VideoCodec, VideoPreset};
pub use controller::{ControllerOptions, Services, SessionController};
pub use phase::{EndReason, SessionEvent, SessionPhase};
