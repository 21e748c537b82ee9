//! Pre-join capture
//!
//! Collects the display name, device preferences and translation settings
//! before any session exists, either interactively (`PreJoinForm`) or from a
//! room link (`JoinRequest`).

mod choices;
mod form;
mod join;
mod room_id;

pub use choices::{Language, TranslationSettings, UserChoices, VoiceGender};
pub use form::PreJoinForm;
pub use join::JoinRequest;
pub use room_id::generate_room_id;
