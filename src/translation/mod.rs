//! Translation coordinator
//!
//! A small state machine layered on the session controller. It talks to the
//! translation backend through the notification gateway and is gated by
//! session state and an injectable authorization policy.

mod coordinator;
mod policy;

pub use coordinator::{TranslationCoordinator, TranslationPhase};
pub use policy::{AllowList, AuthorizationPolicy};
