pub mod client;
pub mod messages;

pub use client::{HttpNotificationGateway, NotificationGateway};
pub use messages::{ErrorResponse, NotifyAck, NotifyAction, NotifyRequest};
