pub mod config;
pub mod credentials;
pub mod error;
pub mod http;
pub mod notify;
pub mod prejoin;
pub mod session;
pub mod translation;
pub mod transport;

pub use config::Config;
pub use credentials::{ConnectionDetails, CredentialProvider, HttpCredentialClient, TokenIssuer};
pub use error::{
    CredentialError, NotifyError, PreJoinError, SessionError, TranslationError, TransportError,
};
pub use http::{create_router, AppState};
pub use notify::{HttpNotificationGateway, NotificationGateway, NotifyRequest};
pub use prejoin::{generate_room_id, JoinRequest, PreJoinForm, TranslationSettings, UserChoices};
pub use session::{
    ControllerOptions, EndReason, QualityOptions, Services, SessionController, SessionEvent,
    SessionPhase,
};
pub use translation::{AllowList, AuthorizationPolicy, TranslationCoordinator, TranslationPhase};
pub use transport::{LoopbackTransport, RoomSession, Transport};
