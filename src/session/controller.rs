use anyhow::{Context, Result};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::{broadcast, watch, Mutex};
use tracing::{debug, error, info, warn};

use super::config::{ConnectOptions, QualityOptions, RoomOptions};
use super::phase::{EndReason, SessionEvent, SessionPhase};
use super::subscription::DisconnectSubscription;
use crate::config::Config;
use crate::credentials::{
    ConnectionDetails, CredentialProvider, CredentialRequest, HttpCredentialClient,
};
use crate::error::{CredentialError, SessionError};
use crate::notify::{HttpNotificationGateway, NotificationGateway};
use crate::prejoin::{TranslationSettings, UserChoices};
use crate::translation::{AllowList, AuthorizationPolicy, TranslationCoordinator};
use crate::transport::{DeviceKind, RoomSession, Transport};

/// Capacity of the session event feed
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// External collaborators of the controller
pub struct Services {
    pub credentials: Arc<dyn CredentialProvider>,
    pub transport: Arc<dyn Transport>,
    pub gateway: Arc<dyn NotificationGateway>,
    pub policy: Arc<dyn AuthorizationPolicy>,
}

impl Services {
    /// HTTP clients and allow-list from configuration
    pub fn from_config(config: &Config, transport: Arc<dyn Transport>) -> Result<Self> {
        let request_timeout = Duration::from_millis(config.gateway.request_timeout_ms);

        let credentials = HttpCredentialClient::new(&config.credentials.endpoint, request_timeout)
            .context("Failed to build credential client")?;
        let gateway = HttpNotificationGateway::new(&config.gateway.endpoint, request_timeout)
            .context("Failed to build notification gateway client")?;
        let policy = AllowList::new(config.translation.allowed_identities.iter().cloned());

        Ok(Self {
            credentials: Arc::new(credentials),
            transport,
            gateway: Arc::new(gateway),
            policy: Arc::new(policy),
        })
    }
}

/// Tunables for the controller and its translation coordinator
#[derive(Debug, Clone)]
pub struct ControllerOptions {
    pub quality: QualityOptions,
    /// Upper bound on how long a translation stop may keep the toggle disabled
    pub stop_timeout: Duration,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            quality: QualityOptions::default(),
            stop_timeout: Duration::from_secs(5),
        }
    }
}

impl ControllerOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            quality: config.room.quality(),
            stop_timeout: Duration::from_millis(config.gateway.stop_timeout_ms),
        }
    }
}

/// The session object plus its disconnect observer
struct ActiveSession {
    session: Arc<dyn RoomSession>,
    subscription: DisconnectSubscription,
}

impl ActiveSession {
    /// Detach the observer, then close the session
    async fn release(self) {
        self.subscription.cancel();
        self.session.disconnect().await;
        debug!("Released {} session", self.session.name());
    }
}

struct ControllerState {
    phase: SessionPhase,
    /// Bumped whenever an attempt ends; continuations holding an older value are stale
    generation: u64,
    choices: Option<UserChoices>,
    active: Option<ActiveSession>,
}

struct Shared {
    credentials: Arc<dyn CredentialProvider>,
    transport: Arc<dyn Transport>,
    quality: QualityOptions,
    translation: TranslationCoordinator,
    events: broadcast::Sender<SessionEvent>,
    phase_tx: watch::Sender<SessionPhase>,
    state: Mutex<ControllerState>,
}

/// Session lifecycle controller.
///
/// Turns pre-join choices into a connected session, keeps device and
/// connection state in sync, and tears everything down exactly once whether
/// the user leaves or the server drops the connection. Owns at most one
/// session object at a time.
#[derive(Clone)]
pub struct SessionController {
    shared: Arc<Shared>,
}

impl SessionController {
    pub fn new(services: Services, options: ControllerOptions) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let (phase_tx, _) = watch::channel(SessionPhase::Idle);

        let translation = TranslationCoordinator::new(
            services.gateway,
            services.policy,
            options.stop_timeout,
            events.clone(),
        );

        Self {
            shared: Arc::new(Shared {
                credentials: services.credentials,
                transport: services.transport,
                quality: options.quality,
                translation,
                events,
                phase_tx,
                state: Mutex::new(ControllerState {
                    phase: SessionPhase::Idle,
                    generation: 0,
                    choices: None,
                    active: None,
                }),
            }),
        }
    }

    pub fn phase(&self) -> SessionPhase {
        *self.shared.phase_tx.borrow()
    }

    pub fn phase_watch(&self) -> watch::Receiver<SessionPhase> {
        self.shared.phase_tx.subscribe()
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<SessionEvent> {
        self.shared.events.subscribe()
    }

    pub fn translation(&self) -> &TranslationCoordinator {
        &self.shared.translation
    }

    pub async fn choices(&self) -> Option<UserChoices> {
        self.shared.state.lock().await.choices.clone()
    }

    /// Fetch a credential, connect, then enable the chosen devices.
    ///
    /// Phases advance `Idle -> AwaitingCredential -> Connecting -> Connected`.
    /// Setup and connect failures return to `Idle`; device failures only
    /// produce `DeviceEnableFailed` events.
    pub async fn request_connection(
        &self,
        choices: UserChoices,
        settings: TranslationSettings,
        room_id: &str,
        region: Option<&str>,
    ) -> Result<(), SessionError> {
        let generation = {
            let mut state = self.shared.state.lock().await;
            if state.phase != SessionPhase::Idle {
                return Err(SessionError::InvalidPhase(state.phase));
            }

            state.choices = Some(choices.clone());
            self.set_phase(&mut state, SessionPhase::AwaitingCredential);
            state.generation
        };

        info!("Joining room {} as {}", room_id, choices.username());

        let fetched = self.fetch_details(&choices, &settings, room_id, region).await;

        let (details, session) = {
            let mut state = self.shared.state.lock().await;
            if state.generation != generation {
                debug!("Discarding credential response for abandoned attempt");
                return Err(SessionError::Abandoned);
            }

            let details = match fetched {
                Ok(details) => details,
                Err(e) => {
                    error!("Error fetching connection details: {}", e);
                    self.reset_attempt(&mut state);
                    self.alert(format!("Could not get connection details: {}", e));
                    return Err(SessionError::ConnectionSetupFailed(e));
                }
            };

            let options = RoomOptions::for_choices(&choices, &self.shared.quality);
            let session = self.shared.transport.create_session(options);
            let subscription = self.observe_disconnect(session.as_ref(), generation);
            state.active = Some(ActiveSession {
                session: Arc::clone(&session),
                subscription,
            });
            self.set_phase(&mut state, SessionPhase::Connecting);

            (details, session)
        };

        info!(
            "Connecting {} session to {}",
            session.name(),
            details.server_url
        );

        let connected = session
            .connect(
                &details.server_url,
                &details.participant_token,
                &ConnectOptions::default(),
            )
            .await;

        {
            let mut state = self.shared.state.lock().await;
            if state.generation != generation {
                // Teardown already ran; make sure a late connect does not linger
                warn!("Connect completed after leave; closing session");
                drop(state);
                session.disconnect().await;
                return Err(SessionError::Abandoned);
            }

            if let Err(e) = connected {
                error!("Error connecting to room {}: {}", room_id, e);
                let active = state.active.take();
                self.reset_attempt(&mut state);
                self.alert(format!("Error connecting to the room: {}", e));
                if let Some(active) = active {
                    active.release().await;
                }
                return Err(SessionError::ConnectionFailed(e));
            }

            let identity = session
                .local_identity()
                .unwrap_or_else(|| choices.username().to_string());

            self.set_phase(&mut state, SessionPhase::Connected);
            self.shared.translation.attach(&identity, settings).await;
            info!("Connected to room {} as {}", room_id, identity);
        }

        if choices.video_enabled {
            self.enable_device(session.as_ref(), DeviceKind::Camera, generation)
                .await;
        }
        if choices.audio_enabled {
            self.enable_device(session.as_ref(), DeviceKind::Microphone, generation)
                .await;
        }

        Ok(())
    }

    /// Leave the session.
    ///
    /// Forces translation off, detaches the disconnect observer, releases the
    /// session and moves to `Disconnected`. Returns `true` if this call did
    /// the teardown; later calls are no-ops.
    pub async fn leave(&self) -> bool {
        self.teardown(None, EndReason::Left).await
    }

    /// Return to `Idle` after a session has ended so a new one can start
    pub async fn reset(&self) -> bool {
        let mut state = self.shared.state.lock().await;
        if state.phase != SessionPhase::Disconnected {
            return false;
        }
        self.set_phase(&mut state, SessionPhase::Idle);
        true
    }

    async fn fetch_details(
        &self,
        choices: &UserChoices,
        settings: &TranslationSettings,
        room_id: &str,
        region: Option<&str>,
    ) -> Result<ConnectionDetails, CredentialError> {
        let request = CredentialRequest {
            room_name: room_id.to_string(),
            participant_name: choices.username().to_string(),
            metadata: Some(settings.to_metadata()?),
            region: region.map(str::to_string),
        };

        self.shared.credentials.fetch(&request).await
    }

    async fn teardown(&self, expected_generation: Option<u64>, reason: EndReason) -> bool {
        let mut state = self.shared.state.lock().await;

        if expected_generation.is_some_and(|generation| generation != state.generation) {
            debug!("Ignoring disconnect from a previous session");
            return false;
        }
        if !state.phase.is_live() {
            debug!("Nothing to tear down while {}", state.phase);
            return false;
        }

        info!("Tearing down session ({:?}) while {}", reason, state.phase);
        state.generation += 1;

        self.shared.translation.detach().await;

        if let Some(active) = state.active.take() {
            active.release().await;
        }

        state.choices = None;
        self.set_phase(&mut state, SessionPhase::Disconnected);
        drop(state);

        let _ = self.shared.events.send(SessionEvent::Ended(reason));
        true
    }

    fn observe_disconnect(
        &self,
        session: &dyn RoomSession,
        generation: u64,
    ) -> DisconnectSubscription {
        let shared: Weak<Shared> = Arc::downgrade(&self.shared);

        DisconnectSubscription::spawn(session.subscribe(), move |reason| async move {
            if let Some(shared) = shared.upgrade() {
                info!("Session disconnected remotely: {:?}", reason);
                SessionController { shared }
                    .teardown(Some(generation), EndReason::Remote(reason))
                    .await;
            }
        })
    }

    async fn enable_device(&self, session: &dyn RoomSession, device: DeviceKind, generation: u64) {
        {
            let state = self.shared.state.lock().await;
            if state.generation != generation || state.phase != SessionPhase::Connected {
                debug!("Skipping {} enable; session no longer connected", device);
                return;
            }
        }

        let result = match device {
            DeviceKind::Camera => session.set_camera_enabled(true).await,
            DeviceKind::Microphone => session.set_microphone_enabled(true).await,
        };

        match result {
            Ok(()) => info!("Enabled {}", device),
            Err(e) => {
                warn!("Failed to enable {}: {}", device, e);
                let _ = self.shared.events.send(SessionEvent::DeviceEnableFailed {
                    device,
                    reason: e.to_string(),
                });
            }
        }
    }

    /// End a failed attempt and go back to `Idle`
    fn reset_attempt(&self, state: &mut ControllerState) {
        state.generation += 1;
        state.choices = None;
        self.set_phase(state, SessionPhase::Idle);
    }

    fn set_phase(&self, state: &mut ControllerState, phase: SessionPhase) {
        if state.phase == phase {
            return;
        }
        debug!("Session phase {} -> {}", state.phase, phase);
        state.phase = phase;
        self.shared.phase_tx.send_replace(phase);
        let _ = self.shared.events.send(SessionEvent::PhaseChanged(phase));
    }

    fn alert(&self, message: String) {
        let _ = self.shared.events.send(SessionEvent::Alert(message));
    }
}
