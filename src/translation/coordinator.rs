use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::policy::AuthorizationPolicy;
use crate::error::TranslationError;
use crate::notify::{NotificationGateway, NotifyRequest};
use crate::prejoin::TranslationSettings;
use crate::session::SessionEvent;

/// Phase of the translation feature.
///
/// Anything other than `Inactive` implies the session is connected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TranslationPhase {
    Inactive,
    Starting,
    Active,
    Stopping,
}

impl fmt::Display for TranslationPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TranslationPhase::Inactive => "inactive",
            TranslationPhase::Starting => "starting",
            TranslationPhase::Active => "active",
            TranslationPhase::Stopping => "stopping",
        };
        f.write_str(name)
    }
}

/// The connected participant translation is bound to
#[derive(Debug, Clone)]
struct Attachment {
    identity: String,
    settings: TranslationSettings,
    authorized: bool,
}

#[derive(Debug)]
struct CoordinatorState {
    phase: TranslationPhase,
    attachment: Option<Attachment>,
    /// Bumped on every detach; responses carrying an older epoch are stale
    epoch: u64,
    /// Detached stop requests that may still be on the wire
    pending_stops: Vec<JoinHandle<()>>,
}

struct Shared {
    gateway: Arc<dyn NotificationGateway>,
    policy: Arc<dyn AuthorizationPolicy>,
    stop_timeout: Duration,
    events: broadcast::Sender<SessionEvent>,
    phase_tx: watch::Sender<TranslationPhase>,
    state: Mutex<CoordinatorState>,
}

/// Starts and stops the external translation feature for the connected
/// participant, with at most one request outstanding at a time.
///
/// The session controller attaches the coordinator on connect and detaches it
/// on teardown; detaching while translation is live fires a forced stop that
/// nobody waits on.
#[derive(Clone)]
pub struct TranslationCoordinator {
    shared: Arc<Shared>,
}

impl TranslationCoordinator {
    pub fn new(
        gateway: Arc<dyn NotificationGateway>,
        policy: Arc<dyn AuthorizationPolicy>,
        stop_timeout: Duration,
        events: broadcast::Sender<SessionEvent>,
    ) -> Self {
        let (phase_tx, _) = watch::channel(TranslationPhase::Inactive);

        Self {
            shared: Arc::new(Shared {
                gateway,
                policy,
                stop_timeout,
                events,
                phase_tx,
                state: Mutex::new(CoordinatorState {
                    phase: TranslationPhase::Inactive,
                    attachment: None,
                    epoch: 0,
                    pending_stops: Vec::new(),
                }),
            }),
        }
    }

    pub fn phase(&self) -> TranslationPhase {
        *self.shared.phase_tx.borrow()
    }

    pub fn phase_watch(&self) -> watch::Receiver<TranslationPhase> {
        self.shared.phase_tx.subscribe()
    }

    /// Whether the toggle should be enabled right now
    pub async fn controls_enabled(&self) -> bool {
        let state = self.shared.state.lock().await;
        let authorized = state.attachment.as_ref().is_some_and(|a| a.authorized);
        authorized
            && matches!(
                state.phase,
                TranslationPhase::Inactive | TranslationPhase::Active
            )
    }

    /// Bind to a freshly connected participant; authorization is evaluated once here
    pub(crate) async fn attach(&self, identity: &str, settings: TranslationSettings) {
        let authorized = self.shared.policy.is_authorized(identity);
        info!(
            "Translation {} for {}",
            if authorized { "available" } else { "unavailable" },
            identity
        );

        let mut state = self.shared.state.lock().await;
        state.attachment = Some(Attachment {
            identity: identity.to_string(),
            settings,
            authorized,
        });
    }

    /// Unbind on session teardown, forcing translation off if it is live.
    ///
    /// Returns once the forced stop has been dispatched, without waiting for
    /// the gateway to answer.
    pub(crate) async fn detach(&self) {
        let mut state = self.shared.state.lock().await;
        let attachment = state.attachment.take();
        state.epoch += 1;

        match state.phase {
            TranslationPhase::Inactive => {}
            TranslationPhase::Stopping => {
                // A stop is already on the wire
                self.set_phase(&mut state, TranslationPhase::Inactive);
            }
            TranslationPhase::Starting | TranslationPhase::Active => {
                self.set_phase(&mut state, TranslationPhase::Stopping);
                if let Some(attachment) = attachment {
                    self.spawn_stop(&mut state, attachment.identity, "Forced");
                }
                self.set_phase(&mut state, TranslationPhase::Inactive);
            }
        }
    }

    pub async fn start(&self) -> Result<(), TranslationError> {
        let (request, epoch) = {
            let mut state = self.shared.state.lock().await;
            let attachment = state
                .attachment
                .clone()
                .ok_or(TranslationError::NotConnected)?;

            if !attachment.authorized {
                warn!("Refusing translation start for {}", attachment.identity);
                return Err(TranslationError::NotAuthorized(attachment.identity));
            }

            match state.phase {
                TranslationPhase::Inactive => {}
                TranslationPhase::Active => return Err(TranslationError::AlreadyActive),
                TranslationPhase::Starting | TranslationPhase::Stopping => {
                    return Err(TranslationError::RequestInFlight)
                }
            }

            self.set_phase(&mut state, TranslationPhase::Starting);
            (
                NotifyRequest::start(&attachment.identity, attachment.settings),
                state.epoch,
            )
        };

        info!(
            "Starting translation for {} ({} -> {})",
            request.username,
            request.settings.map(|s| s.input_lang.to_string()).unwrap_or_default(),
            request.settings.map(|s| s.output_lang.to_string()).unwrap_or_default()
        );

        let result = self.shared.gateway.notify(&request).await;

        let mut state = self.shared.state.lock().await;
        if state.epoch != epoch {
            // The session ended mid-start and a forced stop already went out. A
            // late success would leave the backend translating, so stop again.
            if result.is_ok() {
                self.spawn_stop(&mut state, request.username, "Compensating");
            }
            debug!("Discarding translation start response after teardown");
            return Err(TranslationError::NotConnected);
        }

        match result {
            Ok(_) => {
                self.set_phase(&mut state, TranslationPhase::Active);
                info!("Translation active for {}", request.username);
                Ok(())
            }
            Err(e) => {
                self.set_phase(&mut state, TranslationPhase::Inactive);
                error!("Failed to start translation: {}", e);
                self.alert(format!("Failed to start translation: {}", e));
                Err(TranslationError::RequestFailed(e))
            }
        }
    }

    /// Best-effort stop; always ends `Inactive` and never reports gateway failures
    pub async fn stop(&self) -> Result<(), TranslationError> {
        let (request, epoch) = {
            let mut state = self.shared.state.lock().await;
            if state.phase != TranslationPhase::Active {
                debug!("Translation stop ignored while {}", state.phase);
                return Ok(());
            }
            let Some(identity) = state.attachment.as_ref().map(|a| a.identity.clone()) else {
                return Ok(());
            };

            self.set_phase(&mut state, TranslationPhase::Stopping);
            (NotifyRequest::stop(&identity), state.epoch)
        };

        info!("Stopping translation for {}", request.username);

        match tokio::time::timeout(self.shared.stop_timeout, self.shared.gateway.notify(&request))
            .await
        {
            Ok(Ok(_)) => info!("Translation stopped for {}", request.username),
            Ok(Err(e)) => warn!("Translation stop for {} failed: {}", request.username, e),
            Err(_) => warn!(
                "Translation stop for {} timed out after {:?}",
                request.username, self.shared.stop_timeout
            ),
        }

        let mut state = self.shared.state.lock().await;
        if state.epoch == epoch && state.phase == TranslationPhase::Stopping {
            self.set_phase(&mut state, TranslationPhase::Inactive);
        }

        Ok(())
    }

    /// Start when inactive, stop when active; rejected while a request is in flight
    pub async fn toggle(&self) -> Result<TranslationPhase, TranslationError> {
        match self.phase() {
            TranslationPhase::Inactive => self.start().await?,
            TranslationPhase::Active => self.stop().await?,
            TranslationPhase::Starting | TranslationPhase::Stopping => {
                debug!("Translation toggle rejected while {}", self.phase());
                return Err(TranslationError::RequestInFlight);
            }
        }

        Ok(self.phase())
    }

    /// Wait for detached stop requests to finish.
    ///
    /// Each one is bounded by the stop timeout. Call before shutting the
    /// runtime down so a forced stop is not dropped mid-flight.
    pub async fn drain_stops(&self) {
        let pending = std::mem::take(&mut self.shared.state.lock().await.pending_stops);
        if pending.is_empty() {
            return;
        }

        debug!("Waiting for {} detached translation stop(s)", pending.len());
        for handle in pending {
            if let Err(e) = handle.await {
                warn!("Detached translation stop task failed: {}", e);
            }
        }
    }

    fn spawn_stop(&self, state: &mut CoordinatorState, username: String, kind: &'static str) {
        let gateway = Arc::clone(&self.shared.gateway);
        let stop_timeout = self.shared.stop_timeout;
        info!("{} translation stop for {}", kind, username);

        state.pending_stops.retain(|handle| !handle.is_finished());
        let handle = tokio::spawn(async move {
            let request = NotifyRequest::stop(&username);
            match tokio::time::timeout(stop_timeout, gateway.notify(&request)).await {
                Ok(Ok(_)) => debug!("{} translation stop acknowledged for {}", kind, username),
                Ok(Err(e)) => warn!("{} translation stop for {} failed: {}", kind, username, e),
                Err(_) => warn!("{} translation stop for {} timed out", kind, username),
            }
        });
        state.pending_stops.push(handle);
    }

    fn set_phase(&self, state: &mut CoordinatorState, phase: TranslationPhase) {
        if state.phase == phase {
            return;
        }
        debug!("Translation phase {} -> {}", state.phase, phase);
        state.phase = phase;
        self.shared.phase_tx.send_replace(phase);
        let _ = self.shared.events.send(SessionEvent::TranslationPhaseChanged(phase));
    }

    fn alert(&self, message: String) {
        let _ = self.shared.events.send(SessionEvent::Alert(message));
    }
}
