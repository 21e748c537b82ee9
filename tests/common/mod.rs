// Scripted fakes for the controller's collaborators
//
// Each fake records what it was asked to do and can hold its response behind
// a gate, so tests can interleave user actions with in-flight requests.

#![allow(dead_code)]

use async_trait::async_trait;
use knect_meet::credentials::{ConnectionDetails, CredentialProvider, CredentialRequest};
use knect_meet::error::{CredentialError, NotifyError, TransportError};
use knect_meet::notify::{NotificationGateway, NotifyAck, NotifyAction, NotifyRequest};
use knect_meet::session::{ConnectOptions, RoomOptions};
use knect_meet::transport::{DeviceKind, DisconnectReason, RoomEvent, RoomSession, Transport};
use knect_meet::{
    AllowList, ControllerOptions, Services, SessionController, SessionEvent, SessionPhase,
};
use std::future::pending;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{broadcast, Notify};

// ============================================================================
// Gate
// ============================================================================

/// Holds a fake's response until the test opens it
#[derive(Default)]
pub struct Gate {
    closed: AtomicBool,
    notify: Notify,
}

impl Gate {
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    pub fn open(&self) {
        self.closed.store(false, Ordering::SeqCst);
        self.notify.notify_one();
    }

    async fn pass(&self) {
        if self.closed.load(Ordering::SeqCst) {
            self.notify.notified().await;
        }
    }
}

// ============================================================================
// Credential service
// ============================================================================

pub struct FakeCredentials {
    calls: Mutex<Vec<CredentialRequest>>,
    fail_status: Mutex<Option<u16>>,
    pub gate: Gate,
}

impl FakeCredentials {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            fail_status: Mutex::new(None),
            gate: Gate::default(),
        })
    }

    pub fn fail_with(&self, status: u16) {
        *self.fail_status.lock().unwrap() = Some(status);
    }

    pub fn calls(&self) -> Vec<CredentialRequest> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CredentialProvider for FakeCredentials {
    async fn fetch(&self, request: &CredentialRequest) -> Result<ConnectionDetails, CredentialError> {
        self.calls.lock().unwrap().push(request.clone());
        self.gate.pass().await;

        let fail_status = *self.fail_status.lock().unwrap();
        match fail_status {
            Some(status) => Err(CredentialError::RequestFailed {
                status,
                body: r#"{"error":"denied"}"#.to_string(),
            }),
            None => Ok(ConnectionDetails {
                server_url: "wss://media.test".to_string(),
                participant_token: format!("token-for-{}", request.participant_name),
            }),
        }
    }
}

// ============================================================================
// Transport
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct FakeBehavior {
    pub fail_connect: bool,
    pub fail_camera: bool,
    pub fail_microphone: bool,
    /// Identity reported after connect; `None` falls back to the username
    pub identity: Option<String>,
}

#[derive(Default)]
pub struct FakeTransport {
    behavior: Mutex<FakeBehavior>,
    sessions: Mutex<Vec<Arc<FakeSession>>>,
    pub connect_gate: Arc<Gate>,
}

impl FakeTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_behavior(&self, behavior: FakeBehavior) {
        *self.behavior.lock().unwrap() = behavior;
    }

    pub fn sessions(&self) -> Vec<Arc<FakeSession>> {
        self.sessions.lock().unwrap().clone()
    }

    pub fn only_session(&self) -> Arc<FakeSession> {
        let sessions = self.sessions();
        assert_eq!(sessions.len(), 1, "expected exactly one session object");
        Arc::clone(&sessions[0])
    }
}

impl Transport for FakeTransport {
    fn create_session(&self, options: RoomOptions) -> Arc<dyn RoomSession> {
        let (events, _) = broadcast::channel(8);
        let session = Arc::new(FakeSession {
            options,
            behavior: self.behavior.lock().unwrap().clone(),
            gate: Arc::clone(&self.connect_gate),
            events,
            connected: AtomicBool::new(false),
            connect_calls: AtomicUsize::new(0),
            disconnect_calls: AtomicUsize::new(0),
            camera_enabled: AtomicBool::new(false),
            microphone_enabled: AtomicBool::new(false),
            device_order: Mutex::new(Vec::new()),
        });
        self.sessions.lock().unwrap().push(Arc::clone(&session));
        session
    }
}

pub struct FakeSession {
    pub options: RoomOptions,
    behavior: FakeBehavior,
    gate: Arc<Gate>,
    events: broadcast::Sender<RoomEvent>,
    connected: AtomicBool,
    pub connect_calls: AtomicUsize,
    pub disconnect_calls: AtomicUsize,
    pub camera_enabled: AtomicBool,
    pub microphone_enabled: AtomicBool,
    pub device_order: Mutex<Vec<DeviceKind>>,
}

impl FakeSession {
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    pub fn disconnects(&self) -> usize {
        self.disconnect_calls.load(Ordering::SeqCst)
    }

    pub fn camera_on(&self) -> bool {
        self.camera_enabled.load(Ordering::SeqCst)
    }

    pub fn microphone_on(&self) -> bool {
        self.microphone_enabled.load(Ordering::SeqCst)
    }

    /// Live observers of this session's events
    pub fn observer_count(&self) -> usize {
        self.events.receiver_count()
    }

    pub fn remote_disconnect(&self, reason: DisconnectReason) {
        self.connected.store(false, Ordering::SeqCst);
        let _ = self.events.send(RoomEvent::Disconnected { reason });
    }
}

#[async_trait]
impl RoomSession for FakeSession {
    fn subscribe(&self) -> broadcast::Receiver<RoomEvent> {
        self.events.subscribe()
    }

    async fn connect(
        &self,
        _server_url: &str,
        _token: &str,
        _options: &ConnectOptions,
    ) -> Result<(), TransportError> {
        self.connect_calls.fetch_add(1, Ordering::SeqCst);
        self.gate.pass().await;

        if self.behavior.fail_connect {
            return Err(TransportError::ConnectFailed("signal connection refused".to_string()));
        }
        self.connected.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn set_camera_enabled(&self, enabled: bool) -> Result<(), TransportError> {
        self.device_order.lock().unwrap().push(DeviceKind::Camera);
        if self.behavior.fail_camera {
            return Err(TransportError::Device {
                device: DeviceKind::Camera,
                reason: "permission denied".to_string(),
            });
        }
        self.camera_enabled.store(enabled, Ordering::SeqCst);
        Ok(())
    }

    async fn set_microphone_enabled(&self, enabled: bool) -> Result<(), TransportError> {
        self.device_order.lock().unwrap().push(DeviceKind::Microphone);
        if self.behavior.fail_microphone {
            return Err(TransportError::Device {
                device: DeviceKind::Microphone,
                reason: "device busy".to_string(),
            });
        }
        self.microphone_enabled.store(enabled, Ordering::SeqCst);
        Ok(())
    }

    fn local_identity(&self) -> Option<String> {
        self.behavior.identity.clone()
    }

    async fn disconnect(&self) {
        self.disconnect_calls.fetch_add(1, Ordering::SeqCst);
        if self.connected.swap(false, Ordering::SeqCst) {
            let _ = self.events.send(RoomEvent::Disconnected {
                reason: DisconnectReason::ClientInitiated,
            });
        }
    }

    fn name(&self) -> &str {
        "fake"
    }
}

// ============================================================================
// Notification gateway
// ============================================================================

#[derive(Default)]
pub struct FakeGateway {
    requests: Mutex<Vec<NotifyRequest>>,
    pub fail_start: AtomicBool,
    pub fail_stop: AtomicBool,
    pub hang_stop: AtomicBool,
    pub start_gate: Gate,
}

impl FakeGateway {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn requests(&self) -> Vec<NotifyRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn count(&self, action: NotifyAction) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.action == action)
            .count()
    }
}

#[async_trait]
impl NotificationGateway for FakeGateway {
    async fn notify(&self, request: &NotifyRequest) -> Result<NotifyAck, NotifyError> {
        self.requests.lock().unwrap().push(request.clone());

        match request.action {
            NotifyAction::StartTranslation => {
                self.start_gate.pass().await;
                if self.fail_start.load(Ordering::SeqCst) {
                    return Err(NotifyError::Rejected {
                        status: 500,
                        error: "Internal server error".to_string(),
                    });
                }
                Ok(NotifyAck {
                    success: true,
                    message: "Translation started".to_string(),
                })
            }
            NotifyAction::StopTranslation => {
                if self.hang_stop.load(Ordering::SeqCst) {
                    pending::<()>().await;
                }
                if self.fail_stop.load(Ordering::SeqCst) {
                    return Err(NotifyError::Rejected {
                        status: 503,
                        error: "Service unavailable".to_string(),
                    });
                }
                Ok(NotifyAck {
                    success: true,
                    message: "Translation stopped".to_string(),
                })
            }
        }
    }
}

// ============================================================================
// Harness
// ============================================================================

pub struct Harness {
    pub controller: SessionController,
    pub credentials: Arc<FakeCredentials>,
    pub transport: Arc<FakeTransport>,
    pub gateway: Arc<FakeGateway>,
}

pub fn harness(allowed: &[&str]) -> Harness {
    harness_with(allowed, ControllerOptions::default())
}

pub fn harness_with(allowed: &[&str], options: ControllerOptions) -> Harness {
    let credentials = FakeCredentials::new();
    let transport = FakeTransport::new();
    let gateway = FakeGateway::new();

    let services = Services {
        credentials: credentials.clone(),
        transport: transport.clone(),
        gateway: gateway.clone(),
        policy: Arc::new(AllowList::new(allowed.iter().copied())),
    };

    Harness {
        controller: SessionController::new(services, options),
        credentials,
        transport,
        gateway,
    }
}

/// Poll `condition` until it holds, yielding to spawned tasks in between
pub async fn wait_until<F>(mut condition: F)
where
    F: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while !condition() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "condition not reached within 2s"
        );
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

/// Wait for the controller to reach `phase`
pub async fn wait_for_phase(controller: &SessionController, phase: SessionPhase) {
    let mut watch = controller.phase_watch();
    tokio::time::timeout(Duration::from_secs(2), watch.wait_for(|p| *p == phase))
        .await
        .expect("timed out waiting for phase")
        .expect("phase channel closed");
}

/// Everything already sitting in the event feed
pub fn drain(events: &mut broadcast::Receiver<SessionEvent>) -> Vec<SessionEvent> {
    let mut drained = Vec::new();
    while let Ok(event) = events.try_recv() {
        drained.push(event);
    }
    drained
}

pub fn phases(events: &[SessionEvent]) -> Vec<SessionPhase> {
    events
        .iter()
        .filter_map(|event| match event {
            SessionEvent::PhaseChanged(phase) => Some(*phase),
            _ => None,
        })
        .collect()
}

/// Wait for the next `Ended` event
pub async fn wait_for_end(events: &mut broadcast::Receiver<SessionEvent>) -> knect_meet::EndReason {
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            if let SessionEvent::Ended(reason) = events.recv().await.expect("event feed closed") {
                return reason;
            }
        }
    })
    .await
    .expect("timed out waiting for session end")
}
