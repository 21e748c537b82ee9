use async_trait::async_trait;
use reqwest::Url;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, OnceLock};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use super::{DeviceKind, DisconnectReason, RoomEvent, RoomSession, Transport};
use crate::credentials::peek_claims;
use crate::error::TransportError;
use crate::session::{ConnectOptions, RoomOptions};

/// In-process transport with no media engine behind it.
///
/// Validates the credential the way a server would see it (URL scheme, token
/// shape, join grant) and tracks device state, so the full lifecycle can run
/// without a media server.
#[derive(Default)]
pub struct LoopbackTransport {
    latest: Mutex<Option<Arc<LoopbackSession>>>,
}

impl LoopbackTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recently created session
    pub fn latest_session(&self) -> Option<Arc<LoopbackSession>> {
        self.latest.lock().ok().and_then(|latest| latest.clone())
    }
}

impl Transport for LoopbackTransport {
    fn create_session(&self, options: RoomOptions) -> Arc<dyn RoomSession> {
        let session = Arc::new(LoopbackSession::new(options));
        if let Ok(mut latest) = self.latest.lock() {
            *latest = Some(Arc::clone(&session));
        }
        session
    }
}

pub struct LoopbackSession {
    options: RoomOptions,
    events: broadcast::Sender<RoomEvent>,
    identity: OnceLock<String>,
    connected: AtomicBool,
    camera: AtomicBool,
    microphone: AtomicBool,
}

impl LoopbackSession {
    pub fn new(options: RoomOptions) -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            options,
            events,
            identity: OnceLock::new(),
            connected: AtomicBool::new(false),
            camera: AtomicBool::new(false),
            microphone: AtomicBool::new(false),
        }
    }

    pub fn options(&self) -> &RoomOptions {
        &self.options
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    pub fn is_camera_enabled(&self) -> bool {
        self.camera.load(Ordering::SeqCst)
    }

    pub fn is_microphone_enabled(&self) -> bool {
        self.microphone.load(Ordering::SeqCst)
    }

    /// Drop the connection as if the server had closed it
    pub fn simulate_remote_disconnect(&self, reason: DisconnectReason) {
        if self.connected.swap(false, Ordering::SeqCst) {
            info!("Loopback session closed remotely: {:?}", reason);
            let _ = self.events.send(RoomEvent::Disconnected { reason });
        }
    }

    fn set_device(&self, device: DeviceKind, enabled: bool) -> Result<(), TransportError> {
        if !self.is_connected() {
            return Err(TransportError::NotConnected);
        }

        let flag = match device {
            DeviceKind::Camera => &self.camera,
            DeviceKind::Microphone => &self.microphone,
        };
        flag.store(enabled, Ordering::SeqCst);
        debug!("Loopback {} enabled={}", device, enabled);

        Ok(())
    }
}

#[async_trait]
impl RoomSession for LoopbackSession {
    fn subscribe(&self) -> broadcast::Receiver<RoomEvent> {
        self.events.subscribe()
    }

    async fn connect(
        &self,
        server_url: &str,
        token: &str,
        options: &ConnectOptions,
    ) -> Result<(), TransportError> {
        let url = Url::parse(server_url)
            .map_err(|e| TransportError::ConnectFailed(format!("{}: {}", server_url, e)))?;
        if !matches!(url.scheme(), "ws" | "wss") {
            return Err(TransportError::ConnectFailed(format!(
                "Unsupported scheme: {}",
                url.scheme()
            )));
        }

        let claims =
            peek_claims(token).map_err(|e| TransportError::InvalidCredential(e.to_string()))?;
        if !claims.video.room_join {
            return Err(TransportError::InvalidCredential(
                "Token does not grant room join".to_string(),
            ));
        }

        if self.identity.set(claims.sub.clone()).is_err() {
            warn!("Loopback session reconnected; keeping original identity");
        }
        self.connected.store(true, Ordering::SeqCst);

        let (width, height) = self.options.capture_resolution.resolution();
        info!(
            "Loopback session connected to {} as {} in room {} (auto_subscribe={}, capture {}x{} {})",
            server_url,
            claims.sub,
            claims.video.room,
            options.auto_subscribe,
            width,
            height,
            self.options.video_codec
        );

        Ok(())
    }

    async fn set_camera_enabled(&self, enabled: bool) -> Result<(), TransportError> {
        self.set_device(DeviceKind::Camera, enabled)
    }

    async fn set_microphone_enabled(&self, enabled: bool) -> Result<(), TransportError> {
        self.set_device(DeviceKind::Microphone, enabled)
    }

    fn local_identity(&self) -> Option<String> {
        self.identity.get().cloned()
    }

    async fn disconnect(&self) {
        if self.connected.swap(false, Ordering::SeqCst) {
            self.camera.store(false, Ordering::SeqCst);
            self.microphone.store(false, Ordering::SeqCst);
            info!("Loopback session disconnected");
            let _ = self.events.send(RoomEvent::Disconnected {
                reason: DisconnectReason::ClientInitiated,
            });
        }
    }

    fn name(&self) -> &str {
        "loopback"
    }
}
