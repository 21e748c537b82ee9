use std::future::Future;
use tokio::sync::{broadcast, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::transport::{DisconnectReason, RoomEvent};

/// Observer for a session's disconnect event.
///
/// Created before the connect attempt so no event is missed, and consumed by
/// `cancel`, so it can only be detached once.
pub(crate) struct DisconnectSubscription {
    stop_tx: oneshot::Sender<()>,
    _task: JoinHandle<()>,
}

impl DisconnectSubscription {
    pub(crate) fn spawn<F, Fut>(mut events: broadcast::Receiver<RoomEvent>, on_disconnect: F) -> Self
    where
        F: FnOnce(DisconnectReason) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();
        let mut on_disconnect = Some(on_disconnect);

        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;

                    _ = &mut stop_rx => {
                        debug!("Disconnect observer detached");
                        return;
                    }
                    event = events.recv() => match event {
                        Ok(RoomEvent::Disconnected { reason }) => {
                            if let Some(handler) = on_disconnect.take() {
                                handler(reason).await;
                            }
                            return;
                        }
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            warn!("Disconnect observer lagged by {} events", skipped);
                        }
                        Err(broadcast::error::RecvError::Closed) => {
                            debug!("Session event stream closed");
                            return;
                        }
                    }
                }
            }
        });

        Self {
            stop_tx,
            _task: task,
        }
    }

    /// Detach the observer; the task exits at its next poll
    pub(crate) fn cancel(self) {
        let _ = self.stop_tx.send(());
    }
}
