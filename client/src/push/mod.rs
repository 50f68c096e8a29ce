//! Push update listener
//!
//! Holds one Socket.IO subscription to the backend and turns server-pushed
//! events into toasts. The listener never touches cached bill lists; views
//! only refresh through the update notifier.
//!
//! Transport failures are reported once and the listener stops. There is no
//! reconnection loop.

pub mod packet;

use crate::error::{AppError, Result};
use crate::services::{SharedToasts, Toast};
use futures_util::{SinkExt, StreamExt};
use packet::{Packet, SocketPacket};
use serde_json::Value;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

/// Event emitted by the backend whenever a bill changes
pub const BILL_UPDATED_EVENT: &str = "bill-updated";

const DISCONNECTED_MESSAGE: &str = "Realtime updates disconnected";

/// Socket.IO websocket endpoint for a push base URL
pub fn socket_url(push_url: &str) -> String {
    format!(
        "{}/socket.io/?EIO=4&transport=websocket",
        push_url.trim_end_matches('/')
    )
}

/// What the connection loop should do after a frame
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Continue,
    Reply(String),
    Closed,
}

/// Protocol state of one push connection
pub struct PushSession {
    toasts: SharedToasts,
    connected: bool,
}

impl PushSession {
    pub fn new(toasts: SharedToasts) -> Self {
        Self {
            toasts,
            connected: false,
        }
    }

    /// Whether the namespace connect has been acknowledged
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Handle one text frame from the server.
    ///
    /// Frames that fail to decode are skipped; only a refused namespace
    /// connect ends the session.
    pub fn handle_frame(&mut self, frame: &str) -> Result<Step> {
        let packet = match packet::decode(frame) {
            Ok(packet) => packet,
            Err(e) => {
                tracing::warn!("Skipping undecodable push frame: {}", e);
                return Ok(Step::Continue);
            }
        };

        match packet {
            Packet::Open(handshake) => {
                tracing::debug!("Push handshake complete: {}", handshake.sid);
                Ok(Step::Reply(packet::connect_namespace()))
            }
            Packet::Ping(payload) => Ok(Step::Reply(packet::pong(&payload))),
            Packet::Close => Ok(Step::Closed),
            Packet::Pong(_) | Packet::Upgrade | Packet::Noop => Ok(Step::Continue),
            Packet::Message(message) => self.handle_message(message),
        }
    }

    fn handle_message(&mut self, message: SocketPacket) -> Result<Step> {
        match message {
            SocketPacket::Connect(_) => {
                tracing::info!("Realtime updates connected");
                self.connected = true;
                Ok(Step::Continue)
            }
            SocketPacket::Disconnect => Ok(Step::Closed),
            SocketPacket::ConnectError(reason) => Err(AppError::Push(reason)),
            SocketPacket::Event { name, payload } if name == BILL_UPDATED_EVENT => {
                let bill_name = payload
                    .get("name")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown bill");
                tracing::info!("Received {} for {}", BILL_UPDATED_EVENT, bill_name);
                self.toasts
                    .show(Toast::info(format!("Bill updated: {}", bill_name)));
                Ok(Step::Continue)
            }
            SocketPacket::Event { name, .. } => {
                tracing::debug!("Ignoring push event {}", name);
                Ok(Step::Continue)
            }
            SocketPacket::Other(kind) => {
                tracing::trace!("Ignoring socket packet type {}", kind);
                Ok(Step::Continue)
            }
        }
    }
}

/// Connects the push channel
pub struct PushListener {
    url: String,
    toasts: SharedToasts,
}

impl PushListener {
    pub fn new(push_url: &str, toasts: SharedToasts) -> Self {
        Self {
            url: socket_url(push_url),
            toasts,
        }
    }

    /// Start listening in a background task.
    ///
    /// Connection failures are reported as an error toast from inside the
    /// task; the returned subscription is valid either way.
    pub fn start(self) -> PushSubscription {
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let task = tokio::spawn(run(self.url, self.toasts, shutdown_rx));

        PushSubscription {
            task: Some(task),
            shutdown: Some(shutdown_tx),
        }
    }
}

/// Live push subscription; released on drop
pub struct PushSubscription {
    task: Option<JoinHandle<()>>,
    shutdown: Option<oneshot::Sender<()>>,
}

impl PushSubscription {
    /// Whether the listener task has ended
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, |task| task.is_finished())
    }

    /// Close the connection politely and wait for the listener to stop
    pub async fn disconnect(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::warn!("Push listener task failed: {}", e);
            }
        }
        tracing::info!("Push subscription released");
    }
}

impl Drop for PushSubscription {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

fn report_failure(toasts: &SharedToasts, error: &AppError) {
    tracing::error!("Socket connection error: {}", error);
    toasts.show(Toast::error(DISCONNECTED_MESSAGE));
}

async fn run(url: String, toasts: SharedToasts, mut shutdown: oneshot::Receiver<()>) {
    tracing::info!("Connecting push channel: {}", url);

    let stream = match connect_async(url.as_str()).await {
        Ok((stream, _response)) => stream,
        Err(e) => {
            report_failure(&toasts, &e.into());
            return;
        }
    };

    let (mut sink, mut stream) = stream.split();
    let mut session = PushSession::new(toasts.clone());

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                if session.is_connected() {
                    let _ = sink.send(Message::Text(packet::disconnect_namespace())).await;
                }
                let _ = sink.close().await;
                break;
            }
            frame = stream.next() => match frame {
                Some(Ok(Message::Text(text))) => match session.handle_frame(&text) {
                    Ok(Step::Continue) => {}
                    Ok(Step::Reply(reply)) => {
                        if let Err(e) = sink.send(Message::Text(reply)).await {
                            report_failure(&toasts, &e.into());
                            break;
                        }
                    }
                    Ok(Step::Closed) => {
                        tracing::info!("Push channel closed by server");
                        report_failure(&toasts, &AppError::Push("closed by server".to_string()));
                        break;
                    }
                    Err(e) => {
                        report_failure(&toasts, &e);
                        break;
                    }
                },
                Some(Ok(Message::Close(_))) | None => {
                    report_failure(&toasts, &AppError::Push("connection closed".to_string()));
                    break;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    report_failure(&toasts, &e.into());
                    break;
                }
            }
        }
    }
}
