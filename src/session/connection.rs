//! Individual client session handling

use super::ConnectionInfo;
use crate::command::CommandDispatcher;
use futures::{SinkExt, StreamExt};
use rover_protocol::{
    codec,
    state_machine::{CloseReason, ConnectionLifecycle},
    Acknowledgment,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::WebSocketStream;
use tracing::{debug, error};

/// Active client session
///
/// Frames are handled one at a time: the next frame is not read until the
/// acknowledgment for the current one has been written.
pub struct Session<S> {
    info: ConnectionInfo,
    ws: WebSocketStream<S>,
    dispatcher: Arc<CommandDispatcher>,
    idle_timeout: Option<Duration>,
    lifecycle: ConnectionLifecycle,
}

impl<S> Session<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Create a session over an accepted WebSocket stream
    pub fn new(
        info: ConnectionInfo,
        ws: WebSocketStream<S>,
        dispatcher: Arc<CommandDispatcher>,
        idle_timeout: Option<Duration>,
    ) -> Self {
        Self {
            info,
            ws,
            dispatcher,
            idle_timeout,
            lifecycle: ConnectionLifecycle::new(),
        }
    }

    /// Run the receive, dispatch, acknowledge loop until the connection closes
    pub async fn run(mut self) -> CloseReason {
        let conn_id = self.info.id;

        while self.lifecycle.is_open() {
            let frame = match self.recv().await {
                Ok(Some(frame)) => frame,
                Ok(None) => {
                    self.finish(CloseReason::StreamEnded);
                    continue;
                }
                Err(reason) => {
                    self.finish(reason);
                    continue;
                }
            };

            let ack = match frame {
                Message::Text(text) => self.dispatcher.handle_text(conn_id, text.as_str()).await,
                Message::Binary(bytes) => self.dispatcher.handle_binary(conn_id, &bytes).await,
                Message::Close(_) => {
                    self.finish(CloseReason::ClientClosed);
                    continue;
                }
                // Pings are answered by the WebSocket layer
                Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => continue,
            };

            if let Some(ack) = ack {
                if let Err(reason) = self.send_ack(&ack).await {
                    self.finish(reason);
                }
            }
        }

        // Flushes the close handshake; the peer may already be gone
        if let Err(e) = self.ws.close(None).await {
            debug!(conn_id, error = %e, "Close handshake not completed");
        }

        self.lifecycle
            .close_reason()
            .cloned()
            .unwrap_or(CloseReason::StreamEnded)
    }

    /// Record the `Open -> Closed` transition
    fn finish(&mut self, reason: CloseReason) {
        if let Err(e) = self.lifecycle.close(reason) {
            debug!(conn_id = self.info.id, error = %e, "Session closed twice");
        }
    }

    /// Read the next frame
    ///
    /// `Ok(None)` means the stream ended cleanly.
    async fn recv(&mut self) -> Result<Option<Message>, CloseReason> {
        let next = match self.idle_timeout {
            Some(limit) => timeout(limit, self.ws.next())
                .await
                .map_err(|_| CloseReason::IdleTimeout)?,
            None => self.ws.next().await,
        };

        match next {
            Some(Ok(frame)) => Ok(Some(frame)),
            Some(Err(WsError::ConnectionClosed)) | None => Ok(None),
            Some(Err(e)) => Err(CloseReason::ReadError(e.to_string())),
        }
    }

    /// Write an acknowledgment frame
    async fn send_ack(&mut self, ack: &Acknowledgment) -> Result<(), CloseReason> {
        let text = match codec::encode(ack) {
            Ok(text) => text,
            Err(e) => {
                error!(conn_id = self.info.id, error = %e, "Failed to encode ACK");
                return Ok(());
            }
        };

        self.ws
            .send(Message::text(text))
            .await
            .map_err(|e| CloseReason::WriteError(e.to_string()))
    }
}
