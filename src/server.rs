//! Listener and per-connection task lifecycle

use crate::command::{Actuator, CommandDispatcher};
use crate::config::ServerConfig;
use crate::session::{ConnectionInfo, ConnectionRegistry, Session};
use anyhow::Result;
use futures::FutureExt;
use rover_protocol::state_machine::CloseReason;
use std::future::Future;
use std::net::SocketAddr;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinSet;
use tracing::{error, info, warn};

/// Pause after a failed accept so persistent errors (e.g. EMFILE) do not spin
pub const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// WebSocket command server
pub struct CommandServer {
    listener: TcpListener,
    registry: Arc<ConnectionRegistry>,
    dispatcher: Arc<CommandDispatcher>,
    idle_timeout: Option<Duration>,
}

impl CommandServer {
    /// Bind the listener described by `config`
    pub async fn bind(config: ServerConfig, actuator: Arc<dyn Actuator>) -> Result<Self> {
        let listener = TcpListener::bind(config.bind_addr).await?;
        let dispatcher = CommandDispatcher::new(actuator).with_strict_acks(config.strict_acks);

        Ok(Self {
            listener,
            registry: Arc::new(ConnectionRegistry::new()),
            dispatcher: Arc::new(dispatcher),
            idle_timeout: config.idle_timeout,
        })
    }

    /// Address the listener is bound to
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Registry of open connections
    pub fn registry(&self) -> Arc<ConnectionRegistry> {
        self.registry.clone()
    }

    /// Accept connections until `shutdown` resolves
    ///
    /// Open sessions are aborted and the registry is cleared on the way out.
    pub async fn run_until<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let mut sessions = JoinSet::new();
        tokio::pin!(shutdown);

        info!("Waiting for connections on {}", self.local_addr()?);

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        sessions.spawn(serve_connection(
                            stream,
                            peer,
                            self.registry.clone(),
                            self.dispatcher.clone(),
                            self.idle_timeout,
                        ));
                    }
                    Err(e) => {
                        warn!(error = %e, "Accept failed");
                        tokio::time::sleep(ACCEPT_BACKOFF).await;
                    }
                },
                Some(joined) = sessions.join_next(), if !sessions.is_empty() => {
                    if let Err(e) = joined {
                        error!(error = %e, "Connection task failed");
                    }
                }
            }
        }

        for conn in self.registry.connections().await {
            info!(
                conn_id = conn.id,
                peer = %conn.peer,
                open_for = ?conn.connected_at.elapsed(),
                "Closing connection"
            );
        }
        sessions.shutdown().await;
        let dropped = self.registry.clear().await;
        info!(dropped, "Server shut down");
        Ok(())
    }
}

/// Handshake, register, run the session, and always unregister afterwards
async fn serve_connection(
    stream: TcpStream,
    peer: SocketAddr,
    registry: Arc<ConnectionRegistry>,
    dispatcher: Arc<CommandDispatcher>,
    idle_timeout: Option<Duration>,
) {
    let ws = match tokio_tungstenite::accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            warn!(%peer, error = %e, "WebSocket handshake failed");
            return;
        }
    };

    let info = ConnectionInfo::new(registry.next_id(), peer);
    let conn_id = info.id;
    registry.register(info.clone()).await;
    info!(conn_id, %peer, "Client connected from {}", peer.ip());

    let session = Session::new(info, ws, dispatcher, idle_timeout);
    let reason = match AssertUnwindSafe(session.run()).catch_unwind().await {
        Ok(reason) => reason,
        Err(_) => {
            error!(conn_id, %peer, "Session panicked");
            CloseReason::Aborted
        }
    };

    let open_for = registry
        .unregister(conn_id)
        .await
        .map(|info| info.connected_at.elapsed());
    info!(conn_id, %peer, %reason, ?open_for, "Client {} disconnected", peer.ip());
}
