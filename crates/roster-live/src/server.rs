//! WebSocket adapter for the live channel.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream, ToSocketAddrs};
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info, trace, warn};

use roster_core::error::TransportError;
use roster_core::{PatchError, Reply, Result};

use crate::registry::ConnectionRegistry;
use crate::service::PatchService;

/// Accepts WebSocket connections and feeds their messages to a [`PatchService`].
///
/// Each connection runs on its own task and handles its messages strictly
/// one after another; replies go only to the connection that sent the
/// request.
pub struct LiveServer {
    listener: TcpListener,
    service: Arc<PatchService>,
    registry: ConnectionRegistry,
}

impl LiveServer {
    /// Bind the listening socket.
    pub async fn bind(addr: impl ToSocketAddrs, service: PatchService) -> Result<Self> {
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            TransportError::Connection {
                message: format!("bind failed: {}", e),
            }
        })?;

        Ok(Self {
            listener,
            service: Arc::new(service),
            registry: ConnectionRegistry::new(),
        })
    }

    /// The address actually bound (useful with port 0).
    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.listener.local_addr().map_err(|e| {
            TransportError::Connection {
                message: e.to_string(),
            }
            .into()
        })
    }

    /// Handle on the set of open connections.
    pub fn registry(&self) -> ConnectionRegistry {
        self.registry.clone()
    }

    /// Serve until the process ends.
    pub async fn run(self) -> Result<()> {
        self.run_until(std::future::pending()).await
    }

    /// Serve until `shutdown` completes. Connections already open keep
    /// running on their own tasks.
    pub async fn run_until(self, shutdown: impl Future<Output = ()>) -> Result<()> {
        let addr = self.local_addr()?;
        info!(%addr, "Live channel listening");

        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                () = &mut shutdown => {
                    info!(open = self.registry.len(), "Live channel shutting down");
                    return Ok(());
                }
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        tokio::spawn(serve_connection(
                            stream,
                            peer,
                            Arc::clone(&self.service),
                            self.registry.clone(),
                        ));
                    }
                    Err(e) => {
                        error!(error = %e, "Failed to accept connection");
                    }
                },
            }
        }
    }
}

/// What the connection loop should do with one inbound frame.
enum Inbound {
    Text(String),
    Undecodable(String),
    /// Control reply to send back right away.
    Pong(Message),
    Ignore,
    Close,
}

fn classify(message: Message) -> Inbound {
    match message {
        Message::Text(text) => Inbound::Text(text.as_str().to_string()),
        Message::Binary(data) => match std::str::from_utf8(&data) {
            Ok(text) => Inbound::Text(text.to_string()),
            Err(e) => Inbound::Undecodable(format!("binary frame is not UTF-8: {}", e)),
        },
        Message::Ping(data) => Inbound::Pong(Message::Pong(data)),
        Message::Pong(_) | Message::Frame(_) => Inbound::Ignore,
        Message::Close(frame) => {
            debug!(?frame, "Close frame received");
            Inbound::Close
        }
    }
}

async fn serve_connection(
    stream: TcpStream,
    peer: SocketAddr,
    service: Arc<PatchService>,
    registry: ConnectionRegistry,
) {
    let ws_stream = match accept_async(stream).await {
        Ok(ws_stream) => ws_stream,
        Err(e) => {
            warn!(%peer, error = %e, "WebSocket handshake failed");
            return;
        }
    };

    let guard = registry.register(Some(peer));
    let connection = guard.id();
    info!(%connection, %peer, open = registry.len(), "Client connected");

    let (mut write, mut read) = ws_stream.split();

    while let Some(message) = read.next().await {
        let reply = match message.map(classify) {
            Ok(Inbound::Text(raw)) => service.handle_message(connection, &raw).await,
            Ok(Inbound::Undecodable(reason)) => {
                warn!(%connection, %reason, "Undecodable frame");
                Reply::failure(&PatchError::Parse(reason), None)
            }
            Ok(Inbound::Pong(pong)) => {
                trace!("Received ping");
                if let Err(e) = write.send(pong).await {
                    warn!(error = %e, "Failed to send pong");
                }
                continue;
            }
            Ok(Inbound::Ignore) => continue,
            Ok(Inbound::Close) => break,
            Err(e) => {
                error!(%connection, error = %e, "WebSocket error");
                break;
            }
        };

        if let Err(e) = write.send(Message::text(reply.to_json())).await {
            error!(%connection, error = %e, "Failed to send reply");
            break;
        }
    }

    drop(guard);
    info!(%connection, open = registry.len(), "Client disconnected");
}
