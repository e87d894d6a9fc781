//! WebSocket client for the live channel.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::time::{Instant, timeout_at};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, info, trace};

use roster_core::error::TransportError;
use roster_core::{PatchRequest, Reply, Result};

/// Default time to wait for the server's reply to one request.
const DEFAULT_REPLY_TIMEOUT: Duration = Duration::from_secs(10);

/// A connection to a live channel server.
///
/// Requests are answered in order, so [`send`](Self::send) simply waits for
/// the next text frame.
pub struct LiveClient {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    reply_timeout: Duration,
}

impl LiveClient {
    /// Connect to a `ws://` or `wss://` URL.
    pub async fn connect(url: &str) -> Result<Self> {
        info!(%url, "Connecting to live channel");

        let (stream, _) = connect_async(url).await.map_err(|e| {
            TransportError::Connection {
                message: e.to_string(),
            }
        })?;

        debug!("WebSocket connected");

        Ok(Self {
            stream,
            reply_timeout: DEFAULT_REPLY_TIMEOUT,
        })
    }

    /// Change how long [`send`](Self::send) waits for a reply.
    pub fn with_reply_timeout(mut self, reply_timeout: Duration) -> Self {
        self.reply_timeout = reply_timeout;
        self
    }

    /// Send a patch request and wait for its reply.
    pub async fn send(&mut self, request: &PatchRequest) -> Result<Reply> {
        self.send_raw(&request.to_json()).await
    }

    /// Send arbitrary text and wait for the reply. Lets callers exercise the
    /// server's handling of malformed messages.
    pub async fn send_raw(&mut self, text: &str) -> Result<Reply> {
        self.stream
            .send(Message::text(text.to_string()))
            .await
            .map_err(|e| TransportError::Connection {
                message: e.to_string(),
            })?;

        self.recv().await
    }

    /// Wait for the next reply without sending anything.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Timeout`] when nothing arrives within the
    /// reply timeout.
    pub async fn recv(&mut self) -> Result<Reply> {
        let deadline = Instant::now() + self.reply_timeout;

        loop {
            let next = timeout_at(deadline, self.stream.next())
                .await
                .map_err(|_| TransportError::Timeout {
                    duration_ms: u64::try_from(self.reply_timeout.as_millis())
                        .unwrap_or(u64::MAX),
                })?;

            match next {
                Some(Ok(Message::Text(text))) => {
                    return Reply::parse(text.as_str()).map_err(|e| {
                        TransportError::Codec {
                            message: e.to_string(),
                        }
                        .into()
                    });
                }
                Some(Ok(Message::Close(_))) | None => return Err(TransportError::Closed.into()),
                Some(Ok(other)) => {
                    trace!(?other, "Skipping non-text frame");
                }
                Some(Err(e)) => {
                    return Err(TransportError::Connection {
                        message: e.to_string(),
                    }
                    .into());
                }
            }
        }
    }

    /// Close the connection politely.
    pub async fn close(mut self) -> Result<()> {
        self.stream.close(None).await.map_err(|e| {
            TransportError::Connection {
                message: e.to_string(),
            }
            .into()
        })
    }
}
