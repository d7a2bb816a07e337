use std::time::Duration;

use anyhow::Context;
use futures_util::{
    stream::{SplitSink, SplitStream},
    SinkExt, StreamExt,
};
use tokio::net::TcpStream;
use tokio::time::Instant;
use tokio_tungstenite::{
    connect_async, tungstenite::Message as WsMessage, MaybeTlsStream, WebSocketStream,
};
use tracing::{debug, warn};
use wire::{command::Command, message::ServerMessage};

/// Fixed delay before the single scheduled reconnect attempt fires after
/// the link goes down. There is no retry cap; reconnection continues for
/// the life of the session.
pub const RECONNECT_DELAY: Duration = Duration::from_millis(3000);

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Lifecycle of the agent link.
///
/// ```text
/// Disconnected --connect()----> Connecting
/// Connecting   --handshake ok-> Open
/// Connecting   --handshake err-> Disconnected (one reconnect scheduled)
/// Open         --close/error--> Disconnected (one reconnect scheduled)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Disconnected,
    Connecting,
    Open,
}

/// Whether a command actually made it onto the wire. Dropped commands are
/// gone for good; nothing is buffered for later delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    Sent,
    Dropped,
}

/// Owns the WebSocket to the agent: connect, receive decoded messages,
/// fire-and-forget sends, and the standing reconnect policy.
pub struct Connection {
    url: String,
    status: ConnectionStatus,
    sink: Option<SplitSink<WsStream, WsMessage>>,
    frames: Option<SplitStream<WsStream>>,
    next_attempt: Option<Instant>,
}

impl Connection {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            status: ConnectionStatus::Disconnected,
            sink: None,
            frames: None,
            next_attempt: None,
        }
    }

    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    pub fn is_open(&self) -> bool {
        self.status == ConnectionStatus::Open
    }

    /// True while a reconnect attempt is scheduled but has not fired yet.
    pub fn reconnect_scheduled(&self) -> bool {
        self.next_attempt.is_some()
    }

    /// Establish the link. Idempotent: a no-op unless the link is fully
    /// down, which is what makes a stale reconnect timer harmless once a
    /// newer connection is already up.
    pub async fn connect(&mut self) -> anyhow::Result<()> {
        if self.status != ConnectionStatus::Disconnected {
            return Ok(());
        }

        self.status = ConnectionStatus::Connecting;
        match connect_async(self.url.as_str()).await {
            Ok((stream, _response)) => {
                let (sink, frames) = stream.split();
                self.sink = Some(sink);
                self.frames = Some(frames);
                self.status = ConnectionStatus::Open;
                self.next_attempt = None;
                debug!(url = %self.url, "agent link established");

                Ok(())
            }
            Err(err) => {
                self.mark_closed();

                Err(err).context("could not reach the agent")
            }
        }
    }

    /// Tear the link down and schedule exactly one reconnect attempt.
    pub fn mark_closed(&mut self) {
        self.sink = None;
        self.frames = None;
        self.status = ConnectionStatus::Disconnected;
        self.next_attempt = Some(Instant::now() + RECONNECT_DELAY);
    }

    /// Resolves once the scheduled reconnect attempt is due. Resolves
    /// immediately when nothing was scheduled yet (initial connect).
    pub async fn reconnect_due(&self) {
        if let Some(deadline) = self.next_attempt {
            tokio::time::sleep_until(deadline).await;
        }
    }

    /// Next decodable message from the agent, or `None` once the link is
    /// gone. Frames that fail to decode are logged and skipped without
    /// interrupting the stream; control frames are handled transparently.
    pub async fn next_message(&mut self) -> Option<ServerMessage> {
        let frames = self.frames.as_mut()?;

        loop {
            match frames.next().await {
                Some(Ok(WsMessage::Text(raw))) => match serde_json::from_str::<ServerMessage>(&raw)
                {
                    Ok(message) => return Some(message),
                    Err(err) => {
                        warn!(%err, "dropping undecodable frame");
                    }
                },
                Some(Ok(WsMessage::Close(_))) | None => return None,
                // pings and pongs are answered by the transport itself,
                // binary frames have no meaning in this protocol
                Some(Ok(_)) => {}
                Some(Err(err)) => {
                    warn!(%err, "transport error while reading");
                    return None;
                }
            }
        }
    }

    /// Fire-and-forget send. If the link is not open the command is
    /// dropped and the caller is told so; a write failure additionally
    /// tears the link down.
    pub async fn send(&mut self, command: &Command) -> SendOutcome {
        let Some(sink) = self.sink.as_mut() else {
            return SendOutcome::Dropped;
        };

        let raw = match serde_json::to_string(command) {
            Ok(raw) => raw,
            Err(err) => {
                warn!(%err, "could not serialize command");
                return SendOutcome::Dropped;
            }
        };

        match sink.send(WsMessage::Text(raw)).await {
            Ok(()) => SendOutcome::Sent,
            Err(err) => {
                warn!(%err, "write failed, tearing the agent link down");
                self.mark_closed();

                SendOutcome::Dropped
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_connection_starts_disconnected() {
        let conn = Connection::new("ws://127.0.0.1:9/ws");

        assert_eq!(conn.status(), ConnectionStatus::Disconnected);
        assert!(!conn.reconnect_scheduled());
    }

    #[test]
    fn test_mark_closed_schedules_one_attempt() {
        let mut conn = Connection::new("ws://127.0.0.1:9/ws");

        conn.mark_closed();
        assert_eq!(conn.status(), ConnectionStatus::Disconnected);
        assert!(conn.reconnect_scheduled());
    }

    #[tokio::test]
    async fn test_send_without_link_drops_the_command() {
        let mut conn = Connection::new("ws://127.0.0.1:9/ws");

        let outcome = conn
            .send(&Command::Skip(wire::command::SkipCommand))
            .await;
        assert_eq!(outcome, SendOutcome::Dropped);
    }

    #[tokio::test]
    async fn test_next_message_without_link_ends_immediately() {
        let mut conn = Connection::new("ws://127.0.0.1:9/ws");

        assert_eq!(conn.next_message().await, None);
    }

    #[tokio::test]
    async fn test_failed_connect_schedules_reconnect() {
        // nothing listens on this address, the handshake must fail
        let mut conn = Connection::new("ws://127.0.0.1:9/ws");

        assert!(conn.connect().await.is_err());
        assert_eq!(conn.status(), ConnectionStatus::Disconnected);
        assert!(conn.reconnect_scheduled());
    }
}
