//! WebSocket adapter for the session stream.
//!
//! [`WebSocketTransport`] is the orchestrator's only view of the socket: it
//! owns the send half and reads inbound text from an `mpsc` channel fed by
//! the ingest task ([`forward_inbound`]), which owns the receive half.
//!
//! ## Disconnect handling
//!
//! The ingest task keeps reading after the topic has been delivered so that
//! a close frame or network error is noticed mid-podcast. When the socket
//! goes away it cancels the session token; the orchestrator observes that at
//! its next await point and stops without calling any more backends.
//!
//! Inbound text after the topic is not part of the protocol. It is dropped
//! once the channel is full rather than back-pressuring the reader.

use std::fmt::Display;

use async_trait::async_trait;
use axum::extract::ws::Message;
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use podcaster_core::{StreamTransport, TransportError};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Inbound messages buffered for the orchestrator.
pub const INBOUND_CAPACITY: usize = 4;

/// Session transport over the send half of a WebSocket.
pub struct WebSocketTransport<S> {
    sender: S,
    inbound: mpsc::Receiver<String>,
    closed: bool,
}

impl<S> WebSocketTransport<S> {
    pub const fn new(sender: S, inbound: mpsc::Receiver<String>) -> Self {
        Self {
            sender,
            inbound,
            closed: false,
        }
    }
}

impl<S> WebSocketTransport<S>
where
    S: Sink<Message> + Unpin + Send,
    S::Error: Display,
{
    async fn send(&mut self, message: Message) -> Result<(), TransportError> {
        if self.closed {
            return Err(TransportError::Closed);
        }
        self.sender
            .send(message)
            .await
            .map_err(|e| TransportError::Io(e.to_string()))
    }
}

#[async_trait]
impl<S> StreamTransport for WebSocketTransport<S>
where
    S: Sink<Message> + Unpin + Send,
    S::Error: Display,
{
    async fn recv_text(&mut self) -> Result<Option<String>, TransportError> {
        Ok(self.inbound.recv().await)
    }

    async fn send_text(&mut self, text: &str) -> Result<(), TransportError> {
        self.send(Message::Text(text.into())).await
    }

    async fn send_audio(&mut self, audio: Vec<u8>) -> Result<(), TransportError> {
        self.send(Message::Binary(audio.into())).await
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.sender
            .close()
            .await
            .map_err(|e| TransportError::Io(e.to_string()))
    }
}

/// Read the socket until it closes, forwarding text to `inbound`.
///
/// Binary frames are accepted when they hold UTF-8 text. Cancels `cancel`
/// on close or error.
pub async fn forward_inbound<St, E>(
    mut receiver: St,
    inbound: mpsc::Sender<String>,
    cancel: CancellationToken,
) where
    St: Stream<Item = Result<Message, E>> + Unpin,
    E: Display,
{
    while let Some(msg_result) = receiver.next().await {
        let text = match msg_result {
            Ok(Message::Text(text)) => text.as_str().to_owned(),
            Ok(Message::Binary(data)) => match String::from_utf8(data.to_vec()) {
                Ok(text) => text,
                Err(_) => {
                    warn!(bytes = data.len(), "Ignoring non-UTF-8 binary frame");
                    continue;
                }
            },
            Ok(Message::Close(_)) => break,
            Err(e) => {
                debug!(error = %e, "WebSocket read failed");
                break;
            }
            // Ignore ping/pong frames.
            Ok(_) => continue,
        };

        match inbound.try_send(text) {
            Ok(()) => {}
            Err(TrySendError::Full(text)) => {
                debug!(chars = text.len(), "Dropping unexpected inbound message");
            }
            Err(TrySendError::Closed(_)) => {}
        }
    }

    cancel.cancel();
}
