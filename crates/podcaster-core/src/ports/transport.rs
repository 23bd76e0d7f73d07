//! Bidirectional stream to one listener.

use async_trait::async_trait;
use thiserror::Error;

/// Errors from the stream transport.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// The peer closed the stream.
    #[error("stream closed by peer")]
    Closed,

    /// Reading or writing failed.
    #[error("stream I/O failed: {0}")]
    Io(String),
}

/// The listener's stream as seen by the session task.
///
/// Only the owning session task reads from or writes to a transport.
#[async_trait]
pub trait StreamTransport: Send {
    /// Next inbound text message. `Ok(None)` once the stream has ended.
    async fn recv_text(&mut self) -> Result<Option<String>, TransportError>;

    /// Send a text frame.
    async fn send_text(&mut self, text: &str) -> Result<(), TransportError>;

    /// Send a binary audio frame.
    async fn send_audio(&mut self, audio: Vec<u8>) -> Result<(), TransportError>;

    /// Close the stream. Closing twice is not an error.
    async fn close(&mut self) -> Result<(), TransportError>;
}
