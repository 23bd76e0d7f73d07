//! Error taxonomy for session-level operations.

use thiserror::Error;

use crate::domain::SessionId;
use crate::ports::{GenerationError, RegistryError, SpeechError, TransportError};

/// Coarse classification used by adapters to pick a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The stream did not follow the expected message order.
    Protocol,
    /// A generation, synthesis or transcription backend failed.
    Backend,
    /// The referenced session does not exist or has ended.
    SessionNotFound,
    /// The request carried unusable input.
    InvalidInput,
    /// Another run holds the session id.
    Conflict,
    /// The listener went away.
    Disconnected,
}

/// Errors that end a session or reject an interruption.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("generation failed: {0}")]
    Generation(#[from] GenerationError),

    #[error("speech synthesis failed: {0}")]
    Synthesis(#[source] SpeechError),

    #[error("transcription failed: {0}")]
    Transcription(#[source] SpeechError),

    #[error("transport failed: {0}")]
    Transport(#[from] TransportError),

    #[error("session cancelled")]
    Cancelled,

    #[error("session not found: {0}")]
    SessionNotFound(SessionId),

    #[error("session already exists: {0}")]
    AlreadyExists(SessionId),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl SessionError {
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Protocol(_) => ErrorKind::Protocol,
            Self::Generation(_) | Self::Synthesis(_) | Self::Transcription(_) => {
                ErrorKind::Backend
            }
            Self::Transport(_) | Self::Cancelled => ErrorKind::Disconnected,
            Self::SessionNotFound(_) => ErrorKind::SessionNotFound,
            Self::AlreadyExists(_) => ErrorKind::Conflict,
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
        }
    }

    /// Whether the session ended because the listener left.
    pub const fn is_disconnect(&self) -> bool {
        matches!(self.kind(), ErrorKind::Disconnected)
    }
}

impl From<RegistryError> for SessionError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::NotFound(id) | RegistryError::SlotRetired(id) => {
                Self::SessionNotFound(id)
            }
            RegistryError::AlreadyExists(id) => Self::AlreadyExists(id),
        }
    }
}
