//! Domain types for the podcast session engine.
//!
//! These types are pure data: no I/O, no async, no transport details.
//! Everything that crosses a port boundary is expressed in terms of them.

mod context;
mod segment;
mod session;
mod slot;
mod transcript;

use thiserror::Error;

pub use context::{ContextEntry, ConversationContext, Role};
pub use segment::{LISTENER_SENTINEL, Segment, Speaker};
pub use session::{RunId, Session, SessionId, VoiceId, VoicePair};
pub use slot::{Delivery, InterruptionSlot, SlotRetired};
pub use transcript::Transcript;

/// Errors raised when constructing domain values from untrusted input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// Segment text was empty or whitespace only.
    #[error("segment text must not be empty")]
    EmptySegmentText,

    /// The backend named a speaker this system does not know.
    #[error("unknown speaker: {0}")]
    UnknownSpeaker(String),

    /// The conversation topic was empty.
    #[error("topic must not be empty")]
    EmptyTopic,

    /// A session identifier failed validation.
    #[error("invalid session id: {0}")]
    InvalidSessionId(String),

    /// A generated batch contained a listener segment.
    #[error("generated batch must not contain listener segments")]
    ListenerInBatch,

    /// The voice pool cannot produce two distinct voices.
    #[error("voice pool needs at least 2 distinct voices, got {0}")]
    PoolTooSmall(usize),

    /// The voice pool lists the same voice twice.
    #[error("duplicate voice in pool: {0}")]
    DuplicateVoice(String),
}
