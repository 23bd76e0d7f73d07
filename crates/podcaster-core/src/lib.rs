#![doc = include_str!("../README.md")]
#![deny(unused_crate_dependencies)]

pub mod domain;
pub mod error;
pub mod ports;
pub mod services;

#[cfg(test)]
mod testing;

// Re-export commonly used types for convenience
pub use domain::{
    ContextEntry, ConversationContext, Delivery, DomainError, InterruptionSlot, LISTENER_SENTINEL,
    Role, RunId, Segment, Session, SessionId, SlotRetired, Speaker, Transcript, VoiceId,
    VoicePair,
};
pub use error::{ErrorKind, SessionError};
pub use ports::{
    GeneratedBatch, GenerationError, GenerationPort, RegistryError, SessionRegistry, SpeechError,
    SpeechSynthesizer, SpeechTranscriber, StreamTransport, TransportError,
};
pub use services::{
    DEFAULT_VOICES, InMemorySessionRegistry, InterruptionReceipt, InterruptionService,
    ListenerInput, OrchestratorConfig, PlayOutcome, SessionOrchestrator, SessionState,
    SessionSummary, TurnPlayer, VoiceAssigner,
};
