//! Speech synthesis and transcription ports.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::VoiceId;

/// Errors from a speech backend.
#[derive(Debug, Clone, Error)]
pub enum SpeechError {
    /// The backend could not be reached or answered with a failure status.
    #[error("speech backend unavailable: {0}")]
    Unavailable(String),

    /// The request was rejected as invalid (empty audio, unknown voice).
    #[error("invalid speech input: {0}")]
    InvalidInput(String),

    /// The backend answered, but not with usable content.
    #[error("invalid speech response: {0}")]
    InvalidResponse(String),
}

/// Turns text into encoded audio.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize `text` with `voice`. Returns the encoded audio bytes
    /// exactly as the backend produced them.
    async fn synthesize(&self, text: &str, voice: &VoiceId) -> Result<Vec<u8>, SpeechError>;
}

/// Turns recorded audio into text.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SpeechTranscriber: Send + Sync {
    /// Transcribe `audio`, encoded as `content_type`.
    async fn transcribe(&self, audio: &[u8], content_type: &str) -> Result<String, SpeechError>;
}
