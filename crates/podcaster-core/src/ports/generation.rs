//! Dialogue generation port.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{ConversationContext, DomainError, Segment, Speaker};

/// Segments returned by one generation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedBatch {
    segments: Vec<Segment>,
    has_more: bool,
}

impl GeneratedBatch {
    /// Validate a batch. Only Host and Guest may speak in generated dialogue.
    pub fn new(segments: Vec<Segment>, has_more: bool) -> Result<Self, DomainError> {
        if segments.iter().any(|s| s.speaker() == Speaker::Listener) {
            return Err(DomainError::ListenerInBatch);
        }
        Ok(Self { segments, has_more })
    }

    /// A batch that ends the podcast.
    pub const fn finished() -> Self {
        Self {
            segments: Vec::new(),
            has_more: false,
        }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Whether the backend has more to say after this batch.
    pub const fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// An empty batch means the podcast is finished.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// Errors from a generation backend.
#[derive(Debug, Clone, Error)]
pub enum GenerationError {
    /// The backend could not be reached or answered with a failure status.
    #[error("generation backend unavailable: {0}")]
    Unavailable(String),

    /// The backend answered, but not with a usable batch.
    #[error("invalid generation response: {0}")]
    InvalidResponse(String),
}

impl From<DomainError> for GenerationError {
    fn from(err: DomainError) -> Self {
        Self::InvalidResponse(err.to_string())
    }
}

/// Produces the next batch of dialogue for a conversation.
#[async_trait]
pub trait GenerationPort: Send + Sync {
    /// Generate the next batch. Must not mutate or retain `context`.
    async fn generate(
        &self,
        context: &ConversationContext,
    ) -> Result<GeneratedBatch, GenerationError>;
}
