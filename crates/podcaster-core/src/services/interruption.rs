use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use crate::domain::{Delivery, Segment, SessionId};
use crate::error::SessionError;
use crate::ports::{RegistryError, SessionRegistry, SpeechTranscriber};

/// A retired slot is replaced under the registry lock, so a second attempt
/// sees the new one. The extra attempts only cover back-to-back interruption
/// cycles.
const MAX_DELIVERY_ATTEMPTS: usize = 3;

/// What the listener sent.
#[derive(Debug, Clone)]
pub enum ListenerInput {
    Text(String),
    Audio {
        bytes: Vec<u8>,
        content_type: String,
    },
}

/// Acknowledgement for a delivered interruption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InterruptionReceipt {
    pub delivery: Delivery,
    /// The interruption as the listener will see it echoed.
    pub text: String,
}

/// Out-of-band entry point for listener interruptions.
///
/// Runs in the request's own task. It never touches the session's transport
/// or context; the only shared write is the offer into the session's slot.
#[derive(Clone)]
pub struct InterruptionService {
    registry: Arc<dyn SessionRegistry>,
    transcriber: Arc<dyn SpeechTranscriber>,
}

impl InterruptionService {
    pub fn new(
        registry: Arc<dyn SessionRegistry>,
        transcriber: Arc<dyn SpeechTranscriber>,
    ) -> Self {
        Self {
            registry,
            transcriber,
        }
    }

    /// Deliver an interruption to a live session.
    ///
    /// Fails with [`SessionError::SessionNotFound`] before doing any work if
    /// the session is unknown or has ended.
    pub async fn submit(
        &self,
        id: &SessionId,
        input: ListenerInput,
    ) -> Result<InterruptionReceipt, SessionError> {
        self.registry.get(id)?;

        let raw = match input {
            ListenerInput::Text(text) => text,
            ListenerInput::Audio {
                bytes,
                content_type,
            } => {
                if bytes.is_empty() {
                    return Err(SessionError::InvalidInput("audio upload is empty".into()));
                }
                debug!(
                    session_id = %id,
                    bytes = bytes.len(),
                    %content_type,
                    "Transcribing interruption"
                );
                self.transcriber
                    .transcribe(&bytes, &content_type)
                    .await
                    .map_err(SessionError::Transcription)?
            }
        };

        let segment = Segment::listener_interruption(&raw)
            .map_err(|e| SessionError::InvalidInput(e.to_string()))?;
        let text = segment.display_text().to_string();
        let delivery = self.deliver(id, &segment)?;

        info!(session_id = %id, ?delivery, interruption = %text, "Interruption delivered");
        Ok(InterruptionReceipt { delivery, text })
    }

    fn deliver(&self, id: &SessionId, segment: &Segment) -> Result<Delivery, SessionError> {
        for attempt in 1..=MAX_DELIVERY_ATTEMPTS {
            match self.registry.deliver(id, segment.clone()) {
                Err(RegistryError::SlotRetired(_)) => {
                    debug!(session_id = %id, attempt, "Slot retired mid-offer, re-resolving");
                }
                other => return other.map_err(Into::into),
            }
        }
        Err(SessionError::SessionNotFound(id.clone()))
    }
}
