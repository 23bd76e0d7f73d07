use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::{DomainError, InterruptionSlot, Speaker};

const MAX_SESSION_ID_LEN: usize = 128;

/// Opaque per-browser session identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Issue a fresh random identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Validate an identifier received from a client.
    ///
    /// Accepts ASCII alphanumerics, `-` and `_`, up to 128 characters.
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let raw = raw.trim();
        let valid = !raw.is_empty()
            && raw.len() <= MAX_SESSION_ID_LEN
            && raw
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if valid {
            Ok(Self(raw.to_string()))
        } else {
            Err(DomainError::InvalidSessionId(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifies one orchestrator run. A session id can be re-used by a later
/// stream; the run id tells the two apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RunId(Uuid);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Identifier understood by the synthesis backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VoiceId(String);

impl VoiceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VoiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VoiceId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Voices for the two podcast speakers. `host != guest`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoicePair {
    pub host: VoiceId,
    pub guest: VoiceId,
}

impl VoicePair {
    /// Voice for a speaker. Listener segments are never synthesized.
    pub const fn voice_for(&self, speaker: Speaker) -> Option<&VoiceId> {
        match speaker {
            Speaker::Host => Some(&self.host),
            Speaker::Guest => Some(&self.guest),
            Speaker::Listener => None,
        }
    }
}

/// A live session as seen by the registry.
///
/// The conversation context is not stored here: it belongs to the
/// orchestrator task. Other request contexts only ever touch `slot`.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: SessionId,
    pub run: RunId,
    pub topic: String,
    pub voices: VoicePair,
    pub slot: InterruptionSlot,
    pub cancel: CancellationToken,
    pub started_at: DateTime<Utc>,
}

impl Session {
    pub fn new(
        id: SessionId,
        run: RunId,
        topic: impl Into<String>,
        voices: VoicePair,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            id,
            run,
            topic: topic.into(),
            voices,
            slot: InterruptionSlot::new(),
            cancel,
            started_at: Utc::now(),
        }
    }
}
