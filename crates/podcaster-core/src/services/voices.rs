use std::collections::HashSet;

use rand::Rng;

use crate::domain::{DomainError, VoiceId, VoicePair};

/// Voices offered by OpenAI-compatible `/audio/speech` endpoints.
pub const DEFAULT_VOICES: &[&str] = &["alloy", "echo", "fable", "onyx", "nova", "shimmer"];

/// Picks a distinct host/guest voice pair from a fixed pool.
///
/// The host is drawn uniformly at random; the guest takes the next voice in
/// the pool, wrapping at the end. Run once per session.
#[derive(Debug, Clone)]
pub struct VoiceAssigner {
    pool: Vec<VoiceId>,
}

impl VoiceAssigner {
    /// Build an assigner. The pool needs at least two distinct voices.
    pub fn new(pool: Vec<VoiceId>) -> Result<Self, DomainError> {
        let mut seen = HashSet::new();
        if let Some(dup) = pool.iter().find(|v| !seen.insert(v.as_str())) {
            return Err(DomainError::DuplicateVoice(dup.to_string()));
        }
        if pool.len() < 2 {
            return Err(DomainError::PoolTooSmall(pool.len()));
        }
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &[VoiceId] {
        &self.pool
    }

    /// Draw a pair using the thread-local generator.
    pub fn assign(&self) -> VoicePair {
        self.assign_with(&mut rand::rng())
    }

    /// Draw a pair using the given generator.
    pub fn assign_with<R: Rng + ?Sized>(&self, rng: &mut R) -> VoicePair {
        let host = rng.random_range(0..self.pool.len());
        let guest = (host + 1) % self.pool.len();
        VoicePair {
            host: self.pool[host].clone(),
            guest: self.pool[guest].clone(),
        }
    }
}

impl Default for VoiceAssigner {
    fn default() -> Self {
        Self {
            pool: DEFAULT_VOICES.iter().copied().map(VoiceId::from).collect(),
        }
    }
}
