//! Offline backends for demos and local development.
//!
//! Nothing here talks to the network. The generator writes a deterministic
//! dialogue around the topic and the latest interruption, the synthesizer
//! returns silent WAV clips sized to the text, and the transcriber answers
//! with a fixed phrase.

use async_trait::async_trait;
use podcaster_core::{
    ConversationContext, GeneratedBatch, GenerationError, GenerationPort, LISTENER_SENTINEL, Role,
    Segment, SpeechError, SpeechSynthesizer, SpeechTranscriber, Speaker, VoiceId,
};
use serde_json::Value;

const SAMPLE_RATE: u32 = 16_000;
/// Rough speaking rate used to size silent clips.
const MILLIS_PER_WORD: u32 = 60;
const MAX_CLIP_MILLIS: u32 = 2_000;

/// Deterministic [`GenerationPort`] that needs no model.
///
/// The first call introduces the topic; after an interruption it answers the
/// listener's question. Every batch ends the podcast unless interrupted.
#[derive(Debug, Clone, Default)]
pub struct ScriptedGenerator;

impl ScriptedGenerator {
    pub const fn new() -> Self {
        Self
    }

    fn opening(topic: &str) -> Vec<(Speaker, String)> {
        vec![
            (
                Speaker::Host,
                format!("Welcome back to the show! Today we're diving into {topic}."),
            ),
            (
                Speaker::Guest,
                format!("Thanks for having me. {topic} is one of my favourite subjects."),
            ),
            (
                Speaker::Host,
                "So where should a newcomer start?".to_string(),
            ),
            (
                Speaker::Guest,
                "Start small, build something real, and read other people's code.".to_string(),
            ),
            (
                Speaker::Host,
                format!("That's encouraging. {topic} sounds worth checking out."),
            ),
            (
                Speaker::Guest,
                "Absolutely. Give it a try and see where it takes you.".to_string(),
            ),
        ]
    }

    fn follow_up(question: &str) -> Vec<(Speaker, String)> {
        vec![
            (
                Speaker::Host,
                format!("We have a listener question: {question}"),
            ),
            (
                Speaker::Guest,
                "Great question. The short answer is that it depends on what you are building."
                    .to_string(),
            ),
            (
                Speaker::Host,
                "Can you give us an example?".to_string(),
            ),
            (
                Speaker::Guest,
                "Sure. Pick the smallest version of the problem and grow it from there."
                    .to_string(),
            ),
        ]
    }
}

/// The listener's words from the newest context entry, if it is an
/// interruption.
fn latest_interruption(context: &ConversationContext) -> Option<String> {
    let entry = context.entries().last()?;
    if entry.role != Role::Listener || context.len() == 1 {
        return None;
    }
    let value: Value = serde_json::from_str(&entry.content).ok()?;
    let text = value.get("text")?.as_str()?;
    Some(text.strip_prefix(LISTENER_SENTINEL).unwrap_or(text).to_string())
}

#[async_trait]
impl GenerationPort for ScriptedGenerator {
    async fn generate(
        &self,
        context: &ConversationContext,
    ) -> Result<GeneratedBatch, GenerationError> {
        let lines = match latest_interruption(context) {
            Some(question) => Self::follow_up(&question),
            None => Self::opening(context.topic()),
        };
        let segments = lines
            .into_iter()
            .map(|(speaker, text)| Segment::new(speaker, text))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(GeneratedBatch::new(segments, false)?)
    }
}

/// [`SpeechSynthesizer`] producing 16-bit mono silence as a WAV file.
#[derive(Debug, Clone, Default)]
pub struct SilentSynthesizer;

impl SilentSynthesizer {
    pub const fn new() -> Self {
        Self
    }
}

/// Encode `samples` silent 16-bit mono samples as a WAV file.
fn silent_wav(samples: u32, sample_rate: u32) -> Vec<u8> {
    let data_len = samples * 2;
    let mut buf = Vec::with_capacity(44 + data_len as usize);
    buf.extend_from_slice(b"RIFF");
    buf.extend_from_slice(&(36 + data_len).to_le_bytes());
    buf.extend_from_slice(b"WAVE");
    buf.extend_from_slice(b"fmt ");
    buf.extend_from_slice(&16u32.to_le_bytes());
    buf.extend_from_slice(&1u16.to_le_bytes()); // PCM
    buf.extend_from_slice(&1u16.to_le_bytes()); // mono
    buf.extend_from_slice(&sample_rate.to_le_bytes());
    buf.extend_from_slice(&(sample_rate * 2).to_le_bytes());
    buf.extend_from_slice(&2u16.to_le_bytes());
    buf.extend_from_slice(&16u16.to_le_bytes());
    buf.extend_from_slice(b"data");
    buf.extend_from_slice(&data_len.to_le_bytes());
    buf.resize(44 + data_len as usize, 0);
    buf
}

#[async_trait]
impl SpeechSynthesizer for SilentSynthesizer {
    async fn synthesize(&self, text: &str, _voice: &VoiceId) -> Result<Vec<u8>, SpeechError> {
        let words = u32::try_from(text.split_whitespace().count()).unwrap_or(u32::MAX);
        let millis = words.saturating_mul(MILLIS_PER_WORD).clamp(MILLIS_PER_WORD, MAX_CLIP_MILLIS);
        Ok(silent_wav(SAMPLE_RATE * millis / 1000, SAMPLE_RATE))
    }
}

/// [`SpeechTranscriber`] that hears the same phrase in every recording.
#[derive(Debug, Clone)]
pub struct PlaceholderTranscriber {
    phrase: String,
}

impl PlaceholderTranscriber {
    pub fn new(phrase: impl Into<String>) -> Self {
        Self {
            phrase: phrase.into(),
        }
    }
}

impl Default for PlaceholderTranscriber {
    fn default() -> Self {
        Self::new("Can you tell us more about that?")
    }
}

#[async_trait]
impl SpeechTranscriber for PlaceholderTranscriber {
    async fn transcribe(&self, audio: &[u8], _content_type: &str) -> Result<String, SpeechError> {
        if audio.is_empty() {
            return Err(SpeechError::InvalidInput("audio is empty".into()));
        }
        Ok(self.phrase.clone())
    }
}
