//! In-memory fakes for the engine's ports.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::{ConversationContext, Segment, VoiceId};
use crate::ports::{
    GeneratedBatch, GenerationError, GenerationPort, SpeechError, SpeechSynthesizer,
    StreamTransport, TransportError,
};

pub fn segments(lines: &[(&str, &str)]) -> Vec<Segment> {
    lines
        .iter()
        .map(|(speaker, text)| Segment::parse(speaker, *text).unwrap())
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Text(String),
    Audio(Vec<u8>),
}

type AudioHook = Box<dyn FnMut(usize) + Send>;

/// Records outbound frames and replays scripted inbound messages.
pub struct FakeTransport {
    inbound: VecDeque<String>,
    frames: Vec<Frame>,
    audio_sent: usize,
    on_audio: Option<AudioHook>,
    fail_after: Option<usize>,
    closed: bool,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self {
            inbound: VecDeque::new(),
            frames: Vec::new(),
            audio_sent: 0,
            on_audio: None,
            fail_after: None,
            closed: false,
        }
    }

    pub fn with_inbound(messages: &[&str]) -> Self {
        let mut transport = Self::new();
        transport.inbound = messages.iter().map(|m| (*m).to_string()).collect();
        transport
    }

    /// Run `hook` with the zero-based audio frame index while it is sent.
    pub fn on_audio(mut self, hook: impl FnMut(usize) + Send + 'static) -> Self {
        self.on_audio = Some(Box::new(hook));
        self
    }

    /// Fail every send once `frames` frames have gone out.
    pub const fn fail_after(mut self, frames: usize) -> Self {
        self.fail_after = Some(frames);
        self
    }

    pub fn frames(&self) -> Vec<Frame> {
        self.frames.clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.frames
            .iter()
            .filter_map(|f| match f {
                Frame::Text(t) => Some(t.clone()),
                Frame::Audio(_) => None,
            })
            .collect()
    }

    pub fn audio_count(&self) -> usize {
        self.audio_sent
    }

    pub const fn is_closed(&self) -> bool {
        self.closed
    }

    fn check_send(&self) -> Result<(), TransportError> {
        match self.fail_after {
            Some(limit) if self.frames.len() >= limit => Err(TransportError::Closed),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl StreamTransport for FakeTransport {
    async fn recv_text(&mut self) -> Result<Option<String>, TransportError> {
        Ok(self.inbound.pop_front())
    }

    async fn send_text(&mut self, text: &str) -> Result<(), TransportError> {
        self.check_send()?;
        self.frames.push(Frame::Text(text.to_string()));
        Ok(())
    }

    async fn send_audio(&mut self, audio: Vec<u8>) -> Result<(), TransportError> {
        self.check_send()?;
        if let Some(hook) = self.on_audio.as_mut() {
            hook(self.audio_sent);
        }
        self.frames.push(Frame::Audio(audio));
        self.audio_sent += 1;
        Ok(())
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.closed = true;
        Ok(())
    }
}

/// Returns `"<voice>|<text>"` as the audio payload.
pub struct FakeSynthesizer {
    fail_on: Option<String>,
}

impl FakeSynthesizer {
    pub const fn new() -> Self {
        Self { fail_on: None }
    }

    pub fn failing_on(text: &str) -> Self {
        Self {
            fail_on: Some(text.to_string()),
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for FakeSynthesizer {
    async fn synthesize(&self, text: &str, voice: &VoiceId) -> Result<Vec<u8>, SpeechError> {
        if self.fail_on.as_deref() == Some(text) {
            return Err(SpeechError::Unavailable("tts offline".into()));
        }
        Ok(format!("{voice}|{text}").into_bytes())
    }
}

/// Replays scripted batches and records the context of every call.
/// Returns a finished batch once the script runs out.
pub struct ScriptedGenerator {
    script: Mutex<VecDeque<Result<GeneratedBatch, GenerationError>>>,
    contexts: Mutex<Vec<ConversationContext>>,
}

impl ScriptedGenerator {
    pub fn new(script: Vec<Result<GeneratedBatch, GenerationError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            contexts: Mutex::new(Vec::new()),
        }
    }

    pub fn contexts(&self) -> Vec<ConversationContext> {
        self.contexts.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerationPort for ScriptedGenerator {
    async fn generate(
        &self,
        context: &ConversationContext,
    ) -> Result<GeneratedBatch, GenerationError> {
        self.contexts.lock().unwrap().push(context.clone());
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(GeneratedBatch::finished()))
    }
}
