//! Speech synthesis and transcription over `/audio/*`.

use std::sync::Arc;

use async_trait::async_trait;
use podcaster_core::{SpeechError, SpeechSynthesizer, SpeechTranscriber, VoiceId};
use serde_json::{Value, json};
use tracing::debug;

use crate::config::OpenAiConfig;
use crate::error::BackendError;
use crate::http::{ApiRequest, HttpBackend, MultipartUpload};

/// [`SpeechSynthesizer`] backed by `POST /audio/speech`.
///
/// Audio is returned exactly as the server encoded it.
pub struct OpenAiSynthesizer<B: HttpBackend> {
    backend: Arc<B>,
    model: String,
    format: String,
}

impl<B: HttpBackend> OpenAiSynthesizer<B> {
    pub fn new(backend: Arc<B>, config: &OpenAiConfig) -> Self {
        Self {
            backend,
            model: config.tts_model.clone(),
            format: config.tts_format.clone(),
        }
    }
}

#[async_trait]
impl<B: HttpBackend> SpeechSynthesizer for OpenAiSynthesizer<B> {
    async fn synthesize(&self, text: &str, voice: &VoiceId) -> Result<Vec<u8>, SpeechError> {
        let request = ApiRequest::json(
            "audio/speech",
            json!({
                "model": self.model,
                "input": text,
                "voice": voice.as_str(),
                "response_format": self.format,
            }),
        );
        let audio = self.backend.post(&request).await?;
        if audio.is_empty() {
            return Err(BackendError::invalid("speech endpoint returned no audio").into());
        }
        debug!(%voice, bytes = audio.len(), "Speech synthesized");
        Ok(audio)
    }
}

/// [`SpeechTranscriber`] backed by `POST /audio/transcriptions`.
pub struct OpenAiTranscriber<B: HttpBackend> {
    backend: Arc<B>,
    model: String,
}

impl<B: HttpBackend> OpenAiTranscriber<B> {
    pub fn new(backend: Arc<B>, config: &OpenAiConfig) -> Self {
        Self {
            backend,
            model: config.stt_model.clone(),
        }
    }
}

/// File extension the transcription endpoint expects for a MIME type.
///
/// Parameters such as `;codecs=opus` are ignored. Unknown types fall back to
/// `webm`, which is what browsers record by default.
fn extension_for(content_type: &str) -> &'static str {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    match essence.as_str() {
        "audio/wav" | "audio/x-wav" | "audio/wave" => "wav",
        "audio/mpeg" | "audio/mp3" => "mp3",
        "audio/mp4" | "audio/m4a" | "audio/x-m4a" => "m4a",
        "audio/ogg" => "ogg",
        "audio/flac" | "audio/x-flac" => "flac",
        _ => "webm",
    }
}

#[async_trait]
impl<B: HttpBackend> SpeechTranscriber for OpenAiTranscriber<B> {
    async fn transcribe(&self, audio: &[u8], content_type: &str) -> Result<String, SpeechError> {
        if audio.is_empty() {
            return Err(SpeechError::InvalidInput("audio is empty".into()));
        }
        let request = ApiRequest::multipart(
            "audio/transcriptions",
            MultipartUpload {
                file_field: "file",
                file_name: format!("interruption.{}", extension_for(content_type)),
                content_type: content_type.to_string(),
                bytes: audio.to_vec(),
                fields: vec![("model", self.model.clone())],
            },
        );

        let response = self.backend.post_json(&request).await?;
        let text = response
            .get("text")
            .and_then(Value::as_str)
            .map(str::trim)
            .ok_or_else(|| BackendError::invalid("transcription response has no text"))?;
        if text.is_empty() {
            return Err(SpeechError::InvalidInput("no speech recognized in audio".into()));
        }
        debug!(bytes = audio.len(), chars = text.len(), "Audio transcribed");
        Ok(text.to_string())
    }
}
