#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

mod config;
mod error;
mod generation;
mod http;
mod scripted;
mod speech;

use std::sync::Arc;

use podcaster_core::{GenerationPort, SpeechSynthesizer, SpeechTranscriber};

// ============================================================================
// Public API
// ============================================================================

pub use config::OpenAiConfig;
pub use error::{BackendError, BackendResult};
pub use generation::OpenAiGenerator;
pub use http::{ApiRequest, HttpBackend, MultipartUpload, RequestBody, ReqwestBackend};
pub use scripted::{PlaceholderTranscriber, ScriptedGenerator, SilentSynthesizer};
pub use speech::{OpenAiSynthesizer, OpenAiTranscriber};

/// The three capability adapters the server needs, behind their ports.
#[derive(Clone)]
pub struct Backends {
    pub generator: Arc<dyn GenerationPort>,
    pub synthesizer: Arc<dyn SpeechSynthesizer>,
    pub transcriber: Arc<dyn SpeechTranscriber>,
}

impl Backends {
    /// Offline backends: scripted dialogue, silent audio, fixed transcript.
    pub fn scripted() -> Self {
        Self {
            generator: Arc::new(ScriptedGenerator::new()),
            synthesizer: Arc::new(SilentSynthesizer::new()),
            transcriber: Arc::new(PlaceholderTranscriber::default()),
        }
    }

    /// OpenAI-compatible backends sharing one HTTP client.
    pub fn openai(config: &OpenAiConfig) -> BackendResult<Self> {
        let http = Arc::new(ReqwestBackend::new(config)?);
        Ok(Self {
            generator: Arc::new(OpenAiGenerator::new(Arc::clone(&http), config)),
            synthesizer: Arc::new(OpenAiSynthesizer::new(Arc::clone(&http), config)),
            transcriber: Arc::new(OpenAiTranscriber::new(http, config)),
        })
    }
}
