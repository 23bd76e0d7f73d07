//! `podcaster serve` - turns options into configs and starts the server.

use std::time::Duration;

use anyhow::{Context, Result};
use podcaster_axum::{CorsConfig, ServerConfig, start_server};
use podcaster_backends::{Backends, OpenAiConfig};
use podcaster_core::{OrchestratorConfig, VoiceId};
use tracing::{info, warn};

use crate::commands::{BackendKind, ServeArgs};

impl ServeArgs {
    /// Session pacing and limits.
    pub fn orchestrator_config(&self) -> OrchestratorConfig {
        OrchestratorConfig::default()
            .with_segment_pause(Duration::from_millis(self.segment_pause_ms))
            .with_batch_pause(Duration::from_millis(self.batch_pause_ms))
            .with_max_batches((self.max_batches > 0).then_some(self.max_batches))
    }

    /// HTTP server settings.
    pub fn server_config(&self) -> ServerConfig {
        let cors = if self.allowed_origins.is_empty() {
            CorsConfig::AllowAll
        } else {
            CorsConfig::AllowOrigins(self.allowed_origins.clone())
        };

        let voices = self
            .voices
            .iter()
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(VoiceId::from)
            .collect();

        let mut config = ServerConfig::default()
            .with_host(self.host.clone())
            .with_port(self.port)
            .with_cors(cors)
            .with_session(self.orchestrator_config())
            .with_voices(voices);
        if let Some(ref dir) = self.static_dir {
            config = config.with_static_dir(dir.clone());
        }
        config
    }

    /// Settings for the OpenAI-compatible backends.
    pub fn openai_config(&self) -> OpenAiConfig {
        let mut config = OpenAiConfig::new()
            .with_api_key(self.api_key.clone())
            .with_max_retries(self.max_retries);
        if let Some(ref base) = self.api_base {
            config = config.with_api_base(base.clone());
        }
        if let Some(ref model) = self.chat_model {
            config = config.with_chat_model(model.clone());
        }
        if let Some(ref model) = self.tts_model {
            config = config.with_tts_model(model.clone());
        }
        if let Some(ref model) = self.stt_model {
            config = config.with_stt_model(model.clone());
        }
        config
    }

    /// Build the selected backends.
    pub fn backends(&self) -> Result<Backends> {
        match self.backend {
            BackendKind::Scripted => {
                info!("Using scripted backends (no network access)");
                Ok(Backends::scripted())
            }
            BackendKind::Openai => {
                if self.api_key.as_deref().is_none_or(|k| k.trim().is_empty()) {
                    warn!("No API key set; requests will be sent unauthenticated");
                }
                let config = self.openai_config();
                info!(
                    api_base = config.api_base(),
                    chat_model = config.chat_model(),
                    "Using OpenAI-compatible backends"
                );
                Backends::openai(&config).context("Failed to build HTTP backends")
            }
        }
    }
}

/// Run `podcaster serve` until Ctrl-C.
pub async fn execute(args: ServeArgs) -> Result<()> {
    let backends = args.backends()?;
    start_server(args.server_config(), backends).await
}
