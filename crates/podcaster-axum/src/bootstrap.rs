//! Axum server bootstrap - the composition root.
//!
//! This module is the ONLY place where the backends, the session registry
//! and the orchestrator are wired together for the web adapter.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use podcaster_backends::Backends;
use podcaster_core::{
    DEFAULT_VOICES, InMemorySessionRegistry, InterruptionService, OrchestratorConfig,
    SessionOrchestrator, SessionRegistry, VoiceAssigner, VoiceId,
};
use tokio_util::sync::CancellationToken;

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 8000;
/// Default upper bound for an interruption upload.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// CORS configuration for the web server.
#[derive(Debug, Clone, Default)]
pub enum CorsConfig {
    /// Allow all origins (development mode). Cookies are not sent cross-origin
    /// in this mode; clients pass `?session=` instead.
    #[default]
    AllowAll,
    /// Allow specific origins with credentials (production mode).
    AllowOrigins(Vec<String>),
}

/// Server configuration for the Axum adapter.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Interface to bind.
    pub host: String,
    /// Port for the HTTP server.
    pub port: u16,
    /// Optional path to static assets for SPA serving.
    pub static_dir: Option<PathBuf>,
    /// CORS configuration.
    pub cors: CorsConfig,
    /// Pacing and limits for every session.
    pub session: OrchestratorConfig,
    /// Voice pool; empty means the built-in pool.
    pub voices: Vec<VoiceId>,
    /// Request body limit for `/api/interact`.
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            static_dir: None,
            cors: CorsConfig::default(),
            session: OrchestratorConfig::default(),
            voices: Vec::new(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl ServerConfig {
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    #[must_use]
    pub const fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the static directory for SPA serving.
    #[must_use]
    pub fn with_static_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.static_dir = Some(path.into());
        self
    }

    /// Set CORS configuration.
    #[must_use]
    pub fn with_cors(mut self, cors: CorsConfig) -> Self {
        self.cors = cors;
        self
    }

    #[must_use]
    pub fn with_session(mut self, session: OrchestratorConfig) -> Self {
        self.session = session;
        self
    }

    #[must_use]
    pub fn with_voices(mut self, voices: Vec<VoiceId>) -> Self {
        self.voices = voices;
        self
    }

    #[must_use]
    pub const fn with_max_upload_bytes(mut self, bytes: usize) -> Self {
        self.max_upload_bytes = bytes;
        self
    }

    fn voice_pool(&self) -> Vec<VoiceId> {
        if self.voices.is_empty() {
            DEFAULT_VOICES.iter().copied().map(VoiceId::from).collect()
        } else {
            self.voices.clone()
        }
    }
}

/// Context containing all services needed by handlers.
pub struct AxumContext {
    /// Drives one podcast per WebSocket connection.
    pub orchestrator: SessionOrchestrator,
    /// Accepts out-of-band listener interruptions.
    pub interruptions: InterruptionService,
    /// Live sessions, shared by the two services above.
    pub registry: Arc<dyn SessionRegistry>,
    /// Parent of every session's cancellation token.
    pub shutdown: CancellationToken,
    /// Request body limit for uploads.
    pub max_upload_bytes: usize,
}

/// Bootstrap the Axum context with all services wired.
///
/// Fails if the configured voice pool is unusable (fewer than two voices or
/// duplicates).
pub fn bootstrap(config: &ServerConfig, backends: Backends) -> Result<AxumContext> {
    let voices = VoiceAssigner::new(config.voice_pool()).context("Invalid voice pool")?;
    let registry: Arc<dyn SessionRegistry> = Arc::new(InMemorySessionRegistry::new());

    let orchestrator = SessionOrchestrator::new(
        backends.generator,
        backends.synthesizer,
        Arc::clone(&registry),
        voices,
        config.session.clone(),
    );
    let interruptions = InterruptionService::new(Arc::clone(&registry), backends.transcriber);

    Ok(AxumContext {
        orchestrator,
        interruptions,
        registry,
        shutdown: CancellationToken::new(),
        max_upload_bytes: config.max_upload_bytes,
    })
}

/// Start the Axum server with the given configuration.
///
/// Runs until Ctrl-C; live sessions are cancelled before the listener
/// stops accepting connections.
pub async fn start_server(config: ServerConfig, backends: Backends) -> Result<()> {
    use tokio::net::TcpListener;
    use tracing::info;

    let ctx = bootstrap(&config, backends)?;
    let shutdown = ctx.shutdown.clone();

    let app = if let Some(ref static_dir) = config.static_dir {
        info!("Serving static assets from: {}", static_dir.display());
        crate::routes::create_spa_router(ctx, static_dir, &config.cors)
    } else {
        crate::routes::create_router(ctx, &config.cors)
    };

    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!(
        segment_pause_ms = duration_ms(config.session.segment_pause),
        batch_pause_ms = duration_ms(config.session.batch_pause),
        "podcaster listening on http://{}",
        addr
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal(shutdown: CancellationToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        return;
    }
    tracing::info!("Shutdown requested, cancelling live sessions");
    shutdown.cancel();
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_pool_is_used_when_none_configured() {
        let ctx = bootstrap(&ServerConfig::default(), Backends::scripted()).unwrap();
        assert_eq!(ctx.orchestrator.voices().pool().len(), DEFAULT_VOICES.len());
        assert!(ctx.registry.is_empty());
    }

    #[test]
    fn single_voice_pool_is_rejected() {
        let config = ServerConfig::default().with_voices(vec![VoiceId::from("alloy")]);
        assert!(bootstrap(&config, Backends::scripted()).is_err());
    }

    #[test]
    fn builders_override_defaults() {
        let config = ServerConfig::default()
            .with_host("127.0.0.1")
            .with_port(9000)
            .with_max_upload_bytes(1024)
            .with_cors(CorsConfig::AllowOrigins(vec!["http://localhost:5173".into()]));

        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 9000);
        assert_eq!(config.max_upload_bytes, 1024);
        assert!(matches!(config.cors, CorsConfig::AllowOrigins(ref o) if o.len() == 1));
    }
}
