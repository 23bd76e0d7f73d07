//! Subcommand definitions.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

/// Top-level subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the podcast web server
    Serve(ServeArgs),

    /// Print the built-in voice pool
    Voices,
}

/// Which capability backends to wire in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BackendKind {
    /// OpenAI-compatible chat, speech and transcription APIs
    Openai,
    /// Offline canned dialogue with silent audio
    Scripted,
}

/// Options for `podcaster serve`.
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Interface to bind
    #[arg(long, env = "PODCASTER_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to serve on
    #[arg(
        short,
        long,
        env = "PODCASTER_PORT",
        default_value_t = podcaster_axum::bootstrap::DEFAULT_PORT
    )]
    pub port: u16,

    /// Origin allowed to call the API with credentials (repeatable; none = allow all)
    #[arg(long = "allowed-origin", env = "PODCASTER_ALLOWED_ORIGINS", value_delimiter = ',')]
    pub allowed_origins: Vec<String>,

    /// Directory with built frontend assets to serve (SPA fallback to index.html)
    #[arg(long, env = "PODCASTER_STATIC_DIR")]
    pub static_dir: Option<PathBuf>,

    /// Backend for generation, speech and transcription
    #[arg(long, env = "PODCASTER_BACKEND", value_enum, default_value_t = BackendKind::Openai)]
    pub backend: BackendKind,

    /// Base URL of the OpenAI-compatible API
    #[arg(long, env = "OPENAI_API_BASE")]
    pub api_base: Option<String>,

    /// API key for the OpenAI-compatible API
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Chat model used to write the dialogue
    #[arg(long, env = "PODCASTER_CHAT_MODEL")]
    pub chat_model: Option<String>,

    /// Text-to-speech model
    #[arg(long, env = "PODCASTER_TTS_MODEL")]
    pub tts_model: Option<String>,

    /// Speech-to-text model for recorded questions
    #[arg(long, env = "PODCASTER_STT_MODEL")]
    pub stt_model: Option<String>,

    /// Voice pool, comma separated (default: the built-in pool)
    #[arg(long, env = "PODCASTER_VOICES", value_delimiter = ',')]
    pub voices: Vec<String>,

    /// Pause after each line of dialogue, in milliseconds
    #[arg(long, env = "PODCASTER_SEGMENT_PAUSE_MS", default_value_t = 3000)]
    pub segment_pause_ms: u64,

    /// Pause between uninterrupted batches, in milliseconds
    #[arg(long, env = "PODCASTER_BATCH_PAUSE_MS", default_value_t = 2000)]
    pub batch_pause_ms: u64,

    /// Stop each podcast after this many generation calls (0 for no limit)
    #[arg(long, env = "PODCASTER_MAX_BATCHES", default_value_t = 12)]
    pub max_batches: u32,

    /// Retries for transient backend failures
    #[arg(long, env = "PODCASTER_MAX_RETRIES", default_value_t = 3)]
    pub max_retries: u8,
}
