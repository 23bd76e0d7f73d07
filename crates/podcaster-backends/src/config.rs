//! Configuration for the OpenAI-compatible backends.

use std::time::Duration;

/// Configuration shared by the generation, synthesis and transcription
/// adapters.
///
/// # Example
///
/// ```
/// use podcaster_backends::OpenAiConfig;
/// use std::time::Duration;
///
/// let config = OpenAiConfig::new()
///     .with_api_base("http://localhost:8080/v1")
///     .with_timeout(Duration::from_secs(120));
/// ```
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// Base URL including the version prefix, e.g. `https://api.openai.com/v1`
    pub(crate) api_base: String,
    /// Bearer token, if the server wants one
    pub(crate) api_key: Option<String>,
    /// Model for `/chat/completions`
    pub(crate) chat_model: String,
    /// Model for `/audio/speech`
    pub(crate) tts_model: String,
    /// Audio container requested from `/audio/speech`
    pub(crate) tts_format: String,
    /// Model for `/audio/transcriptions`
    pub(crate) stt_model: String,
    /// Sampling temperature for generation
    pub(crate) temperature: f32,
    /// Nucleus sampling for generation
    pub(crate) top_p: f32,
    /// Token ceiling for one generated batch
    pub(crate) max_tokens: u32,
    /// User agent string for HTTP requests
    pub(crate) user_agent: String,
    /// Request timeout
    pub(crate) timeout: Duration,
    /// Maximum number of retry attempts for transient errors
    pub(crate) max_retries: u8,
    /// Base delay for exponential backoff
    pub(crate) retry_base_delay: Duration,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.openai.com/v1".to_string(),
            api_key: None,
            chat_model: "gpt-4o-mini".to_string(),
            tts_model: "tts-1".to_string(),
            tts_format: "mp3".to_string(),
            stt_model: "whisper-1".to_string(),
            temperature: 1.0,
            top_p: 0.95,
            max_tokens: 8192,
            user_agent: concat!("podcaster/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout: Duration::from_secs(60),
            max_retries: 3,
            retry_base_delay: Duration::from_millis(500),
        }
    }
}

impl OpenAiConfig {
    /// Create a new configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the API base URL.
    ///
    /// Defaults to `https://api.openai.com/v1`.
    #[must_use]
    pub fn with_api_base(mut self, url: impl Into<String>) -> Self {
        self.api_base = url.into();
        self
    }

    /// Set an optional bearer token.
    #[must_use]
    pub fn with_api_key(mut self, key: Option<String>) -> Self {
        self.api_key = key.filter(|k| !k.trim().is_empty());
        self
    }

    #[must_use]
    pub fn with_chat_model(mut self, model: impl Into<String>) -> Self {
        self.chat_model = model.into();
        self
    }

    #[must_use]
    pub fn with_tts_model(mut self, model: impl Into<String>) -> Self {
        self.tts_model = model.into();
        self
    }

    /// Set the audio container requested from the speech endpoint
    /// (`mp3`, `wav`, `opus`, ...).
    #[must_use]
    pub fn with_tts_format(mut self, format: impl Into<String>) -> Self {
        self.tts_format = format.into();
        self
    }

    #[must_use]
    pub fn with_stt_model(mut self, model: impl Into<String>) -> Self {
        self.stt_model = model.into();
        self
    }

    #[must_use]
    pub const fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the request timeout.
    ///
    /// Defaults to 60 seconds.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the maximum number of retry attempts for transient errors.
    ///
    /// Defaults to 3 retries.
    #[must_use]
    pub const fn with_max_retries(mut self, retries: u8) -> Self {
        self.max_retries = retries;
        self
    }

    /// Set the base delay for exponential backoff retries.
    ///
    /// Defaults to 500ms.
    #[must_use]
    pub const fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_base_delay = delay;
        self
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    pub fn chat_model(&self) -> &str {
        &self.chat_model
    }
}
