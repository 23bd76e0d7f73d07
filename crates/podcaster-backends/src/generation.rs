//! Dialogue generation over `/chat/completions`.

use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use podcaster_core::{
    ConversationContext, GeneratedBatch, GenerationError, GenerationPort, LISTENER_SENTINEL, Role,
    Segment, Speaker,
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::config::OpenAiConfig;
use crate::error::{BackendError, BackendResult};
use crate::http::{ApiRequest, HttpBackend};

static SYSTEM_PROMPT: LazyLock<String> = LazyLock::new(|| {
    format!(
        "You write a short, fun and engaging podcast dialogue between two speakers \
         named 'Host' and 'Guest'. The first user message is the topic. \
         Reply with JSON only, shaped as \
         {{\"podcast\":[{{\"speaker\":\"Host\",\"text\":\"...\"}}],\"has_more\":false}}. \
         A user message whose text starts with '{sentinel}' means a listener interrupted \
         the show: continue the podcast by responding to that message, and never repeat \
         lines from earlier turns. Use no speakers other than 'Host' and 'Guest'. \
         Set has_more to true only when the conversation should go on with another \
         batch after this one, and prefer false once the topic is covered. \
         The same conversation may be sent again after a reply with has_more set: \
         then continue the discussion with new lines instead of restarting the \
         introduction.",
        sentinel = LISTENER_SENTINEL.trim_end()
    )
});

#[derive(Debug, Deserialize)]
struct RawSegment {
    speaker: String,
    text: String,
}

#[derive(Debug, Deserialize)]
struct PodcastPayload {
    #[serde(default)]
    podcast: Vec<RawSegment>,
    #[serde(default)]
    has_more: bool,
}

/// [`GenerationPort`] backed by an OpenAI-compatible chat completion endpoint
/// in JSON mode.
pub struct OpenAiGenerator<B: HttpBackend> {
    backend: Arc<B>,
    model: String,
    temperature: f32,
    top_p: f32,
    max_tokens: u32,
}

impl<B: HttpBackend> OpenAiGenerator<B> {
    pub fn new(backend: Arc<B>, config: &OpenAiConfig) -> Self {
        Self {
            backend,
            model: config.chat_model.clone(),
            temperature: config.temperature,
            top_p: config.top_p,
            max_tokens: config.max_tokens,
        }
    }

    fn build_request(&self, context: &ConversationContext) -> ApiRequest {
        let mut messages = Vec::with_capacity(context.len() + 1);
        messages.push(json!({ "role": "system", "content": SYSTEM_PROMPT.as_str() }));
        messages.extend(context.entries().iter().map(|entry| {
            let role = match entry.role {
                Role::Listener => "user",
                Role::Backend => "assistant",
            };
            json!({ "role": role, "content": entry.content })
        }));

        ApiRequest::json(
            "chat/completions",
            json!({
                "model": self.model,
                "messages": messages,
                "response_format": { "type": "json_object" },
                "temperature": self.temperature,
                "top_p": self.top_p,
                "max_tokens": self.max_tokens,
            }),
        )
    }
}

/// Pull the assistant message out of a chat completion response.
fn message_content(response: &Value) -> BackendResult<&str> {
    response
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .ok_or_else(|| BackendError::invalid("response has no choices[0].message.content"))
}

/// Strip a Markdown code fence some models wrap JSON in.
fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.trim_start_matches(|c: char| c.is_ascii_alphabetic());
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Parse the model's JSON into a validated batch.
///
/// Lines attributed to the listener and blank lines are dropped; any other
/// unknown speaker makes the whole batch invalid.
pub(crate) fn parse_batch(content: &str) -> BackendResult<GeneratedBatch> {
    let payload: PodcastPayload = serde_json::from_str(strip_code_fence(content))?;

    let mut segments = Vec::with_capacity(payload.podcast.len());
    for raw in payload.podcast {
        let speaker: Speaker = raw
            .speaker
            .parse()
            .map_err(|e: podcaster_core::DomainError| BackendError::invalid(e.to_string()))?;
        if speaker == Speaker::Listener {
            warn!(text = %raw.text, "Dropping listener line from generated batch");
            continue;
        }
        match Segment::new(speaker, raw.text) {
            Ok(segment) => segments.push(segment),
            Err(_) => debug!(%speaker, "Dropping blank generated line"),
        }
    }

    GeneratedBatch::new(segments, payload.has_more)
        .map_err(|e| BackendError::invalid(e.to_string()))
}

#[async_trait]
impl<B: HttpBackend> GenerationPort for OpenAiGenerator<B> {
    async fn generate(
        &self,
        context: &ConversationContext,
    ) -> Result<GeneratedBatch, GenerationError> {
        let request = self.build_request(context);
        let response = self.backend.post_json(&request).await?;
        let batch = parse_batch(message_content(&response)?)?;
        debug!(
            model = %self.model,
            segments = batch.len(),
            has_more = batch.has_more(),
            "Chat completion parsed"
        );
        Ok(batch)
    }
}
