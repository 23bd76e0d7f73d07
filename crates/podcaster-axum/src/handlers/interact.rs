//! Listener interruption upload.

use axum::Json;
use axum::extract::{Multipart, State};
use podcaster_core::{Delivery, ListenerInput};
use serde::Serialize;
use tracing::info;

use crate::error::HttpError;
use crate::session::ListenerSession;
use crate::state::AppState;

/// Multipart field holding a recorded question.
pub const AUDIO_FIELD: &str = "audio_file";
/// Multipart field holding a typed question.
pub const TEXT_FIELD: &str = "user_interaction";

const DEFAULT_AUDIO_TYPE: &str = "application/octet-stream";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractResponse {
    pub message: &'static str,
    pub delivery: Delivery,
    /// The interruption as it will be echoed on the stream.
    pub text: String,
}

/// `POST /api/interact` - deliver a listener interruption.
///
/// Accepts `audio_file` (transcribed first) or `user_interaction`. When both
/// are present the audio wins.
pub async fn submit(
    ListenerSession(session_id): ListenerSession,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<InteractResponse>, HttpError> {
    let input = read_listener_input(multipart).await?;

    let receipt = state.interruptions.submit(&session_id, input).await?;

    info!(session_id = %session_id, delivery = ?receipt.delivery, "Interruption accepted");

    Ok(Json(InteractResponse {
        message: "Interruption received",
        delivery: receipt.delivery,
        text: receipt.text,
    }))
}

async fn read_listener_input(mut multipart: Multipart) -> Result<ListenerInput, HttpError> {
    let mut audio = None;
    let mut text = None;

    while let Some(field) = multipart.next_field().await? {
        match field.name() {
            Some(AUDIO_FIELD) => {
                let content_type = field
                    .content_type()
                    .unwrap_or(DEFAULT_AUDIO_TYPE)
                    .to_string();
                let bytes = field.bytes().await?;
                if !bytes.is_empty() {
                    audio = Some(ListenerInput::Audio {
                        bytes: bytes.to_vec(),
                        content_type,
                    });
                }
            }
            Some(TEXT_FIELD) => {
                let value = field.text().await?;
                if !value.trim().is_empty() {
                    text = Some(ListenerInput::Text(value));
                }
            }
            _ => {}
        }
    }

    audio.or(text).ok_or_else(|| {
        HttpError::BadRequest(format!(
            "expected a non-empty `{AUDIO_FIELD}` or `{TEXT_FIELD}` field"
        ))
    })
}
