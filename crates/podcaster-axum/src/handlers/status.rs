//! Server status.

use axum::Json;
use axum::extract::State;
use podcaster_core::VoiceId;
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub active_sessions: usize,
    pub voice_pool: Vec<VoiceId>,
    pub segment_pause_ms: u128,
    pub batch_pause_ms: u128,
    pub max_batches: Option<u32>,
}

/// `GET /api/status` - live session count and pacing.
pub async fn get(State(state): State<AppState>) -> Json<StatusResponse> {
    let config = state.orchestrator.config();
    Json(StatusResponse {
        active_sessions: state.registry.len(),
        voice_pool: state.orchestrator.voices().pool().to_vec(),
        segment_pause_ms: config.segment_pause.as_millis(),
        batch_pause_ms: config.batch_pause.as_millis(),
        max_batches: config.max_batches,
    })
}
