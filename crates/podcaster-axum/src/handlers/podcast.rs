//! WebSocket endpoint for the podcast stream.
//!
//! `GET /api/podcast` upgrades the connection and hands it to the session
//! orchestrator. See [`crate::ws_transport`] for the frame mapping.
//!
//! ## Lifecycle
//!
//! 1. The session id is resolved before the upgrade; without one the
//!    request is rejected with 400.
//! 2. The socket is split. The ingest task owns the receive half and feeds
//!    inbound text to the transport.
//! 3. The orchestrator runs the session on the send half until it finishes,
//!    fails, or the ingest task cancels it on disconnect.
//! 4. The ingest task is aborted once the session has ended.

use axum::extract::State;
use axum::extract::ws::{WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures_util::StreamExt;
use podcaster_core::SessionId;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::session::ListenerSession;
use crate::state::AppState;
use crate::ws_transport::{INBOUND_CAPACITY, WebSocketTransport, forward_inbound};

/// `GET /api/podcast` - WebSocket upgrade for one podcast session.
pub async fn stream(
    ListenerSession(session_id): ListenerSession,
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_podcast_ws(socket, state, session_id))
}

async fn handle_podcast_ws(socket: WebSocket, state: AppState, session_id: SessionId) {
    let cancel = state.shutdown.child_token();
    let (ws_sender, ws_receiver) = socket.split();
    let (inbound_tx, inbound_rx) = mpsc::channel(INBOUND_CAPACITY);

    let ingest = tokio::spawn(forward_inbound(ws_receiver, inbound_tx, cancel.clone()));

    info!(session_id = %session_id, "Podcast stream opened");

    let mut transport = WebSocketTransport::new(ws_sender, inbound_rx);
    let result = state
        .orchestrator
        .run(session_id.clone(), &mut transport, cancel)
        .await;

    ingest.abort();

    match result {
        Ok(summary) => debug!(
            session_id = %session_id,
            batches = summary.batches,
            interruptions = summary.interruptions,
            "Podcast stream closed"
        ),
        Err(e) if e.is_disconnect() => debug!(session_id = %session_id, "Listener disconnected"),
        Err(e) => warn!(session_id = %session_id, error = %e, "Podcast stream ended with error"),
    }
}
