//! Session id issuance.

use axum::Json;
use axum::http::HeaderMap;
use axum::http::header::SET_COOKIE;
use axum::response::IntoResponse;
use podcaster_core::SessionId;
use serde::Serialize;
use tracing::debug;

use crate::error::HttpError;
use crate::session::{SESSION_COOKIE, cookie_value, session_cookie};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub message: &'static str,
    pub session_id: SessionId,
}

/// `GET /api/session` - issue a session id cookie.
///
/// A valid id already held by the client is kept, so reloading the page
/// does not orphan a running podcast.
pub async fn issue(headers: HeaderMap) -> Result<impl IntoResponse, HttpError> {
    let existing =
        cookie_value(&headers, SESSION_COOKIE).and_then(|raw| SessionId::parse(&raw).ok());

    let (session_id, message) = match existing {
        Some(id) => (id, "Session resumed"),
        None => {
            let id = SessionId::generate();
            debug!(session_id = %id, "Issued new session id");
            (id, "Session created")
        }
    };

    let cookie = session_cookie(&session_id)?;
    Ok((
        [(SET_COOKIE, cookie)],
        Json(SessionResponse {
            message,
            session_id,
        }),
    ))
}
