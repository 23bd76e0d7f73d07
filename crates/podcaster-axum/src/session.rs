//! Session id transport between browser and server.
//!
//! The id travels in the `podcaster_session` cookie. A `session` query
//! parameter is accepted as a fallback for clients that cannot send cookies
//! (cross-origin development, WebSocket clients outside the browser).

use axum::extract::{FromRequestParts, Query};
use axum::http::header::COOKIE;
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderValue};
use podcaster_core::SessionId;
use serde::Deserialize;

use crate::error::HttpError;

/// Cookie carrying the session id.
pub const SESSION_COOKIE: &str = "podcaster_session";
/// Cookie lifetime.
pub const SESSION_COOKIE_MAX_AGE_SECS: u64 = 24 * 60 * 60;

#[derive(Debug, Default, Deserialize)]
struct SessionQuery {
    session: Option<String>,
}

/// Session id required by a handler.
///
/// Rejects with 400 when neither the cookie nor the query parameter is
/// present, or when the id is malformed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerSession(pub SessionId);

impl<S> FromRequestParts<S> for ListenerSession
where
    S: Send + Sync,
{
    type Rejection = HttpError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = cookie_value(&parts.headers, SESSION_COOKIE).or_else(|| {
            Query::<SessionQuery>::try_from_uri(&parts.uri)
                .ok()
                .and_then(|Query(q)| q.session)
        });

        let Some(raw) = raw else {
            return Err(HttpError::BadRequest(
                "no session id; call GET /api/session first".to_string(),
            ));
        };

        SessionId::parse(raw.trim())
            .map(Self)
            .map_err(HttpError::from)
    }
}

/// Value of the first cookie named `name` across all `Cookie` headers.
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim_matches('"').to_string())
}

/// `Set-Cookie` value for a session id.
pub fn session_cookie(id: &SessionId) -> Result<HeaderValue, HttpError> {
    let cookie = format!(
        "{SESSION_COOKIE}={id}; Path=/; HttpOnly; SameSite=Lax; Max-Age={SESSION_COOKIE_MAX_AGE_SECS}"
    );
    HeaderValue::from_str(&cookie).map_err(|e| HttpError::Internal(e.to_string()))
}
