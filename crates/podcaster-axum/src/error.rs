//! Axum-specific error types and mappings.
//!
//! Maps [`SessionError`] (via its [`ErrorKind`]) and multipart failures to
//! HTTP status codes and JSON bodies.

use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use podcaster_core::{DomainError, ErrorKind, SessionError};
use serde::Serialize;
use thiserror::Error;

/// Axum-specific error type.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request (invalid input).
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Conflict (another stream owns the session).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Service unavailable (a backend is down).
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
    status: u16,
}

impl HttpError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            Self::NotFound(msg)
            | Self::BadRequest(msg)
            | Self::Conflict(msg)
            | Self::ServiceUnavailable(msg)
            | Self::Internal(msg) => msg,
        };

        if status.is_server_error() {
            tracing::warn!(status = status.as_u16(), error = %message, "Request failed");
        }

        let body = ErrorBody {
            error: message,
            status: status.as_u16(),
        };

        (status, axum::Json(body)).into_response()
    }
}

impl From<SessionError> for HttpError {
    fn from(err: SessionError) -> Self {
        let message = err.to_string();
        match err.kind() {
            ErrorKind::SessionNotFound => Self::NotFound(message),
            ErrorKind::Protocol | ErrorKind::InvalidInput => Self::BadRequest(message),
            ErrorKind::Conflict => Self::Conflict(message),
            ErrorKind::Backend => Self::ServiceUnavailable(message),
            ErrorKind::Disconnected => Self::Internal(message),
        }
    }
}

impl From<DomainError> for HttpError {
    fn from(err: DomainError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl From<MultipartError> for HttpError {
    fn from(err: MultipartError) -> Self {
        Self::BadRequest(format!("invalid multipart body: {}", err.body_text()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use podcaster_core::{GenerationError, SessionId, SpeechError};

    fn id() -> SessionId {
        SessionId::parse("abc").unwrap()
    }

    #[test]
    fn session_errors_map_to_status_codes() {
        let cases = [
            (SessionError::SessionNotFound(id()), StatusCode::NOT_FOUND),
            (SessionError::InvalidInput("x".into()), StatusCode::BAD_REQUEST),
            (SessionError::Protocol("x".into()), StatusCode::BAD_REQUEST),
            (SessionError::AlreadyExists(id()), StatusCode::CONFLICT),
            (
                SessionError::Transcription(SpeechError::Unavailable("down".into())),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                SessionError::Generation(GenerationError::Unavailable("down".into())),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (SessionError::Cancelled, StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            assert_eq!(HttpError::from(err).status(), expected);
        }
    }

    #[tokio::test]
    async fn response_carries_json_body() {
        let response = HttpError::NotFound("gone".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.headers().get("content-type").unwrap(),
            "application/json"
        );

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "gone");
        assert_eq!(json["status"], 404);
    }
}
