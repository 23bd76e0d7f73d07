//! Integration tests for the HTTP routes.
//!
//! Uses the scripted backends so no network access is needed. Live sessions
//! are inserted straight into the registry; the WebSocket path is covered in
//! `podcast_stream.rs`.

mod common;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use podcaster_backends::Backends;
use podcaster_core::{RunId, Session, SessionId, SessionRegistry};
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

use common::ports::TEST_CORS_ORIGIN;
use podcaster_axum::bootstrap::{CorsConfig, ServerConfig, bootstrap};
use podcaster_axum::routes::create_router;

const BOUNDARY: &str = "podcaster-test-boundary";

// ── Helpers ───────────────────────────────────────────────────────────────────

fn test_app(cors: CorsConfig) -> (axum::Router, Arc<dyn SessionRegistry>, Session) {
    let ctx = bootstrap(&ServerConfig::default(), Backends::scripted()).expect("bootstrap");
    let registry = Arc::clone(&ctx.registry);
    let session = Session::new(
        SessionId::generate(),
        RunId::new(),
        "Rust",
        ctx.orchestrator.voices().assign(),
        CancellationToken::new(),
    );
    (create_router(ctx, &cors), registry, session)
}

/// Assert the response body is valid JSON and return the parsed value.
async fn parse_json(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap_or_else(|e| panic!("Expected valid JSON body: {e}"))
}

/// Assert a response has `application/json` content-type.
fn assert_json_content_type(response: &axum::response::Response) {
    let ct = response
        .headers()
        .get("content-type")
        .map(|v| v.to_str().unwrap_or(""))
        .unwrap_or("");
    assert!(
        ct.starts_with("application/json"),
        "Expected application/json content-type, got: {ct}"
    );
}

/// `(name, filename, content type, bytes)` per part.
fn multipart_body(parts: &[(&str, Option<&str>, Option<&str>, &[u8])]) -> Body {
    let mut body = Vec::new();
    for (name, filename, content_type, bytes) in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        let disposition = match filename {
            Some(file) => format!(
                "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file}\"\r\n"
            ),
            None => format!("Content-Disposition: form-data; name=\"{name}\"\r\n"),
        };
        body.extend_from_slice(disposition.as_bytes());
        if let Some(ct) = content_type {
            body.extend_from_slice(format!("Content-Type: {ct}\r\n").as_bytes());
        }
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    Body::from(body)
}

fn interact_request(cookie: Option<&str>, body: Body) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/interact")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        );
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(body).unwrap()
}

fn text_interaction(text: &str) -> Body {
    multipart_body(&[("user_interaction", None, None, text.as_bytes())])
}

// ── GET /health ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn health_returns_ok() {
    let (app, _, _) = test_app(CorsConfig::AllowAll);

    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b"OK");
}

// ── GET /api/session ──────────────────────────────────────────────────────────

#[tokio::test]
async fn session_issues_http_only_cookie() {
    let (app, _, _) = test_app(CorsConfig::AllowAll);

    let response = app
        .oneshot(Request::get("/api/session").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_json_content_type(&response);

    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("Set-Cookie header")
        .to_str()
        .unwrap()
        .to_string();
    assert!(cookie.starts_with("podcaster_session="));
    assert!(cookie.contains("HttpOnly"));

    let json = parse_json(response).await;
    let id = json["sessionId"].as_str().expect("sessionId string");
    assert!(cookie.contains(id));
    assert_eq!(json["message"], "Session created");
}

#[tokio::test]
async fn session_keeps_existing_cookie() {
    let (app, _, _) = test_app(CorsConfig::AllowAll);

    let response = app
        .oneshot(
            Request::get("/api/session")
                .header(header::COOKIE, "podcaster_session=returning-listener")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let json = parse_json(response).await;
    assert_eq!(json["sessionId"], "returning-listener");
    assert_eq!(json["message"], "Session resumed");
}

// ── GET /api/podcast ──────────────────────────────────────────────────────────

#[tokio::test]
async fn podcast_without_session_is_bad_request() {
    let (app, _, _) = test_app(CorsConfig::AllowAll);

    let response = app
        .oneshot(Request::get("/api/podcast").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ── POST /api/interact ────────────────────────────────────────────────────────

#[tokio::test]
async fn interact_without_session_is_bad_request() {
    let (app, _, _) = test_app(CorsConfig::AllowAll);

    let response = app
        .oneshot(interact_request(None, text_interaction("hello?")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_json_content_type(&response);
    let json = parse_json(response).await;
    assert_eq!(json["status"], 400);
}

#[tokio::test]
async fn interact_with_unknown_session_is_not_found() {
    let (app, registry, _) = test_app(CorsConfig::AllowAll);

    let response = app
        .oneshot(interact_request(
            Some("podcaster_session=nobody-here"),
            text_interaction("hello?"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(registry.is_empty());
}

#[tokio::test]
async fn interact_text_is_queued_for_live_session() {
    let (app, registry, session) = test_app(CorsConfig::AllowAll);
    let id = session.id.clone();
    registry.create(session).unwrap();
    let cookie = format!("podcaster_session={id}");

    let response = app
        .clone()
        .oneshot(interact_request(Some(&cookie), text_interaction("What about lifetimes?")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = parse_json(response).await;
    assert_eq!(json["delivery"], "queued");
    assert_eq!(json["text"], "What about lifetimes?");
    assert!(registry.get(&id).unwrap().slot.has_pending());

    let response = app
        .oneshot(interact_request(Some(&cookie), text_interaction("Actually, traits?")))
        .await
        .unwrap();
    let json = parse_json(response).await;
    assert_eq!(json["delivery"], "replaced");
}

#[tokio::test]
async fn interact_accepts_session_query_parameter() {
    let (app, registry, session) = test_app(CorsConfig::AllowAll);
    let id = session.id.clone();
    registry.create(session).unwrap();

    let request = Request::builder()
        .method("POST")
        .uri(format!("/api/interact?session={id}"))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(text_interaction("Query works?"))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn interact_audio_is_transcribed() {
    let (app, registry, session) = test_app(CorsConfig::AllowAll);
    let id = session.id.clone();
    registry.create(session).unwrap();
    let cookie = format!("podcaster_session={id}");

    let body = multipart_body(&[(
        "audio_file",
        Some("question.webm"),
        Some("audio/webm"),
        b"not really audio",
    )]);
    let response = app
        .oneshot(interact_request(Some(&cookie), body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = parse_json(response).await;
    assert_eq!(json["text"], "Can you tell us more about that?");
    assert!(registry.get(&id).unwrap().slot.has_pending());
}

#[tokio::test]
async fn interact_without_input_is_bad_request() {
    let (app, registry, session) = test_app(CorsConfig::AllowAll);
    let id = session.id.clone();
    registry.create(session).unwrap();
    let cookie = format!("podcaster_session={id}");

    let body = multipart_body(&[("user_interaction", None, None, b"   ")]);
    let response = app
        .oneshot(interact_request(Some(&cookie), body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(!registry.get(&id).unwrap().slot.has_pending());
}

// ── GET /api/status ───────────────────────────────────────────────────────────

#[tokio::test]
async fn status_reports_sessions_and_voices() {
    let (app, registry, session) = test_app(CorsConfig::AllowAll);
    registry.create(session).unwrap();

    let response = app
        .oneshot(Request::get("/api/status").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_json_content_type(&response);
    let json = parse_json(response).await;
    assert_eq!(json["activeSessions"], 1);
    assert_eq!(json["voicePool"].as_array().map(Vec::len), Some(6));
    assert_eq!(json["segmentPauseMs"], 3000);
}

// ── CORS ──────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn explicit_origins_allow_credentials() {
    let (app, _, _) = test_app(CorsConfig::AllowOrigins(vec![TEST_CORS_ORIGIN.to_string()]));

    let response = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/api/interact")
                .header(header::ORIGIN, TEST_CORS_ORIGIN)
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let headers = response.headers();
    assert_eq!(
        headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        TEST_CORS_ORIGIN
    );
    assert_eq!(
        headers.get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).unwrap(),
        "true"
    );
}
