//! Route definitions and router construction.

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, Method};
use axum::routing::{get, post};
use std::path::Path;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::bootstrap::{AxumContext, CorsConfig};
use crate::handlers;
use crate::state::AppState;

/// Build CORS layer from configuration.
///
/// Explicit origins get credentials so the session cookie is sent; the
/// wildcard mode cannot carry credentials.
fn build_cors_layer(config: &CorsConfig) -> CorsLayer {
    match config {
        CorsConfig::AllowAll => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
        CorsConfig::AllowOrigins(origins) => {
            let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
            CorsLayer::new()
                .allow_origin(allowed)
                .allow_credentials(true)
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers([CONTENT_TYPE])
        }
    }
}

/// Build all API routes without `/api` prefix (for nesting under /api).
pub(crate) fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/session", get(handlers::session::issue))
        .route("/podcast", get(handlers::podcast::stream))
        .route("/interact", post(handlers::interact::submit))
        .route("/status", get(handlers::status::get))
}

/// Create the main router with API routes under `/api` and `/health`.
pub fn create_router(ctx: AxumContext, cors_config: &CorsConfig) -> Router {
    let upload_limit = ctx.max_upload_bytes;
    let state: AppState = Arc::new(ctx);
    let cors = build_cors_layer(cors_config);

    Router::new()
        .route("/health", get(health_check))
        .nest(
            "/api",
            api_routes()
                .with_state(state)
                .layer(DefaultBodyLimit::max(upload_limit))
                .layer(cors),
        )
        .layer(TraceLayer::new_for_http())
}

/// Create a router with API routes and static asset serving.
///
/// Unmatched paths fall back to `index.html` so the client can route.
pub fn create_spa_router<P: AsRef<Path>>(
    ctx: AxumContext,
    static_dir: P,
    cors_config: &CorsConfig,
) -> Router {
    let static_path = static_dir.as_ref();
    let index_path = static_path.join("index.html");

    let serve_dir = ServeDir::new(static_path).fallback(ServeFile::new(&index_path));

    create_router(ctx, cors_config).fallback_service(serve_dir)
}

/// Health check endpoint.
pub(crate) async fn health_check() -> &'static str {
    "OK"
}
