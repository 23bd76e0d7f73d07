//! Test constants for podcaster-axum tests.

/// Origin allowed by the credentialed CORS tests.
#[allow(dead_code)]
pub const TEST_CORS_ORIGIN: &str = "http://localhost:5173";

/// Loopback address the stream tests bind to (port chosen by the OS).
#[allow(dead_code)]
pub const TEST_BIND_ADDR: &str = "127.0.0.1:0";
