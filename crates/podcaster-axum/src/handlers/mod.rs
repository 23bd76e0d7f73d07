//! HTTP handlers.
//!
//! Handlers are thin: they extract input, call a core service and map the
//! result. No podcast logic lives here.

pub mod interact;
pub mod podcast;
pub mod session;
pub mod status;
