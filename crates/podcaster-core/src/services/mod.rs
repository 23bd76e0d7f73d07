//! Session engine services.
//!
//! Services depend only on ports and domain types, so every piece here can be
//! driven in tests with in-memory fakes.

mod interruption;
mod orchestrator;
mod player;
mod registry;
mod voices;

use std::future::Future;

use tokio_util::sync::CancellationToken;

use crate::error::SessionError;

pub use interruption::{InterruptionReceipt, InterruptionService, ListenerInput};
pub use orchestrator::{OrchestratorConfig, SessionOrchestrator, SessionState, SessionSummary};
pub use player::{PlayOutcome, TurnPlayer};
pub use registry::InMemorySessionRegistry;
pub use voices::{DEFAULT_VOICES, VoiceAssigner};

/// Run `fut` unless `cancel` fires first.
async fn until_cancelled<F: Future>(
    cancel: &CancellationToken,
    fut: F,
) -> Result<F::Output, SessionError> {
    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(SessionError::Cancelled),
        output = fut => Ok(output),
    }
}
