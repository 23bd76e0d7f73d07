//! Session registry port.

use thiserror::Error;

use crate::domain::{Delivery, InterruptionSlot, RunId, Segment, Session, SessionId};

/// Errors from registry operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// No live session with this id (or not owned by the given run).
    #[error("session not found: {0}")]
    NotFound(SessionId),

    /// A session with this id is already registered.
    #[error("session already exists: {0}")]
    AlreadyExists(SessionId),

    /// The session's slot was retired while an offer was in flight.
    #[error("interruption slot for session {0} was retired")]
    SlotRetired(SessionId),
}

/// Map of live sessions. The only shared mutable state in the engine.
///
/// Every operation is atomic with respect to the others. Implementations
/// must not hold their lock across an `.await`; the trait is synchronous so
/// they cannot.
pub trait SessionRegistry: Send + Sync {
    /// Register a new session.
    fn create(&self, session: Session) -> Result<(), RegistryError>;

    /// Snapshot of a live session.
    fn get(&self, id: &SessionId) -> Result<Session, RegistryError>;

    /// Swap in a fresh interruption slot for the session owned by `run`.
    ///
    /// The old slot is retired; an interruption still pending in it is moved
    /// into the new slot rather than dropped.
    fn replace(
        &self,
        id: &SessionId,
        run: RunId,
        slot: InterruptionSlot,
    ) -> Result<(), RegistryError>;

    /// Offer an interruption to the session's current slot.
    fn deliver(&self, id: &SessionId, segment: Segment) -> Result<Delivery, RegistryError>;

    /// Remove a session regardless of which run owns it.
    fn remove(&self, id: &SessionId) -> Option<Session>;

    /// Remove a session only if it is still owned by `run`.
    fn remove_run(&self, id: &SessionId, run: RunId) -> bool;

    /// Number of live sessions.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
