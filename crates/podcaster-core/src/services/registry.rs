use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::debug;

use crate::domain::{Delivery, InterruptionSlot, RunId, Segment, Session, SessionId};
use crate::ports::{RegistryError, SessionRegistry};

/// Process-local [`SessionRegistry`] backed by a single mutex.
#[derive(Debug, Default)]
pub struct InMemorySessionRegistry {
    sessions: Mutex<HashMap<SessionId, Session>>,
}

impl InMemorySessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn sessions(&self) -> MutexGuard<'_, HashMap<SessionId, Session>> {
        // Every mutation below is a single map operation, so a panic while
        // holding the lock cannot leave a half-applied update behind.
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl SessionRegistry for InMemorySessionRegistry {
    fn create(&self, session: Session) -> Result<(), RegistryError> {
        let mut sessions = self.sessions();
        if sessions.contains_key(&session.id) {
            return Err(RegistryError::AlreadyExists(session.id));
        }
        debug!(session_id = %session.id, run = %session.run, "Session registered");
        sessions.insert(session.id.clone(), session);
        Ok(())
    }

    fn get(&self, id: &SessionId) -> Result<Session, RegistryError> {
        self.sessions()
            .get(id)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(id.clone()))
    }

    fn replace(
        &self,
        id: &SessionId,
        run: RunId,
        slot: InterruptionSlot,
    ) -> Result<(), RegistryError> {
        let mut sessions = self.sessions();
        let session = sessions
            .get_mut(id)
            .filter(|s| s.run == run)
            .ok_or_else(|| RegistryError::NotFound(id.clone()))?;

        if let Some(carried) = session.slot.retire() {
            debug!(session_id = %id, "Carrying pending interruption into new slot");
            // Fresh slot, not yet shared with anyone: the offer cannot fail.
            let _ = slot.offer(carried);
        }
        session.slot = slot;
        Ok(())
    }

    fn deliver(&self, id: &SessionId, segment: Segment) -> Result<Delivery, RegistryError> {
        let sessions = self.sessions();
        let session = sessions
            .get(id)
            .ok_or_else(|| RegistryError::NotFound(id.clone()))?;
        session
            .slot
            .offer(segment)
            .map_err(|_| RegistryError::SlotRetired(id.clone()))
    }

    fn remove(&self, id: &SessionId) -> Option<Session> {
        self.sessions().remove(id)
    }

    fn remove_run(&self, id: &SessionId, run: RunId) -> bool {
        let mut sessions = self.sessions();
        if sessions.get(id).is_some_and(|s| s.run == run) {
            sessions.remove(id);
            true
        } else {
            false
        }
    }

    fn len(&self) -> usize {
        self.sessions().len()
    }
}
