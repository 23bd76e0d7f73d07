use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use thiserror::Error;
use tokio::sync::Notify;

use super::Segment;

/// Result of offering an interruption to a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Delivery {
    /// The slot was empty.
    Queued,
    /// An earlier, not yet consumed interruption was overwritten.
    Replaced,
}

/// The slot was retired before the offer landed. Carries the segment back so
/// the caller can re-resolve the current slot and try again.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("interruption slot has been retired")]
pub struct SlotRetired(pub Segment);

#[derive(Default)]
struct SlotState {
    pending: Option<Segment>,
    retired: bool,
}

#[derive(Default)]
struct SlotInner {
    state: Mutex<SlotState>,
    offered: Notify,
}

/// Single-capacity interruption mailbox for one session.
///
/// Writers overwrite (last write wins); the session task drains it with a
/// non-blocking [`try_take`](Self::try_take) at segment boundaries. Each
/// interruption cycle installs a fresh slot and retires the old one.
#[derive(Clone, Default)]
pub struct InterruptionSlot {
    inner: Arc<SlotInner>,
}

impl InterruptionSlot {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, SlotState> {
        // Slot state is a plain Option + flag; a poisoned lock leaves it valid.
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Store an interruption, replacing any pending one.
    pub fn offer(&self, segment: Segment) -> Result<Delivery, SlotRetired> {
        let delivery = {
            let mut state = self.state();
            if state.retired {
                return Err(SlotRetired(segment));
            }
            if state.pending.replace(segment).is_some() {
                Delivery::Replaced
            } else {
                Delivery::Queued
            }
        };
        self.inner.offered.notify_waiters();
        Ok(delivery)
    }

    /// Take the pending interruption without waiting.
    pub fn try_take(&self) -> Option<Segment> {
        self.state().pending.take()
    }

    pub fn has_pending(&self) -> bool {
        self.state().pending.is_some()
    }

    pub fn is_retired(&self) -> bool {
        self.state().retired
    }

    /// Refuse further offers and hand back whatever was still pending.
    pub fn retire(&self) -> Option<Segment> {
        let mut state = self.state();
        state.retired = true;
        state.pending.take()
    }

    /// Resolve once an interruption is pending.
    ///
    /// Returns immediately if one is already waiting. Never resolves for a
    /// retired slot that stays empty.
    pub async fn pending(&self) {
        loop {
            let notified = self.inner.offered.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if self.has_pending() {
                return;
            }
            notified.await;
        }
    }
}

impl fmt::Debug for InterruptionSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state();
        f.debug_struct("InterruptionSlot")
            .field("pending", &state.pending.is_some())
            .field("retired", &state.retired)
            .finish()
    }
}
