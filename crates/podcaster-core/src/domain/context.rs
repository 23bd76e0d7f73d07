use serde::Serialize;

use super::{DomainError, Segment, Transcript};

/// Author of a context entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Topic or interruption supplied by the listener.
    Listener,
    /// Dialogue previously produced by the generation backend.
    Backend,
}

/// One role-tagged entry of the conversation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContextEntry {
    pub role: Role,
    pub content: String,
}

/// Role-tagged history handed to the generation backend.
///
/// Entry 0 is always the listener's topic. After that, entries alternate
/// between a backend turn (the transcript actually played) and a listener
/// turn (the interruption that cut it short). A context is never mutated in
/// place: [`ConversationContext::with_interruption`] returns a new value two
/// entries longer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversationContext {
    entries: Vec<ContextEntry>,
}

impl ConversationContext {
    /// Start a context from the listener's topic.
    pub fn from_topic(topic: &str) -> Result<Self, DomainError> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(DomainError::EmptyTopic);
        }
        Ok(Self {
            entries: vec![ContextEntry {
                role: Role::Listener,
                content: topic.to_string(),
            }],
        })
    }

    /// The original topic.
    pub fn topic(&self) -> &str {
        &self.entries[0].content
    }

    pub fn entries(&self) -> &[ContextEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false: a context holds at least its topic.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of interruptions folded into this context.
    pub fn interruptions(&self) -> usize {
        (self.entries.len() - 1) / 2
    }

    /// Build the context for the turn after an interruption.
    ///
    /// Appends the played prefix as a backend entry and the interruption as a
    /// listener entry. Segments that were generated but never played are not
    /// part of `prefix` and so never reach the history.
    #[must_use]
    pub fn with_interruption(&self, prefix: &Transcript, interruption: &Segment) -> Self {
        let mut entries = Vec::with_capacity(self.entries.len() + 2);
        entries.extend(self.entries.iter().cloned());
        entries.push(ContextEntry {
            role: Role::Backend,
            content: prefix.to_backend_fragment(),
        });
        entries.push(ContextEntry {
            role: Role::Listener,
            content: interruption.to_context_fragment(),
        });
        Self { entries }
    }
}
