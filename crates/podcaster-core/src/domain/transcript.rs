use serde_json::{Value, json};

use super::Segment;

/// Ordered segments already played. Insertion order is playback order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    segments: Vec<Segment>,
}

impl Transcript {
    pub const fn new() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    pub fn push(&mut self, segment: Segment) {
        self.segments.push(segment);
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Serialize in the backend's own output shape,
    /// `{"podcast":[{"speaker":..,"text":..}]}`, so it can be replayed as a
    /// backend turn.
    pub fn to_backend_fragment(&self) -> String {
        let podcast: Vec<Value> = self.segments.iter().map(Segment::to_json).collect();
        json!({ "podcast": podcast }).to_string()
    }
}

impl From<Vec<Segment>> for Transcript {
    fn from(segments: Vec<Segment>) -> Self {
        Self { segments }
    }
}
