use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use serde_json::{Value, json};

use super::DomainError;

/// Prefix marking listener-origin text so the generation backend can tell it
/// apart from dialogue it produced itself.
pub const LISTENER_SENTINEL: &str = "LISTENER INTERRUPTION: ";

/// Who speaks a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Speaker {
    Host,
    Guest,
    Listener,
}

impl Speaker {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Host => "Host",
            Self::Guest => "Guest",
            Self::Listener => "Listener",
        }
    }
}

impl fmt::Display for Speaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Speaker {
    type Err = DomainError;

    /// Case-insensitive. `"user"` is accepted as an alias for the listener.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "host" => Ok(Self::Host),
            "guest" => Ok(Self::Guest),
            "listener" | "user" => Ok(Self::Listener),
            _ => Err(DomainError::UnknownSpeaker(s.to_string())),
        }
    }
}

/// One speaker's utterance. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Segment {
    speaker: Speaker,
    text: String,
}

impl Segment {
    /// Create a segment, rejecting empty text.
    pub fn new(speaker: Speaker, text: impl Into<String>) -> Result<Self, DomainError> {
        let text = text.into();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(DomainError::EmptySegmentText);
        }
        Ok(Self {
            speaker,
            text: trimmed.to_string(),
        })
    }

    /// Parse a segment from backend-provided speaker name and text.
    pub fn parse(speaker: &str, text: impl Into<String>) -> Result<Self, DomainError> {
        Self::new(speaker.parse()?, text)
    }

    /// Build the listener segment for a raw interruption.
    ///
    /// The stored text carries [`LISTENER_SENTINEL`]; [`Segment::display_text`]
    /// strips it again.
    pub fn listener_interruption(raw: &str) -> Result<Self, DomainError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(DomainError::EmptySegmentText);
        }
        Ok(Self {
            speaker: Speaker::Listener,
            text: format!("{LISTENER_SENTINEL}{raw}"),
        })
    }

    pub const fn speaker(&self) -> Speaker {
        self.speaker
    }

    /// Text as sent to the generation backend.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Text as shown to the listener, without the interruption sentinel.
    pub fn display_text(&self) -> &str {
        if self.speaker == Speaker::Listener {
            self.text
                .strip_prefix(LISTENER_SENTINEL)
                .unwrap_or(&self.text)
        } else {
            &self.text
        }
    }

    /// The outbound text frame: `"<Speaker>: <text>"`.
    pub fn frame_text(&self) -> String {
        format!("{}: {}", self.speaker, self.display_text())
    }

    pub(crate) fn to_json(&self) -> Value {
        json!({ "speaker": self.speaker.as_str(), "text": self.text })
    }

    /// Serialized form used as a listener entry in the conversation context.
    pub fn to_context_fragment(&self) -> String {
        self.to_json().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn speaker_parsing_is_case_insensitive() {
        assert_eq!("HOST".parse::<Speaker>().unwrap(), Speaker::Host);
        assert_eq!(" guest ".parse::<Speaker>().unwrap(), Speaker::Guest);
        assert_eq!("User".parse::<Speaker>().unwrap(), Speaker::Listener);
        assert!(matches!(
            "Narrator".parse::<Speaker>(),
            Err(DomainError::UnknownSpeaker(name)) if name == "Narrator"
        ));
    }

    #[test]
    fn empty_text_is_rejected() {
        assert_eq!(
            Segment::new(Speaker::Host, "   "),
            Err(DomainError::EmptySegmentText)
        );
        assert_eq!(
            Segment::listener_interruption(""),
            Err(DomainError::EmptySegmentText)
        );
    }

    #[test]
    fn listener_segment_carries_sentinel() {
        let seg = Segment::listener_interruption("  what about channels? ").unwrap();
        assert_eq!(seg.speaker(), Speaker::Listener);
        assert_eq!(seg.text(), "LISTENER INTERRUPTION: what about channels?");
        assert_eq!(seg.display_text(), "what about channels?");
        assert_eq!(seg.frame_text(), "Listener: what about channels?");
    }

    #[test]
    fn frame_text_prefixes_speaker() {
        let seg = Segment::new(Speaker::Guest, "Goroutines are cheap.").unwrap();
        assert_eq!(seg.frame_text(), "Guest: Goroutines are cheap.");
    }

    #[test]
    fn context_fragment_is_json() {
        let seg = Segment::listener_interruption("hi").unwrap();
        let value: Value = serde_json::from_str(&seg.to_context_fragment()).unwrap();
        assert_eq!(value["speaker"], "Listener");
        assert_eq!(value["text"], "LISTENER INTERRUPTION: hi");
    }
}
