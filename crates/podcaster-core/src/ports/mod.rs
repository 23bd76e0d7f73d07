//! Port definitions (trait abstractions) for external systems.
//!
//! Ports define the interfaces the session engine expects from
//! infrastructure. They use only domain types.
//!
//! # Design Rules
//!
//! - No HTTP, WebSocket or provider SDK types in any signature
//! - Ports never retry; transport-level retry belongs to the adapter
//! - The registry port is synchronous and never held across an `.await`

pub mod generation;
pub mod registry;
pub mod speech;
pub mod transport;

pub use generation::{GeneratedBatch, GenerationError, GenerationPort};
pub use registry::{RegistryError, SessionRegistry};
pub use speech::{SpeechError, SpeechSynthesizer, SpeechTranscriber};
pub use transport::{StreamTransport, TransportError};
