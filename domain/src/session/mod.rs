//! Conversation session domain.
//!
//! - [`entities::Session`]: a conversation with at most one active turn
//! - [`entities::Message`]: a single chat message
//! - [`stream::SynthesisEvent`]: streamed synthesis output

pub mod entities;
pub mod stream;

pub use entities::{Message, Role, Session};
pub use stream::SynthesisEvent;
