//! Streaming events for LLM synthesis.
//!
//! [`SynthesisEvent`] bridges infrastructure-level streaming (SSE chunks
//! from the chat-completions endpoint) to the orchestrator, which forwards
//! text to the caller as it arrives.

use serde_json::Value;

/// An event in a streaming synthesis response.
#[derive(Debug, Clone, PartialEq)]
pub enum SynthesisEvent {
    /// A text chunk from the model.
    Delta(String),
    /// The structured answer payload (function-call arguments, already
    /// reassembled from their streamed fragments).
    Structured(Value),
    /// The complete response text (signals stream end).
    Completed(String),
    /// An error that occurred during streaming.
    Error(String),
}

impl SynthesisEvent {
    /// Returns the text content if this is a Delta or Completed event.
    pub fn text(&self) -> Option<&str> {
        match self {
            SynthesisEvent::Delta(s) | SynthesisEvent::Completed(s) => Some(s),
            _ => None,
        }
    }

    /// Returns true if this event signals the end of the stream.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SynthesisEvent::Completed(_) | SynthesisEvent::Error(_))
    }
}
