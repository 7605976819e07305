//! Events streamed to the caller during a turn
//!
//! A turn emits zero or more `TextDelta`s, then exactly one of:
//! `StructuredAnswer` followed by `Done`, `Cancelled`, or `Failed`.

use serde::{Deserialize, Serialize};

use super::answer::StructuredAnswer;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum TurnEvent {
    TextDelta(String),
    StructuredAnswer(StructuredAnswer),
    Done,
    Cancelled,
    Failed { message: String },
}

impl TurnEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TurnEvent::Done | TurnEvent::Cancelled | TurnEvent::Failed { .. }
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TurnEvent::TextDelta(_) => "text_delta",
            TurnEvent::StructuredAnswer(_) => "structured_answer",
            TurnEvent::Done => "done",
            TurnEvent::Cancelled => "cancelled",
            TurnEvent::Failed { .. } => "failed",
        }
    }
}
