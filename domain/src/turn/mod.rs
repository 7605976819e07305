//! Conversation turn domain
//!
//! A turn carries one user utterance through planning, tool execution,
//! reflection and synthesis. Its [`TurnStatus`] only moves forward, with a
//! single permitted loop from `reflecting` back to `executing_tools`.

pub mod answer;
pub mod constraints;
pub mod entities;
pub mod event;
pub mod status;

pub use answer::{DropReason, DroppedOption, RecommendedOption, StructuredAnswer, parse_answer_text};
pub use constraints::{Constraints, DurationBounds, UserLocation};
pub use entities::{ConversationTurn, TurnRequest};
pub use event::TurnEvent;
pub use status::{SharedLifecycle, TransitionError, TurnLifecycle, TurnStatus};
