//! Prompt domain
//!
//! Templates for the planning and synthesis LLM calls of a turn.

mod template;

pub use template::{ANSWER_FUNCTION_NAME, PlannerPromptTemplate};
