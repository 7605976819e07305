//! LLM gateway adapters.
//!
//! [`OpenAiGateway`] implements the [`LlmGateway`](planner_application::LlmGateway)
//! port against any OpenAI-compatible chat-completions endpoint.

mod gateway;
mod protocol;

pub use gateway::OpenAiGateway;
