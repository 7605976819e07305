//! Domain layer for date-planner
//!
//! This crate contains the core business logic, entities, and value objects
//! of the planning turn. It has no dependencies on infrastructure or
//! presentation concerns and performs no I/O.
//!
//! # Core Concepts
//!
//! ## Tools
//!
//! A closed catalog of eleven tools ([`tool::catalog`]). Every call is a
//! [`ToolInvocation`] validated before dispatch and answered by exactly one
//! [`ToolResult`] whose status is `success`, `timeout` or `error`.
//!
//! ## Turns
//!
//! A [`ConversationTurn`] moves strictly forward through [`TurnStatus`]:
//! planning, executing tools, reflecting, synthesizing, streaming, done.
//! Cancellation and failure are reachable from any non-terminal state.
//!
//! ## Policies
//!
//! - [`SelectionPolicy`] tops up the LLM's tool choices to a minimum diversity
//! - [`ResultAggregator`] deduplicates tool output into [`CandidateEntity`]s

pub mod aggregation;
pub mod core;
pub mod entity;
pub mod intent;
pub mod policy;
pub mod prompt;
pub mod session;
pub mod tool;
pub mod turn;
pub mod util;

// Re-export commonly used types
pub use aggregation::ResultAggregator;
pub use core::{
    error::{DomainError, ErrorKind},
    validation::{ConfigIssue, ConfigIssueCode, Severity},
};
pub use entity::{CandidateEntity, EntityKind, EntityRecord, GeoPoint};
pub use intent::{IntentKind, QueryIntent, Timeframe};
pub use policy::{SelectionContext, SelectionPolicy};
pub use prompt::{ANSWER_FUNCTION_NAME, PlannerPromptTemplate};
pub use session::{Message, Role, Session, SynthesisEvent};
pub use tool::{
    DefaultToolValidator, InvocationOrigin, ParamType, ProviderError, ToolDefinition, ToolError,
    ToolInvocation, ToolParameter, ToolProvider, ToolResult, ToolStatus, ToolValidator,
};
pub use turn::{
    Constraints, ConversationTurn, DurationBounds, RecommendedOption, SharedLifecycle,
    StructuredAnswer, TransitionError, TurnEvent, TurnLifecycle, TurnRequest, TurnStatus,
    UserLocation,
};
