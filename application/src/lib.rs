//! Application layer for date-planner
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types
pub use config::OrchestrationParams;
pub use ports::{
    chat_history::{ChatHistoryPort, HistoryError, NoChatHistory},
    conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger},
    intent_classifier::{ClassifierError, IntentClassifierPort, KeywordIntentClassifier},
    knowledge_store::{KnowledgeStore, KnowledgeStoreError, SearchFilters},
    llm_gateway::{GatewayError, LlmGateway, PlanningRequest, SynthesisRequest, SynthesisStream},
    tool_executor::ToolExecutorPort,
    tool_schema::ToolSchemaPort,
};
pub use use_cases::analyze_intent::AnalyzeIntentUseCase;
pub use use_cases::run_turn::{
    GENERIC_FAILURE_MESSAGE, RunTurnError, RunTurnInput, RunTurnUseCase, TurnControl,
};
pub use use_cases::session_controller::{SessionController, SessionError, TurnHandle};
