//! Infrastructure layer for date-planner
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod history;
pub mod knowledge;
pub mod llm;
pub mod logging;
pub mod tools;

// Re-export commonly used types
pub use config::{
    ConfigLoader, ConfigValidationError, FileConfig, FileLlmConfig, FileLoggingConfig,
    FileOrchestrationConfig, FileToolsConfig,
};
pub use history::InMemoryChatHistory;
pub use knowledge::{DateIdea, InMemoryKnowledgeStore};
pub use llm::OpenAiGateway;
pub use logging::JsonlConversationLogger;
pub use tools::{
    HttpToolProvider, JsonSchemaToolConverter, ParallelToolExecutor, RegistryError, ResultCache,
    ToolRegistry, build_registry,
};
