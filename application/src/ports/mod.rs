//! Port definitions for the application layer
//!
//! Ports define the interfaces that the application layer uses
//! to interact with external systems. Adapters in the infrastructure
//! layer implement these ports.

pub mod chat_history;
pub mod conversation_logger;
pub mod intent_classifier;
pub mod knowledge_store;
pub mod llm_gateway;
pub mod tool_executor;
pub mod tool_schema;
