//! Tool provider abstraction
//!
//! This module defines the [`ToolProvider`] trait, the single capability every
//! catalog tool exposes: accept validated arguments, return candidate-shaped
//! records. The core never branches on what backs a tool.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     ToolRegistry                            │
//! │  (closed catalog, ordered by fixed tool priority)           │
//! └─────────────────────────────────────────────────────────────┘
//!           │                    │                    │
//!           ▼                    ▼                    ▼
//!    ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!    │  Knowledge   │   │   Featured   │   │     HTTP     │
//!    │  store tool  │   │  search tool │   │   provider   │
//!    └──────────────┘   └──────────────┘   └──────────────┘
//! ```

use async_trait::async_trait;
use thiserror::Error;

use super::entities::{ToolDefinition, ToolInvocation};
use crate::entity::EntityRecord;

/// Error type for tool provider operations
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Backing service is not reachable or not configured
    #[error("Provider not available: {0}")]
    NotAvailable(String),

    /// The call was made but failed
    #[error("Execution failed: {0}")]
    ExecutionFailed(String),

    /// The backing service answered with something we cannot interpret
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

/// A catalog tool
///
/// Implementations receive invocations whose arguments were already
/// validated against [`definition`](Self::definition).
#[async_trait]
pub trait ToolProvider: Send + Sync {
    /// Definition advertised to the LLM and used for validation
    fn definition(&self) -> &ToolDefinition;

    /// Canonical tool name
    fn name(&self) -> &str {
        &self.definition().name
    }

    /// Execute the tool
    async fn invoke(&self, invocation: &ToolInvocation) -> Result<Vec<EntityRecord>, ProviderError>;
}
