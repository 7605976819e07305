//! Tool Executor port
//!
//! Defines the interface for running a batch of tool invocations.

use async_trait::async_trait;
use planner_domain::{ToolDefinition, ToolInvocation, ToolResult};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Port for tool execution
///
/// This port defines how the application layer executes tools.
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait ToolExecutorPort: Send + Sync {
    /// Definitions of every registered tool, in priority order
    fn definitions(&self) -> Vec<ToolDefinition>;

    /// Check if a tool is available
    fn has_tool(&self, name: &str) -> bool {
        self.definitions().iter().any(|d| d.name == name)
    }

    /// Get names of all available tools
    fn available_tools(&self) -> Vec<String> {
        self.definitions().into_iter().map(|d| d.name).collect()
    }

    /// Execute a batch concurrently.
    ///
    /// Returns exactly one result per invocation, in invocation order.
    /// Never fails as a whole: unknown tools, invalid arguments, timeouts,
    /// provider errors and cancellation are all reported per result.
    async fn run_batch(
        &self,
        invocations: &[ToolInvocation],
        per_call_timeout: Duration,
        cancel: &CancellationToken,
    ) -> Vec<ToolResult>;
}
