//! Tool schema conversion port.
//!
//! Separates "which tools exist" (domain) from "how to serialize for the
//! API" (infrastructure).

use planner_domain::ToolDefinition;

/// Port for converting tool definitions to LLM API format (JSON Schema).
pub trait ToolSchemaPort: Send + Sync {
    /// Convert a single tool definition to provider-neutral JSON Schema.
    fn tool_to_schema(&self, tool: &ToolDefinition) -> serde_json::Value;

    /// Convert all tools to a JSON Schema array, keeping the given order.
    fn all_tools_schema(&self, tools: &[ToolDefinition]) -> Vec<serde_json::Value> {
        tools.iter().map(|t| self.tool_to_schema(t)).collect()
    }
}
