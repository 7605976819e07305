//! Tool domain value objects: immutable result and error types
//!
//! Every invocation yields exactly one [`ToolResult`]. Expected degraded
//! outcomes (timeouts, provider failures, bad arguments) are status values
//! rather than errors, so a batch never aborts because one tool misbehaved.

use serde::{Deserialize, Serialize};

use crate::core::error::ErrorKind;
use crate::entity::EntityRecord;

/// Outcome class of one invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolStatus {
    Success,
    Timeout,
    Error,
}

impl ToolStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolStatus::Success => "success",
            ToolStatus::Timeout => "timeout",
            ToolStatus::Error => "error",
        }
    }
}

impl std::fmt::Display for ToolStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error detail attached to a non-successful [`ToolResult`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolError {
    pub kind: ErrorKind,
    pub message: String,
}

impl ToolError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn unknown_tool(name: &str) -> Self {
        Self::new(ErrorKind::UnknownTool, format!("Unknown tool: {}", name))
    }

    pub fn invalid_arguments(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidArguments, message)
    }

    pub fn timeout(after_ms: u64) -> Self {
        Self::new(
            ErrorKind::ToolTimeout,
            format!("Timed out after {}ms", after_ms),
        )
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ToolFailure, message)
    }

    pub fn cancelled() -> Self {
        Self::new(ErrorKind::Cancelled, "cancelled")
    }
}

impl std::fmt::Display for ToolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}

impl std::error::Error for ToolError {}

/// Result of one tool invocation.
///
/// `error` is present iff `status != Success`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    pub tool_name: String,
    pub status: ToolStatus,
    #[serde(default)]
    pub payload: Vec<EntityRecord>,
    pub latency_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ToolError>,
    /// Served from the result cache without a provider call
    #[serde(default)]
    pub cached: bool,
}

impl ToolResult {
    /// Create a successful result
    pub fn success(tool_name: impl Into<String>, payload: Vec<EntityRecord>, latency_ms: u64) -> Self {
        Self {
            tool_name: tool_name.into(),
            status: ToolStatus::Success,
            payload,
            latency_ms,
            error: None,
            cached: false,
        }
    }

    /// Create a non-successful result; the status follows the error kind
    pub fn failure(tool_name: impl Into<String>, error: ToolError, latency_ms: u64) -> Self {
        let status = match error.kind {
            ErrorKind::ToolTimeout => ToolStatus::Timeout,
            _ => ToolStatus::Error,
        };
        Self {
            tool_name: tool_name.into(),
            status,
            payload: Vec::new(),
            latency_ms,
            error: Some(error),
            cached: false,
        }
    }

    /// Copy of a cached result as served on a cache hit
    pub fn as_cache_hit(&self) -> Self {
        Self {
            latency_ms: 0,
            cached: true,
            ..self.clone()
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ToolStatus::Success
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.error.as_ref().map(|e| e.kind)
    }

    pub fn is_cancelled(&self) -> bool {
        self.error_kind() == Some(ErrorKind::Cancelled)
    }
}
