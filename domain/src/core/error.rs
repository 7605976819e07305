//! Domain error types
//!
//! [`ErrorKind`] is the closed taxonomy shared by every layer. Tool-level
//! kinds are carried as *data* inside a [`ToolResult`](crate::tool::ToolResult)
//! and degrade a turn; only [`ErrorKind::SynthesisFailure`] and invariant
//! violations end a turn in `failed`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Classification of everything that can go wrong during a turn.
///
/// | Kind | Where it surfaces | Ends the turn? |
/// |------|-------------------|----------------|
/// | `UnknownTool` | `ToolResult` (status=error) | No |
/// | `InvalidArguments` | `ToolResult` (status=error) | No |
/// | `ToolTimeout` | `ToolResult` (status=timeout) | No |
/// | `ToolFailure` | `ToolResult` (status=error) | No |
/// | `SessionBusy` | `begin_turn` return value | Turn never created |
/// | `Cancelled` | terminal `Cancelled` event | Yes (not an error) |
/// | `SynthesisFailure` | terminal `Failed` event | Yes |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    UnknownTool,
    InvalidArguments,
    ToolTimeout,
    ToolFailure,
    SessionBusy,
    Cancelled,
    SynthesisFailure,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::UnknownTool => "unknown_tool",
            ErrorKind::InvalidArguments => "invalid_arguments",
            ErrorKind::ToolTimeout => "tool_timeout",
            ErrorKind::ToolFailure => "tool_failure",
            ErrorKind::SessionBusy => "session_busy",
            ErrorKind::Cancelled => "cancelled",
            ErrorKind::SynthesisFailure => "synthesis_failure",
        }
    }

    /// Nothing is retried inside a turn; a later turn may retry the same
    /// arguments because failures are never cached.
    pub fn is_retryable(&self) -> bool {
        false
    }

    /// Whether this kind can only come from a programming or configuration
    /// mistake rather than from an unreliable collaborator.
    pub fn is_configuration_error(&self) -> bool {
        matches!(self, ErrorKind::UnknownTool)
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid arguments for {tool}: {message}")]
    InvalidArguments { tool: String, message: String },

    #[error("Invalid constraints: {0}")]
    InvalidConstraints(String),

    #[error("Session {0} already has an active turn")]
    SessionBusy(String),

    #[error("Operation cancelled")]
    Cancelled,
}

impl DomainError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DomainError::UnknownTool(_) => ErrorKind::UnknownTool,
            DomainError::InvalidArguments { .. } | DomainError::InvalidConstraints(_) => {
                ErrorKind::InvalidArguments
            }
            DomainError::SessionBusy(_) => ErrorKind::SessionBusy,
            DomainError::Cancelled => ErrorKind::Cancelled,
        }
    }

    /// Check if this error represents a cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, DomainError::Cancelled)
    }
}
