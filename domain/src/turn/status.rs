//! Turn lifecycle state machine
//!
//! ```text
//! planning ─▶ executing_tools ─▶ reflecting ─▶ synthesizing ─▶ streaming ─▶ done
//!                    ▲                │
//!                    └── once ────────┘
//!
//! any non-terminal state ─▶ cancelled | failed
//! ```

use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

/// Status of a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnStatus {
    Planning,
    ExecutingTools,
    Reflecting,
    Synthesizing,
    Streaming,
    Done,
    Cancelled,
    Failed,
}

impl TurnStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TurnStatus::Planning => "planning",
            TurnStatus::ExecutingTools => "executing_tools",
            TurnStatus::Reflecting => "reflecting",
            TurnStatus::Synthesizing => "synthesizing",
            TurnStatus::Streaming => "streaming",
            TurnStatus::Done => "done",
            TurnStatus::Cancelled => "cancelled",
            TurnStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TurnStatus::Done | TurnStatus::Cancelled | TurnStatus::Failed
        )
    }
}

impl std::fmt::Display for TurnStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An illegal status change; always a programming error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Illegal turn transition: {from} -> {to}")]
pub struct TransitionError {
    pub from: TurnStatus,
    pub to: TurnStatus,
}

/// Status plus the bookkeeping needed to enforce the transition rules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnLifecycle {
    status: TurnStatus,
    extra_round_used: bool,
}

impl Default for TurnLifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl TurnLifecycle {
    pub fn new() -> Self {
        Self {
            status: TurnStatus::Planning,
            extra_round_used: false,
        }
    }

    pub fn status(&self) -> TurnStatus {
        self.status
    }

    pub fn extra_round_used(&self) -> bool {
        self.extra_round_used
    }

    /// Whether `to` is a legal next state
    pub fn can_transition(&self, to: TurnStatus) -> bool {
        use TurnStatus::*;
        if self.status.is_terminal() {
            return false;
        }
        match (self.status, to) {
            (_, Cancelled) | (_, Failed) => true,
            (Planning, ExecutingTools) => true,
            (ExecutingTools, Reflecting) => true,
            (Reflecting, ExecutingTools) => !self.extra_round_used,
            (Reflecting, Synthesizing) => true,
            (Synthesizing, Streaming) => true,
            (Streaming, Done) => true,
            _ => false,
        }
    }

    pub fn transition(&mut self, to: TurnStatus) -> Result<(), TransitionError> {
        if !self.can_transition(to) {
            return Err(TransitionError {
                from: self.status,
                to,
            });
        }
        if self.status == TurnStatus::Reflecting && to == TurnStatus::ExecutingTools {
            self.extra_round_used = true;
        }
        self.status = to;
        Ok(())
    }
}

/// Lifecycle shared between a running turn and its controller.
///
/// The orchestrator advances it; [`SharedLifecycle::cancel`] lets the
/// session controller move the turn to `cancelled` atomically, so exactly
/// one of "turn finished" and "cancel succeeded" can win.
#[derive(Debug, Clone, Default)]
pub struct SharedLifecycle {
    inner: Arc<Mutex<TurnLifecycle>>,
}

impl SharedLifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, TurnLifecycle> {
        // The guarded value is `Copy` and every write is a single assignment,
        // so a poisoned lock still holds a consistent state.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn status(&self) -> TurnStatus {
        self.lock().status()
    }

    pub fn snapshot(&self) -> TurnLifecycle {
        *self.lock()
    }

    pub fn transition(&self, to: TurnStatus) -> Result<(), TransitionError> {
        self.lock().transition(to)
    }

    /// Move a non-terminal turn to `cancelled`.
    ///
    /// Returns `false` when the turn had already reached a terminal state.
    pub fn cancel(&self) -> bool {
        self.lock().transition(TurnStatus::Cancelled).is_ok()
    }
}
