//! Type definitions for the RunTurn use case.

use crate::ports::llm_gateway::GatewayError;
use planner_domain::{DomainError, ErrorKind, SharedLifecycle, TransitionError, TurnEvent, TurnRequest};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Message shown to the user when a turn fails
pub const GENERIC_FAILURE_MESSAGE: &str = "Sorry, I could not complete this request right now.";

/// Errors that end a turn early.
///
/// Tool failures never appear here; they are recorded as results.
#[derive(Error, Debug)]
pub enum RunTurnError {
    #[error("Invalid request: {0}")]
    InvalidRequest(#[from] DomainError),

    #[error("Synthesis failed: {0}")]
    SynthesisFailed(String),

    #[error("Gateway error: {0}")]
    GatewayError(#[from] GatewayError),

    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error("Operation cancelled")]
    Cancelled,
}

impl RunTurnError {
    /// Check if this error represents a cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, RunTurnError::Cancelled)
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            RunTurnError::Cancelled => ErrorKind::Cancelled,
            RunTurnError::InvalidRequest(e) => e.kind(),
            _ => ErrorKind::SynthesisFailure,
        }
    }
}

/// Input for one turn
#[derive(Debug, Clone)]
pub struct RunTurnInput {
    pub turn_id: String,
    pub request: TurnRequest,
}

impl RunTurnInput {
    pub fn new(turn_id: impl Into<String>, request: TurnRequest) -> Self {
        Self {
            turn_id: turn_id.into(),
            request,
        }
    }
}

/// Channels a running turn reports through and is steered by
#[derive(Clone)]
pub struct TurnControl {
    pub events: mpsc::Sender<TurnEvent>,
    pub lifecycle: SharedLifecycle,
    pub cancel: CancellationToken,
}

impl TurnControl {
    pub fn new(events: mpsc::Sender<TurnEvent>) -> Self {
        Self {
            events,
            lifecycle: SharedLifecycle::new(),
            cancel: CancellationToken::new(),
        }
    }

    /// Deliver an event unless the turn is cancelled first.
    ///
    /// Returns `false` when the event was not delivered, either because the
    /// token fired while the channel was full or because the receiver is gone.
    pub async fn send(&self, event: TurnEvent) -> bool {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => false,
            sent = self.events.send(event) => sent.is_ok(),
        }
    }

    /// Deliver a terminal event without waiting for room in the channel
    pub fn send_terminal(&self, event: TurnEvent) {
        if self.events.try_send(event).is_err() {
            debug!("Terminal turn event not delivered; the receiver is full or gone");
        }
    }
}
