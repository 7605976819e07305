//! Chat history port
//!
//! Prior messages of a session are fed back into planning; finished turns
//! are appended. Storage durability is the adapter's concern.

use async_trait::async_trait;
use planner_domain::{ConversationTurn, Message};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("History storage unavailable: {0}")]
    Unavailable(String),

    #[error("History write failed: {0}")]
    WriteFailed(String),
}

#[async_trait]
pub trait ChatHistoryPort: Send + Sync {
    /// The last `limit` messages of a session, oldest first
    async fn recent_messages(&self, session_id: &str, limit: usize)
    -> Result<Vec<Message>, HistoryError>;

    /// Append a finished turn (user utterance, answer and tool activity)
    async fn record_turn(&self, turn: &ConversationTurn) -> Result<(), HistoryError>;

    /// Drop everything stored for a session
    async fn forget_session(&self, session_id: &str) -> Result<(), HistoryError>;
}

/// History that stores nothing
pub struct NoChatHistory;

#[async_trait]
impl ChatHistoryPort for NoChatHistory {
    async fn recent_messages(
        &self,
        _session_id: &str,
        _limit: usize,
    ) -> Result<Vec<Message>, HistoryError> {
        Ok(Vec::new())
    }

    async fn record_turn(&self, _turn: &ConversationTurn) -> Result<(), HistoryError> {
        Ok(())
    }

    async fn forget_session(&self, _session_id: &str) -> Result<(), HistoryError> {
        Ok(())
    }
}
