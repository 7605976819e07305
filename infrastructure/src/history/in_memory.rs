//! Process-local chat history.

use async_trait::async_trait;
use planner_application::ports::chat_history::{ChatHistoryPort, HistoryError};
use planner_domain::{ConversationTurn, Message};
use std::collections::HashMap;
use std::sync::Mutex;

/// Messages kept per session before the oldest are dropped
pub const DEFAULT_MAX_MESSAGES: usize = 200;

/// Chat history held in memory, lost on exit
pub struct InMemoryChatHistory {
    sessions: Mutex<HashMap<String, Vec<Message>>>,
    max_messages: usize,
}

impl InMemoryChatHistory {
    pub fn new() -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            max_messages: DEFAULT_MAX_MESSAGES,
        }
    }

    pub fn with_max_messages(mut self, max: usize) -> Self {
        self.max_messages = max.max(2);
        self
    }

    fn lock(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<String, Vec<Message>>>, HistoryError> {
        self.sessions
            .lock()
            .map_err(|_| HistoryError::Unavailable("history lock poisoned".to_string()))
    }
}

impl Default for InMemoryChatHistory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatHistoryPort for InMemoryChatHistory {
    async fn recent_messages(
        &self,
        session_id: &str,
        limit: usize,
    ) -> Result<Vec<Message>, HistoryError> {
        let sessions = self.lock()?;
        let Some(messages) = sessions.get(session_id) else {
            return Ok(Vec::new());
        };
        let skip = messages.len().saturating_sub(limit);
        Ok(messages[skip..].to_vec())
    }

    async fn record_turn(&self, turn: &ConversationTurn) -> Result<(), HistoryError> {
        let answer = match &turn.structured_answer {
            Some(structured) if turn.answer_text.trim().is_empty() => structured.summary.clone(),
            _ => turn.answer_text.clone(),
        };

        let mut sessions = self.lock()?;
        let messages = sessions.entry(turn.session_id.clone()).or_default();
        messages.push(Message::user(turn.user_utterance.clone()));
        messages.push(Message::assistant(answer));
        if messages.len() > self.max_messages {
            let excess = messages.len() - self.max_messages;
            messages.drain(..excess);
        }
        Ok(())
    }

    async fn forget_session(&self, session_id: &str) -> Result<(), HistoryError> {
        self.lock()?.remove(session_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use planner_domain::{Role, StructuredAnswer, TurnRequest};

    fn turn(session: &str, utterance: &str, answer: &str) -> ConversationTurn {
        let mut turn = ConversationTurn::new(
            format!("{}-turn-1", session),
            &TurnRequest::new(session, utterance),
        );
        turn.answer_text = answer.to_string();
        turn
    }

    #[tokio::test]
    async fn test_record_and_read_back() {
        let history = InMemoryChatHistory::new();
        history
            .record_turn(&turn("s1", "dinner ideas?", "Try The Whalesbone."))
            .await
            .unwrap();
        history
            .record_turn(&turn("s1", "something cheaper?", "The ByWard Market."))
            .await
            .unwrap();

        let all = history.recent_messages("s1", 10).await.unwrap();
        assert_eq!(all.len(), 4);
        assert_eq!(all[0].role, Role::User);
        assert_eq!(all[0].content, "dinner ideas?");

        let last_two = history.recent_messages("s1", 2).await.unwrap();
        assert_eq!(last_two[0].content, "something cheaper?");
        assert_eq!(last_two[1].role, Role::Assistant);

        assert!(history.recent_messages("other", 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_summary_used_when_text_empty() {
        let history = InMemoryChatHistory::new();
        let mut t = turn("s1", "skating?", "");
        t.structured_answer = Some(StructuredAnswer::new("Skate the canal."));
        history.record_turn(&t).await.unwrap();

        let messages = history.recent_messages("s1", 10).await.unwrap();
        assert_eq!(messages[1].content, "Skate the canal.");
    }

    #[tokio::test]
    async fn test_cap_and_forget() {
        let history = InMemoryChatHistory::new().with_max_messages(4);
        for i in 0..3 {
            history
                .record_turn(&turn("s1", &format!("q{}", i), "a"))
                .await
                .unwrap();
        }
        let messages = history.recent_messages("s1", 100).await.unwrap();
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0].content, "q1");

        history.forget_session("s1").await.unwrap();
        assert!(history.recent_messages("s1", 100).await.unwrap().is_empty());
    }
}
