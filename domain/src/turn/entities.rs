//! Conversation turn entities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::answer::StructuredAnswer;
use super::constraints::{Constraints, UserLocation};
use super::status::TurnStatus;
use crate::entity::CandidateEntity;
use crate::intent::QueryIntent;
use crate::session::{Message, Role};
use crate::tool::{ToolInvocation, ToolResult};

/// Inbound request that starts a turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnRequest {
    pub session_id: String,
    pub messages: Vec<Message>,
    #[serde(default)]
    pub constraints: Constraints,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_location: Option<UserLocation>,
}

impl TurnRequest {
    pub fn new(session_id: impl Into<String>, utterance: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            messages: vec![Message::user(utterance)],
            constraints: Constraints::default(),
            user_location: None,
        }
    }

    pub fn with_messages(session_id: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            session_id: session_id.into(),
            messages,
            constraints: Constraints::default(),
            user_location: None,
        }
    }

    pub fn with_constraints(mut self, constraints: Constraints) -> Self {
        self.constraints = constraints;
        self
    }

    pub fn with_location(mut self, lat: f64, lon: f64) -> Self {
        self.user_location = Some(UserLocation::new(lat, lon));
        self
    }

    /// The utterance this turn answers: the last user message
    pub fn utterance(&self) -> &str {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
            .unwrap_or_default()
    }

    /// Messages before the last user message
    pub fn history(&self) -> &[Message] {
        match self.messages.iter().rposition(|m| m.role == Role::User) {
            Some(index) => &self.messages[..index],
            None => &self.messages,
        }
    }
}

/// One request/response cycle (Entity)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub turn_id: String,
    pub session_id: String,
    pub user_utterance: String,
    pub constraints: Constraints,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_location: Option<UserLocation>,
    pub status: TurnStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<QueryIntent>,
    pub invocations: Vec<ToolInvocation>,
    pub results: Vec<ToolResult>,
    pub candidates: Vec<CandidateEntity>,
    pub answer_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structured_answer: Option<StructuredAnswer>,
    /// User-facing message when the turn failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_message: Option<String>,
    pub started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

impl ConversationTurn {
    pub fn new(turn_id: impl Into<String>, request: &TurnRequest) -> Self {
        Self {
            turn_id: turn_id.into(),
            session_id: request.session_id.clone(),
            user_utterance: request.utterance().to_string(),
            constraints: request.constraints.clone(),
            user_location: request.user_location,
            status: TurnStatus::Planning,
            intent: None,
            invocations: Vec::new(),
            results: Vec::new(),
            candidates: Vec::new(),
            answer_text: String::new(),
            structured_answer: None,
            failure_message: None,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    /// Append one executed batch
    pub fn record_batch(&mut self, invocations: Vec<ToolInvocation>, results: Vec<ToolResult>) {
        self.invocations.extend(invocations);
        self.results.extend(results);
    }

    pub fn invoked_tools(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for inv in &self.invocations {
            if !names.contains(&inv.tool_name.as_str()) {
                names.push(&inv.tool_name);
            }
        }
        names
    }

    pub fn successful_results(&self) -> usize {
        self.results.iter().filter(|r| r.is_success()).count()
    }

    pub fn is_finished(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn finish(&mut self, status: TurnStatus) {
        self.status = status;
        self.finished_at = Some(Utc::now());
    }

    pub fn duration_ms(&self) -> Option<i64> {
        self.finished_at
            .map(|end| (end - self.started_at).num_milliseconds())
    }
}
