//! Session domain entities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role of a message in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// A message in a conversation (Entity)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// A conversation session (Entity)
///
/// A session owns at most one active turn at a time.
#[derive(Debug, Clone)]
pub struct Session {
    id: String,
    active_turn: Option<String>,
    created_at: DateTime<Utc>,
    last_activity_at: DateTime<Utc>,
}

impl Session {
    pub fn new(id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            active_turn: None,
            created_at: now,
            last_activity_at: now,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn active_turn(&self) -> Option<&str> {
        self.active_turn.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn last_activity_at(&self) -> DateTime<Utc> {
        self.last_activity_at
    }

    pub fn is_busy(&self) -> bool {
        self.active_turn.is_some()
    }

    pub fn touch(&mut self) {
        self.last_activity_at = Utc::now();
    }

    /// Attach a new active turn
    pub fn start_turn(&mut self, turn_id: impl Into<String>) {
        self.active_turn = Some(turn_id.into());
        self.touch();
    }

    /// Detach the active turn if it is `turn_id`; returns whether it was
    pub fn finish_turn(&mut self, turn_id: &str) -> bool {
        if self.active_turn.as_deref() == Some(turn_id) {
            self.active_turn = None;
            self.touch();
            true
        } else {
            false
        }
    }
}
