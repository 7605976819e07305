//! Query intent value objects

use serde::{Deserialize, Serialize};

/// Coarse classification of what the user is looking for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum IntentKind {
    Restaurant,
    Activity,
    Event,
    #[default]
    General,
}

impl IntentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntentKind::Restaurant => "restaurant",
            IntentKind::Activity => "activity",
            IntentKind::Event => "event",
            IntentKind::General => "general",
        }
    }
}

impl std::fmt::Display for IntentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// When the user wants to go
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Timeframe {
    /// No time wording detected
    #[default]
    General,
    /// "tonight", "this weekend", "now" and similar
    Immediate,
}

/// Result of intent analysis (Value Object)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryIntent {
    pub intent_kind: IntentKind,
    pub city: String,
    /// Finer label, e.g. "food", "outdoor", "cultural"
    pub category: String,
    pub timeframe: Timeframe,
    pub time_sensitive: bool,
    pub budget_conscious: bool,
    /// The city came from the utterance or constraints, not the default
    pub location_specific: bool,
    /// Tool names in priority order
    pub recommended_tools: Vec<String>,
}

impl QueryIntent {
    /// Fallback intent used when classification fails
    pub fn general(city: impl Into<String>) -> Self {
        Self {
            intent_kind: IntentKind::General,
            city: city.into(),
            category: "general".to_string(),
            timeframe: Timeframe::General,
            time_sensitive: false,
            budget_conscious: false,
            location_specific: false,
            recommended_tools: Vec::new(),
        }
    }

    pub fn recommends(&self, tool_name: &str) -> bool {
        self.recommended_tools.iter().any(|t| t == tool_name)
    }
}
