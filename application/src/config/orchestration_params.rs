//! Orchestration parameters for turn control.
//!
//! [`OrchestrationParams`] groups the static parameters that control a turn
//! in [`RunTurnUseCase`](crate::use_cases::run_turn::RunTurnUseCase).
//! Worker count and cache TTL belong to the executor adapter and are
//! configured there.

use planner_domain::SelectionPolicy;
use planner_domain::intent::DEFAULT_CITY;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestrationParams {
    /// Distinct tools a first round should reach.
    pub min_diversity: usize,
    /// Upper bound on invocations the policy may add.
    pub max_forced: usize,
    /// Timeout applied to each tool call independently.
    pub per_call_timeout: Duration,
    /// Wall-clock budget for the tool phase of a turn.
    pub turn_budget: Duration,
    /// Result count for knowledge-store searches.
    pub knowledge_top_k: u32,
    /// City assumed when the request names none.
    pub default_city: String,
    /// Prior messages loaded from chat history for planning.
    pub history_context_length: usize,
    /// Character cap on the history sent to the LLM.
    pub max_history_chars: usize,
    /// Candidates listed in the synthesis prompt.
    pub max_candidates_in_prompt: usize,
    /// Capacity of the per-turn event channel.
    pub event_buffer: usize,
}

impl Default for OrchestrationParams {
    fn default() -> Self {
        Self {
            min_diversity: 3,
            max_forced: 3,
            per_call_timeout: Duration::from_secs(30),
            turn_budget: Duration::from_secs(90),
            knowledge_top_k: 10,
            default_city: DEFAULT_CITY.to_string(),
            history_context_length: 10,
            max_history_chars: 50_000,
            max_candidates_in_prompt: 30,
            event_buffer: 64,
        }
    }
}

impl OrchestrationParams {
    pub fn selection_policy(&self) -> SelectionPolicy {
        SelectionPolicy::new(self.min_diversity, self.max_forced)
    }

    // ==================== Builder Methods ====================

    pub fn with_min_diversity(mut self, min: usize) -> Self {
        self.min_diversity = min;
        self
    }

    pub fn with_max_forced(mut self, max: usize) -> Self {
        self.max_forced = max;
        self
    }

    pub fn with_per_call_timeout(mut self, timeout: Duration) -> Self {
        self.per_call_timeout = timeout;
        self
    }

    pub fn with_turn_budget(mut self, budget: Duration) -> Self {
        self.turn_budget = budget;
        self
    }

    pub fn with_knowledge_top_k(mut self, top_k: u32) -> Self {
        self.knowledge_top_k = top_k;
        self
    }

    pub fn with_default_city(mut self, city: impl Into<String>) -> Self {
        self.default_city = city.into();
        self
    }

    pub fn with_history_context_length(mut self, length: usize) -> Self {
        self.history_context_length = length;
        self
    }

    pub fn with_max_candidates_in_prompt(mut self, max: usize) -> Self {
        self.max_candidates_in_prompt = max;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let params = OrchestrationParams::default();
        assert_eq!(params.min_diversity, 3);
        assert_eq!(params.max_forced, 3);
        assert_eq!(params.per_call_timeout, Duration::from_secs(30));
        assert_eq!(params.turn_budget, Duration::from_secs(90));
        assert_eq!(params.default_city, "Ottawa");
        assert_eq!(params.history_context_length, 10);
    }

    #[test]
    fn test_builder() {
        let params = OrchestrationParams::default()
            .with_min_diversity(4)
            .with_max_forced(1)
            .with_turn_budget(Duration::from_secs(5))
            .with_default_city("Toronto");

        assert_eq!(params.min_diversity, 4);
        assert_eq!(params.turn_budget, Duration::from_secs(5));
        assert_eq!(params.default_city, "Toronto");
        let policy = params.selection_policy();
        assert_eq!(policy.min_diversity, 4);
        assert_eq!(policy.max_forced, 1);
    }
}
