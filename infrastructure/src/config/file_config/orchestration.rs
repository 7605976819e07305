//! Orchestration tuning from TOML (`[orchestration]` section)

use planner_application::OrchestrationParams;
use planner_domain::intent::DEFAULT_CITY;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Policy constants of a planning turn.
///
/// Every value has the documented default; the file only needs to name
/// what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOrchestrationConfig {
    /// Distinct tools a batch should reach before forcing stops.
    pub min_diversity: usize,
    /// Most tools the selection policy may add to one batch.
    pub max_forced: usize,
    pub per_call_timeout_seconds: u64,
    /// Wall-clock budget for the tool phase of a turn.
    pub turn_budget_seconds: u64,
    /// Provider calls allowed in flight at once, process-wide.
    pub max_workers: usize,
    pub cache_ttl_seconds: u64,
    pub knowledge_top_k: u32,
    pub default_city: String,
    /// Earlier messages loaded from history for planning context.
    pub history_context_length: usize,
    pub max_candidates_in_prompt: usize,
}

impl Default for FileOrchestrationConfig {
    fn default() -> Self {
        Self {
            min_diversity: 3,
            max_forced: 3,
            per_call_timeout_seconds: 30,
            turn_budget_seconds: 90,
            max_workers: 5,
            cache_ttl_seconds: 300,
            knowledge_top_k: 10,
            default_city: DEFAULT_CITY.to_string(),
            history_context_length: 10,
            max_candidates_in_prompt: 30,
        }
    }
}

impl FileOrchestrationConfig {
    /// Convert to the application-layer parameters
    pub fn to_params(&self) -> OrchestrationParams {
        OrchestrationParams::default()
            .with_min_diversity(self.min_diversity)
            .with_max_forced(self.max_forced)
            .with_per_call_timeout(Duration::from_secs(self.per_call_timeout_seconds))
            .with_turn_budget(Duration::from_secs(self.turn_budget_seconds))
            .with_knowledge_top_k(self.knowledge_top_k)
            .with_default_city(self.default_city.clone())
            .with_history_context_length(self.history_context_length)
            .with_max_candidates_in_prompt(self.max_candidates_in_prompt)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds)
    }
}
