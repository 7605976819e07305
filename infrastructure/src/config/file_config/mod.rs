//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted to application types at the
//! edge ([`FileOrchestrationConfig::to_params`]).

mod llm;
mod logging;
mod orchestration;
mod tools;

pub use llm::FileLlmConfig;
pub use logging::FileLoggingConfig;
pub use orchestration::FileOrchestrationConfig;
pub use tools::FileToolsConfig;

use planner_domain::tool::catalog;
use planner_domain::{ConfigIssue, ConfigIssueCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration that cannot be used at all
#[derive(Debug, Error)]
pub enum ConfigValidationError {
    #[error("invalid configuration: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// LLM endpoint and models
    pub llm: FileLlmConfig,
    /// Turn policy constants
    pub orchestration: FileOrchestrationConfig,
    /// Tool endpoints and knowledge seed
    pub tools: FileToolsConfig,
    /// Log destinations
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    ///
    /// Checks, in order:
    /// 1. Zero timeouts, budgets and worker counts (errors)
    /// 2. Tool names outside the catalog in `[tools]` (errors)
    /// 3. Settings that work but weaken the turn (warnings)
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        let orch = &self.orchestration;

        // 1. Zero values
        for (field, value) in [
            ("llm.timeout_seconds", self.llm.timeout_seconds),
            (
                "orchestration.per_call_timeout_seconds",
                orch.per_call_timeout_seconds,
            ),
            ("orchestration.turn_budget_seconds", orch.turn_budget_seconds),
        ] {
            if value == 0 {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::ZeroTimeout,
                    format!("{} cannot be 0", field),
                ));
            }
        }
        if orch.max_workers == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::ZeroWorkers,
                "orchestration.max_workers cannot be 0",
            ));
        }

        // 2. Catalog names
        let named = self
            .tools
            .endpoints
            .keys()
            .map(|name| ("tools.endpoints", name))
            .chain(self.tools.disabled.iter().map(|name| ("tools.disabled", name)));
        for (field, name) in named {
            if !catalog::is_catalog_tool(name) {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::UnknownToolName,
                    format!("{}: '{}' is not a known tool", field, name),
                ));
            }
        }

        // 3. Weak settings
        if orch.min_diversity == 0 {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::DiversityDisabled,
                "orchestration.min_diversity = 0 disables diversity forcing",
            ));
        }
        if orch.turn_budget_seconds > 0 && orch.turn_budget_seconds < orch.per_call_timeout_seconds
        {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::BudgetShorterThanToolTimeout,
                format!(
                    "orchestration.turn_budget_seconds ({}) is shorter than per_call_timeout_seconds ({})",
                    orch.turn_budget_seconds, orch.per_call_timeout_seconds
                ),
            ));
        }
        if orch.default_city.trim().is_empty() {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::BlankDefaultCity,
                "orchestration.default_city is blank; location-free queries get no city",
            ));
        }

        issues
    }

    /// Warnings of a usable configuration, or every error if it is not usable
    pub fn ensure_valid(&self) -> Result<Vec<ConfigIssue>, ConfigValidationError> {
        let (errors, warnings): (Vec<_>, Vec<_>) =
            self.validate().into_iter().partition(ConfigIssue::is_error);
        if errors.is_empty() {
            Ok(warnings)
        } else {
            Err(ConfigValidationError::Invalid(
                errors.into_iter().map(|e| e.message).collect(),
            ))
        }
    }
}
