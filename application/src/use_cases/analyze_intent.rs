//! Analyze Intent use case
//!
//! Classifies the utterance once through the [`IntentClassifierPort`] and
//! falls back to a general intent when the classifier fails.

use crate::ports::intent_classifier::IntentClassifierPort;
use planner_domain::intent::DEFAULT_CITY;
use planner_domain::util::truncate_str;
use planner_domain::{Constraints, QueryIntent};
use std::sync::Arc;
use tracing::{debug, warn};

pub struct AnalyzeIntentUseCase {
    classifier: Arc<dyn IntentClassifierPort>,
    default_city: String,
}

impl Clone for AnalyzeIntentUseCase {
    fn clone(&self) -> Self {
        Self {
            classifier: self.classifier.clone(),
            default_city: self.default_city.clone(),
        }
    }
}

impl AnalyzeIntentUseCase {
    pub fn new(classifier: Arc<dyn IntentClassifierPort>) -> Self {
        Self {
            classifier,
            default_city: DEFAULT_CITY.to_string(),
        }
    }

    /// City used when neither the utterance nor the constraints name one
    pub fn with_default_city(mut self, city: impl Into<String>) -> Self {
        self.default_city = city.into();
        self
    }

    /// Never fails: one classification attempt, then a general fallback
    /// with no recommended tools.
    pub async fn execute(&self, utterance: &str, constraints: &Constraints) -> QueryIntent {
        match self.classifier.classify(utterance, constraints).await {
            Ok(mut intent) => {
                if !intent.location_specific {
                    intent.city = self.default_city.clone();
                }
                debug!(
                    "Intent for '{}': {} / {} in {} (tools: {})",
                    truncate_str(utterance, 60),
                    intent.intent_kind,
                    intent.category,
                    intent.city,
                    intent.recommended_tools.join(", ")
                );
                intent
            }
            Err(e) => {
                warn!("Intent classification failed, using general intent: {}", e);
                let city = constraints
                    .city
                    .as_deref()
                    .map(str::trim)
                    .filter(|c| !c.is_empty())
                    .unwrap_or(&self.default_city);
                QueryIntent::general(city)
            }
        }
    }
}
