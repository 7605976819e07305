//! Intent classifier port
//!
//! The analyzer makes one classification attempt per turn through this
//! port. [`KeywordIntentClassifier`] is the built-in implementation.

use async_trait::async_trait;
use planner_domain::intent::classify;
use planner_domain::{Constraints, QueryIntent};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("Classifier unavailable: {0}")]
    Unavailable(String),

    #[error("Classification failed: {0}")]
    Failed(String),
}

#[async_trait]
pub trait IntentClassifierPort: Send + Sync {
    async fn classify(
        &self,
        utterance: &str,
        constraints: &Constraints,
    ) -> Result<QueryIntent, ClassifierError>;
}

/// Fixed keyword-table classifier
pub struct KeywordIntentClassifier;

#[async_trait]
impl IntentClassifierPort for KeywordIntentClassifier {
    async fn classify(
        &self,
        utterance: &str,
        constraints: &Constraints,
    ) -> Result<QueryIntent, ClassifierError> {
        Ok(classify(utterance, constraints))
    }
}
