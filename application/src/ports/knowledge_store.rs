//! Knowledge store port
//!
//! The curated date-idea index behind `search_date_ideas` and
//! `search_featured_dates`. Results carry a `similarity_score`.

use async_trait::async_trait;
use planner_domain::{EntityRecord, ToolInvocation};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum KnowledgeStoreError {
    #[error("Knowledge store unavailable: {0}")]
    Unavailable(String),

    #[error("Search failed: {0}")]
    SearchFailed(String),
}

/// Metadata filters applied on top of similarity ranking
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchFilters {
    pub city: Option<String>,
    pub max_price_tier: Option<u8>,
    pub indoor: Option<bool>,
    pub categories: Vec<String>,
    pub min_duration: Option<u32>,
    pub max_duration: Option<u32>,
}

impl SearchFilters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.categories.push(category.into());
        self
    }

    /// Read the filter arguments of a knowledge-store tool call
    pub fn from_invocation(invocation: &ToolInvocation) -> Self {
        let mut categories = invocation.get_string_list("categories");
        if let Some(category) = invocation.get_str("category") {
            categories.push(category.to_string());
        }
        Self {
            city: invocation.get_str("city").map(str::to_string),
            max_price_tier: invocation
                .get_u64("max_price_tier")
                .and_then(|t| u8::try_from(t).ok()),
            indoor: invocation.get_bool("indoor"),
            categories,
            min_duration: invocation
                .get_u64("min_duration")
                .and_then(|d| u32::try_from(d).ok()),
            max_duration: invocation
                .get_u64("max_duration")
                .and_then(|d| u32::try_from(d).ok()),
        }
    }
}

/// Port for semantic search over curated date ideas
#[async_trait]
pub trait KnowledgeStore: Send + Sync {
    /// Up to `top_k` records, best match first
    async fn search(
        &self,
        query: &str,
        filters: &SearchFilters,
        top_k: usize,
    ) -> Result<Vec<EntityRecord>, KnowledgeStoreError>;
}
