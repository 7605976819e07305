//! Knowledge-store tools: `search_date_ideas` and `search_featured_dates`.
//!
//! Both tools are thin adapters over the [`KnowledgeStore`] port. The
//! featured search runs a fixed "special occasion" query and keeps only
//! records whose title or description carries a featured keyword.

use async_trait::async_trait;
use planner_application::ports::knowledge_store::{KnowledgeStore, KnowledgeStoreError, SearchFilters};
use planner_domain::tool::catalog;
use planner_domain::{EntityRecord, ProviderError, ToolDefinition, ToolInvocation, ToolProvider};
use std::sync::Arc;

/// Results returned when the call does not ask for a specific `top_k`
pub const DEFAULT_TOP_K: usize = 10;

/// Query sent to the store by `search_featured_dates`
pub const FEATURED_QUERY: &str = "featured unique special romantic exclusive";

/// Words that mark a record as featured
pub const FEATURED_KEYWORDS: [&str; 6] =
    ["featured", "exclusive", "unique", "special", "signature", "premium"];

fn store_error(e: KnowledgeStoreError) -> ProviderError {
    match e {
        KnowledgeStoreError::Unavailable(msg) => ProviderError::NotAvailable(msg),
        KnowledgeStoreError::SearchFailed(msg) => ProviderError::ExecutionFailed(msg),
    }
}

/// `search_date_ideas`: semantic search with metadata filters
pub struct KnowledgeSearchTool {
    definition: ToolDefinition,
    store: Arc<dyn KnowledgeStore>,
    default_top_k: usize,
}

impl KnowledgeSearchTool {
    pub fn new(store: Arc<dyn KnowledgeStore>) -> Self {
        Self {
            definition: catalog::definition(catalog::SEARCH_DATE_IDEAS)
                .unwrap_or_else(|| ToolDefinition::new(catalog::SEARCH_DATE_IDEAS, "")),
            store,
            default_top_k: DEFAULT_TOP_K,
        }
    }

    pub fn with_default_top_k(mut self, top_k: usize) -> Self {
        self.default_top_k = top_k.max(1);
        self
    }
}

#[async_trait]
impl ToolProvider for KnowledgeSearchTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn invoke(&self, invocation: &ToolInvocation) -> Result<Vec<EntityRecord>, ProviderError> {
        let query = invocation.get_str("query").unwrap_or_default();
        let top_k = invocation
            .get_u64("top_k")
            .and_then(|k| usize::try_from(k).ok())
            .filter(|k| *k > 0)
            .unwrap_or(self.default_top_k);
        let filters = SearchFilters::from_invocation(invocation);

        self.store
            .search(query, &filters, top_k)
            .await
            .map_err(store_error)
    }
}

/// `search_featured_dates`: featured or special items from the store
pub struct FeaturedDatesTool {
    definition: ToolDefinition,
    store: Arc<dyn KnowledgeStore>,
}

impl FeaturedDatesTool {
    pub fn new(store: Arc<dyn KnowledgeStore>) -> Self {
        Self {
            definition: catalog::definition(catalog::SEARCH_FEATURED_DATES)
                .unwrap_or_else(|| ToolDefinition::new(catalog::SEARCH_FEATURED_DATES, "")),
            store,
        }
    }
}

/// Whether a record's title or description names a featured keyword
pub fn is_featured(record: &EntityRecord) -> bool {
    let text = format!("{} {}", record.title, record.description).to_lowercase();
    FEATURED_KEYWORDS.iter().any(|k| text.contains(k))
}

#[async_trait]
impl ToolProvider for FeaturedDatesTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn invoke(&self, invocation: &ToolInvocation) -> Result<Vec<EntityRecord>, ProviderError> {
        let filters = SearchFilters::from_invocation(invocation);
        let records = self
            .store
            .search(FEATURED_QUERY, &filters, DEFAULT_TOP_K)
            .await
            .map_err(store_error)?;
        Ok(records.into_iter().filter(is_featured).collect())
    }
}
