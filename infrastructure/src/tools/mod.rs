//! Tool adapters for the planning turn
//!
//! ## Providers
//!
//! - `knowledge`: `search_date_ideas` and `search_featured_dates`, backed by
//!   a [`KnowledgeStore`]; always available unless disabled
//! - `http_provider`: every other catalog tool, served by an HTTP endpoint
//!   configured under `[tools.endpoints]`
//!
//! [`ParallelToolExecutor`] runs a batch of calls over the [`ToolRegistry`]
//! with a worker bound, per-call timeouts and a TTL [`ResultCache`].

mod cache;
mod executor;
mod http_provider;
mod knowledge;
mod registry;
mod schema;

pub use cache::{DEFAULT_CACHE_TTL, ResultCache};
pub use executor::{DEFAULT_MAX_WORKERS, ParallelToolExecutor};
pub use http_provider::HttpToolProvider;
pub use knowledge::{FeaturedDatesTool, KnowledgeSearchTool, is_featured};
pub use registry::{RegistryError, ToolRegistry};
pub use schema::JsonSchemaToolConverter;

use crate::config::FileToolsConfig;
use planner_application::KnowledgeStore;
use planner_domain::tool::catalog;
use std::sync::Arc;
use tracing::{debug, info};

/// Build the registry described by `[tools]`.
///
/// The knowledge tools are registered over `store`; each configured
/// endpoint becomes an [`HttpToolProvider`]. Disabled names are skipped.
pub fn build_registry(
    config: &FileToolsConfig,
    store: Arc<dyn KnowledgeStore>,
    client: reqwest::Client,
    knowledge_top_k: usize,
) -> Result<ToolRegistry, RegistryError> {
    let mut registry = ToolRegistry::new();

    if !config.is_disabled(catalog::SEARCH_DATE_IDEAS) {
        registry = registry
            .register(KnowledgeSearchTool::new(store.clone()).with_default_top_k(knowledge_top_k))?;
    }
    if !config.is_disabled(catalog::SEARCH_FEATURED_DATES) {
        registry = registry.register(FeaturedDatesTool::new(store))?;
    }

    for (name, endpoint) in &config.endpoints {
        if config.is_disabled(name) {
            debug!("Tool '{}' is disabled; skipping its endpoint", name);
            continue;
        }
        let provider = HttpToolProvider::new(name, endpoint.clone(), client.clone())
            .ok_or_else(|| RegistryError::NotInCatalog(name.clone()))?;
        registry = registry.register(provider)?;
    }

    info!(
        "Registered {} tool(s): {}",
        registry.len(),
        registry
            .list()
            .iter()
            .map(|d| d.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );
    Ok(registry)
}
