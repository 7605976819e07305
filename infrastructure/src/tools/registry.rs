//! Tool Registry
//!
//! The [`ToolRegistry`] maps canonical tool names to the providers that
//! implement them. The set of names is closed: only the eleven tools of
//! [`catalog`] can be registered, each at most once.
//!
//! # Usage
//!
//! ```ignore
//! use planner_infrastructure::tools::{KnowledgeSearchTool, ToolRegistry};
//!
//! let registry = ToolRegistry::new()
//!     .register(KnowledgeSearchTool::new(store.clone()))?
//!     .register(FeaturedDatesTool::new(store))?;
//!
//! assert!(registry.has_tool("search_date_ideas"));
//! let provider = registry.get("search_date_ideas")?;
//! ```
//!
//! # Rejection at start-up
//!
//! Registration errors are configuration errors. They surface while the
//! binary wires its dependencies, never during a turn.

use std::collections::HashMap;
use std::sync::Arc;

use planner_domain::tool::catalog;
use planner_domain::{DomainError, ToolDefinition, ToolProvider};
use thiserror::Error;

/// Error raised while building the registry
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Tool '{0}' is not part of the tool catalog")]
    NotInCatalog(String),

    #[error("Tool '{0}' is already registered")]
    Duplicate(String),
}

/// Registry of tool providers keyed by canonical name
#[derive(Default)]
pub struct ToolRegistry {
    providers: HashMap<String, Arc<dyn ToolProvider>>,
}

impl ToolRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool provider
    pub fn register<P: ToolProvider + 'static>(self, provider: P) -> Result<Self, RegistryError> {
        self.register_arc(Arc::new(provider))
    }

    /// Register a tool provider (Arc version)
    pub fn register_arc(mut self, provider: Arc<dyn ToolProvider>) -> Result<Self, RegistryError> {
        let name = provider.name().to_string();
        if !catalog::is_catalog_tool(&name) {
            return Err(RegistryError::NotInCatalog(name));
        }
        if self.providers.contains_key(&name) {
            return Err(RegistryError::Duplicate(name));
        }
        tracing::debug!(tool = %name, "Registered tool");
        self.providers.insert(name, provider);
        Ok(self)
    }

    /// Look up the provider for a tool
    pub fn get(&self, name: &str) -> Result<&dyn ToolProvider, DomainError> {
        self.providers
            .get(name)
            .map(|p| p.as_ref())
            .ok_or_else(|| DomainError::UnknownTool(name.to_string()))
    }

    /// Shared handle to a provider, for spawning its call on another task
    pub(crate) fn provider(&self, name: &str) -> Option<Arc<dyn ToolProvider>> {
        self.providers.get(name).cloned()
    }

    pub fn has_tool(&self, name: &str) -> bool {
        self.providers.contains_key(name)
    }

    /// Definitions of every registered tool, highest priority first
    pub fn list(&self) -> Vec<&ToolDefinition> {
        let mut definitions: Vec<&ToolDefinition> =
            self.providers.values().map(|p| p.definition()).collect();
        definitions.sort_by_key(|d| catalog::priority(&d.name));
        definitions
    }

    /// Owned copy of [`list`](Self::list), for the planning prompt
    pub fn tool_spec(&self) -> Vec<ToolDefinition> {
        self.list().into_iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use planner_domain::{EntityRecord, ErrorKind, ProviderError, ToolInvocation};

    struct NamedProvider {
        definition: ToolDefinition,
    }

    impl NamedProvider {
        fn new(name: &str) -> Self {
            Self {
                definition: catalog::definition(name)
                    .unwrap_or_else(|| ToolDefinition::new(name, "test tool")),
            }
        }
    }

    #[async_trait]
    impl ToolProvider for NamedProvider {
        fn definition(&self) -> &ToolDefinition {
            &self.definition
        }

        async fn invoke(
            &self,
            _invocation: &ToolInvocation,
        ) -> Result<Vec<EntityRecord>, ProviderError> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_list_follows_priority() {
        let registry = ToolRegistry::new()
            .register(NamedProvider::new(catalog::GET_DIRECTIONS))
            .unwrap()
            .register(NamedProvider::new(catalog::ENHANCED_WEB_SEARCH))
            .unwrap()
            .register(NamedProvider::new(catalog::SEARCH_DATE_IDEAS))
            .unwrap();

        let names: Vec<&str> = registry.list().iter().map(|d| d.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                catalog::SEARCH_DATE_IDEAS,
                catalog::ENHANCED_WEB_SEARCH,
                catalog::GET_DIRECTIONS
            ]
        );
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.tool_spec().len(), 3);
    }

    #[test]
    fn test_rejects_names_outside_catalog() {
        let err = ToolRegistry::new()
            .register(NamedProvider::new("read_file"))
            .err()
            .unwrap();
        assert_eq!(err, RegistryError::NotInCatalog("read_file".into()));
    }

    #[test]
    fn test_rejects_duplicates() {
        let err = ToolRegistry::new()
            .register(NamedProvider::new(catalog::WEB_SEARCH))
            .unwrap()
            .register(NamedProvider::new(catalog::WEB_SEARCH))
            .err()
            .unwrap();
        assert_eq!(err, RegistryError::Duplicate(catalog::WEB_SEARCH.into()));
    }

    #[test]
    fn test_get_unknown_tool() {
        let registry = ToolRegistry::new();
        let err = registry.get(catalog::GEOCODE_LOCATION).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::UnknownTool);
        assert!(registry.is_empty());
        assert!(!registry.has_tool(catalog::GEOCODE_LOCATION));
    }
}
