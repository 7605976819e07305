//! HTTP-backed tool provider.
//!
//! Real-time tools (place search, web search, scraping, events, geocoding,
//! directions) are served by external adapter services. Each configured
//! tool is an [`HttpToolProvider`] that POSTs the call to its endpoint:
//!
//! ```text
//! POST <endpoint>
//! { "tool": "google_places_search", "arguments": { "query": "sushi" } }
//!
//! 200 OK
//! { "items": [ { "kind": "venue", "title": "...", "geo": {...} }, ... ] }
//! ```
//!
//! A bare JSON array of records is accepted as well.

use async_trait::async_trait;
use planner_domain::tool::catalog;
use planner_domain::{EntityRecord, ProviderError, ToolDefinition, ToolInvocation, ToolProvider};
use serde::Deserialize;
use serde_json::json;

const USER_AGENT: &str = concat!("date-planner/", env!("CARGO_PKG_VERSION"));

#[derive(Deserialize)]
#[serde(untagged)]
enum ProviderResponse {
    Wrapped { items: Vec<EntityRecord> },
    Bare(Vec<EntityRecord>),
}

impl ProviderResponse {
    fn into_items(self) -> Vec<EntityRecord> {
        match self {
            ProviderResponse::Wrapped { items } => items,
            ProviderResponse::Bare(items) => items,
        }
    }
}

/// Catalog tool served by a remote HTTP endpoint
pub struct HttpToolProvider {
    definition: ToolDefinition,
    endpoint: String,
    client: reqwest::Client,
}

impl HttpToolProvider {
    /// Provider for catalog tool `name`, or `None` if the name is not in the catalog
    pub fn new(name: &str, endpoint: impl Into<String>, client: reqwest::Client) -> Option<Self> {
        Some(Self {
            definition: catalog::definition(name)?,
            endpoint: endpoint.into(),
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ToolProvider for HttpToolProvider {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn invoke(&self, invocation: &ToolInvocation) -> Result<Vec<EntityRecord>, ProviderError> {
        let body = json!({
            "tool": invocation.tool_name,
            "arguments": invocation.arguments,
        });

        let response = self
            .client
            .post(&self.endpoint)
            .header("User-Agent", USER_AGENT)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    ProviderError::NotAvailable(format!("{}: {}", self.endpoint, e))
                } else {
                    ProviderError::ExecutionFailed(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::ExecutionFailed(format!(
                "HTTP error: {} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        let parsed: ProviderResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;
        Ok(parsed.into_items())
    }
}
