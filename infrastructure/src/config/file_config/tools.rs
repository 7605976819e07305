//! Tools configuration from TOML (`[tools]` section)
//!
//! The two knowledge-store tools are always served in-process. Every other
//! catalog tool is served by an HTTP adapter when it has an endpoint.
//!
//! Example configuration:
//!
//! ```toml
//! [tools]
//! knowledge_seed = "data/date_ideas.json"
//! disabled = ["scrapingbee_scrape"]
//!
//! [tools.endpoints]
//! google_places_search = "http://localhost:8081/places"
//! eventbrite_search = "http://localhost:8081/events"
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileToolsConfig {
    /// Tool name -> adapter URL
    pub endpoints: BTreeMap<String, String>,
    /// JSON file of curated date ideas (built-in seed when unset)
    pub knowledge_seed: Option<PathBuf>,
    /// Tools never registered, even when an endpoint is configured
    pub disabled: Vec<String>,
}

impl FileToolsConfig {
    pub fn is_disabled(&self, tool: &str) -> bool {
        self.disabled.iter().any(|d| d == tool)
    }
}
