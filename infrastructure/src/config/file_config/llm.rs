//! LLM configuration from TOML (`[llm]` section)
//!
//! ```toml
//! [llm]
//! base_url = "https://api.openai.com/v1"
//! api_key_env = "OPENAI_API_KEY"
//! planning_model = "gpt-4o-mini"
//! synthesis_model = "gpt-4o-mini"
//! timeout_seconds = 60
//! ```

use serde::{Deserialize, Serialize};

/// OpenAI-compatible chat completions endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLlmConfig {
    /// Base URL of the API, without the `/chat/completions` suffix.
    pub base_url: String,
    /// Environment variable holding the API key (default: "OPENAI_API_KEY").
    pub api_key_env: String,
    /// Model used for the tool-planning call.
    pub planning_model: String,
    /// Model used for the streamed answer.
    pub synthesis_model: String,
    /// HTTP timeout for a single request.
    pub timeout_seconds: u64,
    /// Upper bound on generated tokens for the answer.
    pub max_tokens: u32,
}

impl Default for FileLlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            planning_model: "gpt-4o-mini".to_string(),
            synthesis_model: "gpt-4o-mini".to_string(),
            timeout_seconds: 60,
            max_tokens: 600,
        }
    }
}

impl FileLlmConfig {
    /// API key read from the configured environment variable
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
    }
}
