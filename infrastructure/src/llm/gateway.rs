//! OpenAI-compatible implementation of [`LlmGateway`].
//!
//! Both calls go to `POST {base_url}/chat/completions`:
//!
//! | Call | Mode | Tools offered |
//! |------|------|---------------|
//! | `plan_tools` | single response | the registered catalog tools |
//! | `synthesize` | SSE stream | the answer function only |
//!
//! The synthesis stream is read on its own task and forwarded through a
//! bounded channel; dropping the [`SynthesisStream`] ends the task and
//! closes the connection.

use async_trait::async_trait;
use futures::StreamExt;
use planner_application::ports::llm_gateway::{
    GatewayError, LlmGateway, PlanningRequest, SynthesisRequest, SynthesisStream,
};
use planner_domain::util::ellipsize;
use planner_domain::{SynthesisEvent, ToolInvocation};
use serde_json::{Value, json};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info};

use super::protocol::{SseDecoder, StreamAssembler, chat_messages, function_tool, parse_tool_calls};
use crate::config::FileLlmConfig;

/// Buffered synthesis events between the reader task and the turn
const STREAM_BUFFER: usize = 64;

/// Gateway speaking the chat-completions protocol
#[derive(Clone)]
pub struct OpenAiGateway {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    planning_model: String,
    synthesis_model: String,
    max_tokens: u32,
}

impl OpenAiGateway {
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Other(format!("HTTP client: {}", e)))?;
        let defaults = FileLlmConfig::default();
        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            api_key,
            planning_model: defaults.planning_model,
            synthesis_model: defaults.synthesis_model,
            max_tokens: defaults.max_tokens,
        })
    }

    /// Gateway for the `[llm]` section, reading the key from its env var
    pub fn from_config(config: &FileLlmConfig) -> Result<Self, GatewayError> {
        Ok(Self::new(
            &config.base_url,
            config.api_key(),
            Duration::from_secs(config.timeout_seconds),
        )?
        .with_models(&config.planning_model, &config.synthesis_model)
        .with_max_tokens(config.max_tokens))
    }

    pub fn with_models(mut self, planning: &str, synthesis: &str) -> Self {
        self.planning_model = planning.to_string();
        self.synthesis_model = synthesis.to_string();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn planning_body(&self, request: &PlanningRequest) -> Value {
        let mut body = json!({
            "model": self.planning_model,
            "messages": chat_messages(&request.system_prompt, &request.messages),
            "temperature": 0.2,
        });
        if !request.tools.is_empty() {
            body["tools"] = Value::Array(request.tools.iter().map(function_tool).collect());
            body["tool_choice"] = json!("auto");
        }
        body
    }

    fn synthesis_body(&self, request: &SynthesisRequest) -> Value {
        json!({
            "model": self.synthesis_model,
            "messages": chat_messages(&request.system_prompt, &request.messages),
            "tools": [function_tool(&request.answer_schema)],
            "tool_choice": "auto",
            "max_tokens": self.max_tokens,
            "stream": true,
        })
    }

    async fn send(&self, body: &Value, model: &str) -> Result<reqwest::Response, GatewayError> {
        let mut builder = self.client.post(&self.endpoint).json(body);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }
        let response = builder.send().await.map_err(request_error)?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let text = response.text().await.unwrap_or_default();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(GatewayError::ModelNotAvailable(model.to_string()));
        }
        Err(GatewayError::RequestFailed(format!(
            "HTTP {}: {}",
            status.as_u16(),
            ellipsize(&text, 200)
        )))
    }
}

fn request_error(e: reqwest::Error) -> GatewayError {
    if e.is_timeout() {
        GatewayError::Timeout
    } else if e.is_connect() {
        GatewayError::ConnectionError(e.to_string())
    } else {
        GatewayError::RequestFailed(e.to_string())
    }
}

#[async_trait]
impl LlmGateway for OpenAiGateway {
    async fn plan_tools(&self, request: PlanningRequest) -> Result<Vec<ToolInvocation>, GatewayError> {
        let body = self.planning_body(&request);
        let response = self.send(&body, &self.planning_model).await?;
        let value: Value = response
            .json()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;

        let invocations = parse_tool_calls(&value).map_err(GatewayError::InvalidResponse)?;
        info!(
            "Planning model requested {} tool call(s)",
            invocations.len()
        );
        Ok(invocations)
    }

    async fn synthesize(&self, request: SynthesisRequest) -> Result<SynthesisStream, GatewayError> {
        let body = self.synthesis_body(&request);
        let response = self.send(&body, &self.synthesis_model).await?;

        let (tx, rx) = mpsc::channel(STREAM_BUFFER);
        let mut bytes = response.bytes_stream();
        tokio::spawn(async move {
            let mut decoder = SseDecoder::new();
            let mut assembler = StreamAssembler::new();

            loop {
                let item = tokio::select! {
                    _ = tx.closed() => {
                        debug!("Synthesis receiver dropped; closing stream");
                        return;
                    }
                    item = bytes.next() => item,
                };
                let Some(item) = item else {
                    break;
                };
                let chunk = match item {
                    Ok(chunk) => chunk,
                    Err(e) => {
                        let _ = tx.send(SynthesisEvent::Error(e.to_string())).await;
                        return;
                    }
                };
                for payload in decoder.push_bytes(&chunk) {
                    for event in assembler.accept(&payload) {
                        if tx.send(event).await.is_err() {
                            return;
                        }
                    }
                    if assembler.is_finished() {
                        return;
                    }
                }
            }

            // Connection closed without [DONE]
            let mut tail = decoder
                .finish()
                .map(|payload| assembler.accept(&payload))
                .unwrap_or_default();
            tail.extend(assembler.finish());
            for event in tail {
                if tx.send(event).await.is_err() {
                    return;
                }
            }
        });

        Ok(SynthesisStream::new(rx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use planner_domain::Message;

    fn gateway() -> OpenAiGateway {
        OpenAiGateway::new("http://localhost:1/v1/", None, Duration::from_secs(5))
            .unwrap()
            .with_models("planner-model", "writer-model")
            .with_max_tokens(300)
    }

    #[test]
    fn test_endpoint_join() {
        assert_eq!(gateway().endpoint(), "http://localhost:1/v1/chat/completions");
    }

    #[test]
    fn test_planning_body() {
        let request = PlanningRequest {
            system_prompt: "plan".into(),
            messages: vec![Message::user("dinner in Ottawa")],
            tools: vec![json!({
                "name": "web_search",
                "description": "Search",
                "input_schema": { "type": "object" }
            })],
        };
        let body = gateway().planning_body(&request);
        assert_eq!(body["model"], "planner-model");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "dinner in Ottawa");
        assert_eq!(body["tools"][0]["function"]["name"], "web_search");
        assert_eq!(body["tool_choice"], "auto");
        assert!(body.get("stream").is_none());
    }

    #[test]
    fn test_planning_body_without_tools() {
        let request = PlanningRequest {
            system_prompt: "plan".into(),
            messages: Vec::new(),
            tools: Vec::new(),
        };
        let body = gateway().planning_body(&request);
        assert!(body.get("tools").is_none());
        assert!(body.get("tool_choice").is_none());
    }

    #[test]
    fn test_synthesis_body_streams_with_answer_function() {
        let request = SynthesisRequest {
            system_prompt: "write".into(),
            messages: vec![Message::user("candidates...")],
            answer_schema: planner_domain::PlannerPromptTemplate::answer_schema(),
        };
        let body = gateway().synthesis_body(&request);
        assert_eq!(body["model"], "writer-model");
        assert_eq!(body["stream"], true);
        assert_eq!(body["max_tokens"], 300);
        assert_eq!(
            body["tools"][0]["function"]["name"],
            planner_domain::ANSWER_FUNCTION_NAME
        );
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_connection_error() {
        let err = gateway()
            .plan_tools(PlanningRequest {
                system_prompt: "plan".into(),
                messages: Vec::new(),
                tools: Vec::new(),
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            GatewayError::ConnectionError(_) | GatewayError::RequestFailed(_)
        ));
    }
}
