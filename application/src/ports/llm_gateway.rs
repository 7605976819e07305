//! LLM Gateway port
//!
//! Defines the interface for the two LLM calls of a turn: tool planning
//! (function calling) and answer synthesis (streamed).

use async_trait::async_trait;
use planner_domain::{Message, SynthesisEvent, ToolInvocation};
use serde_json::Value;
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors that can occur during LLM gateway operations
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout")]
    Timeout,

    #[error("Other error: {0}")]
    Other(String),
}

/// Input for the tool-planning call
#[derive(Debug, Clone)]
pub struct PlanningRequest {
    pub system_prompt: String,
    /// Prior conversation followed by the planning prompt
    pub messages: Vec<Message>,
    /// Tool schemas the model may call
    pub tools: Vec<Value>,
}

/// Input for the synthesis call
#[derive(Debug, Clone)]
pub struct SynthesisRequest {
    pub system_prompt: String,
    pub messages: Vec<Message>,
    /// Function schema for the structured answer
    pub answer_schema: Value,
}

/// Gateway for LLM communication
///
/// This port defines how the application layer communicates with LLM providers.
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait LlmGateway: Send + Sync {
    /// Ask the model which tools to call.
    ///
    /// Returns the requested invocations (origin `Llm`), possibly empty.
    async fn plan_tools(&self, request: PlanningRequest) -> Result<Vec<ToolInvocation>, GatewayError>;

    /// Start a streamed synthesis.
    async fn synthesize(&self, request: SynthesisRequest) -> Result<SynthesisStream, GatewayError>;
}

/// Handle for receiving streaming events from a synthesis call.
///
/// Wraps an `mpsc::Receiver<SynthesisEvent>` and provides convenience methods
/// for consuming the stream.
pub struct SynthesisStream {
    pub receiver: mpsc::Receiver<SynthesisEvent>,
}

impl SynthesisStream {
    pub fn new(receiver: mpsc::Receiver<SynthesisEvent>) -> Self {
        Self { receiver }
    }

    /// A stream that yields the given events and then closes
    pub fn from_events(events: Vec<SynthesisEvent>) -> Self {
        let (tx, rx) = mpsc::channel(events.len().max(1));
        for event in events {
            // Capacity covers every event, so this never fails
            let _ = tx.try_send(event);
        }
        Self::new(rx)
    }

    pub async fn recv(&mut self) -> Option<SynthesisEvent> {
        self.receiver.recv().await
    }

    /// Consume the stream and collect all text into a single string.
    pub async fn collect_text(mut self) -> Result<String, GatewayError> {
        let mut full_text = String::new();
        while let Some(event) = self.receiver.recv().await {
            match event {
                SynthesisEvent::Delta(chunk) => full_text.push_str(&chunk),
                SynthesisEvent::Structured(_) => {}
                SynthesisEvent::Completed(text) => {
                    if full_text.is_empty() {
                        return Ok(text);
                    }
                    return Ok(full_text);
                }
                SynthesisEvent::Error(e) => {
                    return Err(GatewayError::RequestFailed(e));
                }
            }
        }
        // Channel closed without Completed; return what we have
        Ok(full_text)
    }
}
