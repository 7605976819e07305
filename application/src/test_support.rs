//! In-memory port implementations for use-case tests.

use crate::ports::chat_history::{ChatHistoryPort, HistoryError};
use crate::ports::llm_gateway::{
    GatewayError, LlmGateway, PlanningRequest, SynthesisRequest, SynthesisStream,
};
use crate::ports::tool_executor::ToolExecutorPort;
use crate::ports::tool_schema::ToolSchemaPort;
use async_trait::async_trait;
use futures::future::join_all;
use planner_domain::tool::catalog;
use planner_domain::{
    ConversationTurn, EntityRecord, Message, SynthesisEvent, ToolDefinition, ToolError,
    ToolInvocation, ToolResult,
};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Gateway that replays fixed responses
pub struct ScriptedGateway {
    pub planned: Mutex<Option<Result<Vec<ToolInvocation>, String>>>,
    pub synthesis: Mutex<Option<Result<Vec<SynthesisEvent>, String>>>,
    pub synthesis_delay: Duration,
    pub planning_calls: AtomicUsize,
    pub synthesis_calls: AtomicUsize,
    pub last_synthesis_prompt: Mutex<Option<String>>,
}

impl ScriptedGateway {
    pub fn new(planned: Vec<ToolInvocation>, synthesis: Vec<SynthesisEvent>) -> Self {
        Self {
            planned: Mutex::new(Some(Ok(planned))),
            synthesis: Mutex::new(Some(Ok(synthesis))),
            synthesis_delay: Duration::ZERO,
            planning_calls: AtomicUsize::new(0),
            synthesis_calls: AtomicUsize::new(0),
            last_synthesis_prompt: Mutex::new(None),
        }
    }

    pub fn failing_planning(mut self) -> Self {
        self.planned = Mutex::new(Some(Err("planner offline".into())));
        self
    }

    pub fn failing_synthesis(mut self) -> Self {
        self.synthesis = Mutex::new(Some(Err("upstream 500 from provider".into())));
        self
    }

    pub fn with_synthesis_delay(mut self, delay: Duration) -> Self {
        self.synthesis_delay = delay;
        self
    }
}

#[async_trait]
impl LlmGateway for ScriptedGateway {
    async fn plan_tools(&self, _request: PlanningRequest) -> Result<Vec<ToolInvocation>, GatewayError> {
        self.planning_calls.fetch_add(1, Ordering::SeqCst);
        match self.planned.lock().unwrap().take() {
            Some(Ok(invocations)) => Ok(invocations),
            Some(Err(e)) => Err(GatewayError::RequestFailed(e)),
            None => Ok(Vec::new()),
        }
    }

    async fn synthesize(&self, request: SynthesisRequest) -> Result<SynthesisStream, GatewayError> {
        self.synthesis_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_synthesis_prompt.lock().unwrap() =
            request.messages.last().map(|m| m.content.clone());
        if !self.synthesis_delay.is_zero() {
            tokio::time::sleep(self.synthesis_delay).await;
        }
        let scripted = self.synthesis.lock().unwrap().take();
        match scripted {
            Some(Ok(events)) => Ok(SynthesisStream::from_events(events)),
            Some(Err(e)) => Err(GatewayError::RequestFailed(e)),
            None => Ok(SynthesisStream::from_events(vec![SynthesisEvent::Completed(
                String::new(),
            )])),
        }
    }
}

/// Per-tool canned behaviour
#[derive(Clone)]
pub enum StubBehavior {
    Items(Vec<EntityRecord>),
    Fail(String),
    Slow(Duration, Vec<EntityRecord>),
}

/// Executor that answers from a table and honours cancellation
pub struct StubExecutor {
    behaviors: HashMap<String, StubBehavior>,
    pub batches: Mutex<Vec<Vec<String>>>,
}

impl StubExecutor {
    pub fn new() -> Self {
        Self {
            behaviors: HashMap::new(),
            batches: Mutex::new(Vec::new()),
        }
    }

    pub fn with(mut self, tool: &str, behavior: StubBehavior) -> Self {
        self.behaviors.insert(tool.to_string(), behavior);
        self
    }

    pub fn batch_tools(&self) -> Vec<Vec<String>> {
        self.batches.lock().unwrap().clone()
    }

    async fn run_one(&self, invocation: &ToolInvocation, cancel: &CancellationToken) -> ToolResult {
        let tool = invocation.tool_name.clone();
        match self.behaviors.get(&tool).cloned() {
            Some(StubBehavior::Items(items)) => ToolResult::success(tool, items, 1),
            Some(StubBehavior::Fail(message)) => {
                ToolResult::failure(tool, ToolError::failure(message), 1)
            }
            Some(StubBehavior::Slow(delay, items)) => {
                tokio::select! {
                    _ = cancel.cancelled() => ToolResult::failure(tool, ToolError::cancelled(), 0),
                    _ = tokio::time::sleep(delay) => {
                        ToolResult::success(tool, items, delay.as_millis() as u64)
                    }
                }
            }
            None => ToolResult::success(tool, Vec::new(), 1),
        }
    }
}

#[async_trait]
impl ToolExecutorPort for StubExecutor {
    fn definitions(&self) -> Vec<ToolDefinition> {
        catalog::catalog()
    }

    async fn run_batch(
        &self,
        invocations: &[ToolInvocation],
        _per_call_timeout: Duration,
        cancel: &CancellationToken,
    ) -> Vec<ToolResult> {
        self.batches
            .lock()
            .unwrap()
            .push(invocations.iter().map(|i| i.tool_name.clone()).collect());
        join_all(invocations.iter().map(|inv| self.run_one(inv, cancel))).await
    }
}

pub struct NameOnlySchema;

impl ToolSchemaPort for NameOnlySchema {
    fn tool_to_schema(&self, tool: &ToolDefinition) -> Value {
        json!({ "name": tool.name })
    }
}

/// History that remembers recorded turns
#[derive(Default)]
pub struct RecordingHistory {
    pub turns: Mutex<Vec<ConversationTurn>>,
    pub forgotten: Mutex<Vec<String>>,
}

#[async_trait]
impl ChatHistoryPort for RecordingHistory {
    async fn recent_messages(
        &self,
        session_id: &str,
        limit: usize,
    ) -> Result<Vec<Message>, HistoryError> {
        let turns = self.turns.lock().unwrap();
        let mut messages: Vec<Message> = turns
            .iter()
            .filter(|t| t.session_id == session_id)
            .flat_map(|t| {
                [
                    Message::user(t.user_utterance.clone()),
                    Message::assistant(t.answer_text.clone()),
                ]
            })
            .collect();
        let skip = messages.len().saturating_sub(limit);
        Ok(messages.split_off(skip))
    }

    async fn record_turn(&self, turn: &ConversationTurn) -> Result<(), HistoryError> {
        self.turns.lock().unwrap().push(turn.clone());
        Ok(())
    }

    async fn forget_session(&self, session_id: &str) -> Result<(), HistoryError> {
        self.turns.lock().unwrap().retain(|t| t.session_id != session_id);
        self.forgotten.lock().unwrap().push(session_id.to_string());
        Ok(())
    }
}

/// Structured answer payload referencing the given candidate ids
pub fn answer_payload(ids: &[&str]) -> Value {
    json!({
        "summary": "Here are a few ideas.",
        "options": ids
            .iter()
            .map(|id| json!({
                "title": format!("Option {}", id),
                "why_it_fits": "Close by and within budget",
                "candidate_id": id,
            }))
            .collect::<Vec<_>>(),
    })
}
