//! Run Turn use case
//!
//! Drives one conversational turn through its lifecycle:
//!
//! | Phase              | Work                                                   |
//! |--------------------|--------------------------------------------------------|
//! | 1. Planning        | intent analysis, LLM tool choice, diversity forcing    |
//! | 2. Executing tools | one concurrent batch, bounded by the turn budget       |
//! | 3. Reflecting      | aggregation; one extra round when nothing was found    |
//! | 4. Synthesizing    | LLM answer over the candidate list                     |
//! | 5. Streaming       | text deltas, then the validated structured answer      |
//!
//! Tool failures only thin out the candidates. A turn ends `failed` when
//! synthesis fails or the lifecycle is violated, and `cancelled` when its
//! token fires.

mod planning;
mod synthesis;
mod types;

pub use types::{GENERIC_FAILURE_MESSAGE, RunTurnError, RunTurnInput, TurnControl};

use crate::config::OrchestrationParams;
use crate::ports::chat_history::{ChatHistoryPort, NoChatHistory};
use crate::ports::conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger};
use crate::ports::llm_gateway::LlmGateway;
use crate::ports::tool_executor::ToolExecutorPort;
use crate::ports::tool_schema::ToolSchemaPort;
use crate::use_cases::analyze_intent::AnalyzeIntentUseCase;
use crate::use_cases::shared::{check_cancelled, trim_history};
use planner_domain::util::truncate_str;
use planner_domain::{
    ConversationTurn, ErrorKind, Message, ResultAggregator, SelectionContext, ToolError,
    ToolInvocation, ToolResult, TurnEvent, TurnRequest, TurnStatus,
};
use serde_json::json;
use std::sync::Arc;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

/// Use case for running a single planning turn
pub struct RunTurnUseCase {
    pub(super) gateway: Arc<dyn LlmGateway>,
    pub(super) tool_executor: Arc<dyn ToolExecutorPort>,
    pub(super) tool_schema: Arc<dyn ToolSchemaPort>,
    pub(super) intent_analyzer: AnalyzeIntentUseCase,
    pub(super) history: Arc<dyn ChatHistoryPort>,
    pub(super) conversation_logger: Arc<dyn ConversationLogger>,
    pub(super) params: OrchestrationParams,
    pub(super) aggregator: ResultAggregator,
}

impl Clone for RunTurnUseCase {
    fn clone(&self) -> Self {
        Self {
            gateway: self.gateway.clone(),
            tool_executor: self.tool_executor.clone(),
            tool_schema: self.tool_schema.clone(),
            intent_analyzer: self.intent_analyzer.clone(),
            history: self.history.clone(),
            conversation_logger: self.conversation_logger.clone(),
            params: self.params.clone(),
            aggregator: self.aggregator,
        }
    }
}

impl RunTurnUseCase {
    pub fn new(
        gateway: Arc<dyn LlmGateway>,
        tool_executor: Arc<dyn ToolExecutorPort>,
        tool_schema: Arc<dyn ToolSchemaPort>,
        intent_analyzer: AnalyzeIntentUseCase,
    ) -> Self {
        Self {
            gateway,
            tool_executor,
            tool_schema,
            intent_analyzer,
            history: Arc::new(NoChatHistory),
            conversation_logger: Arc::new(NoConversationLogger),
            params: OrchestrationParams::default(),
            aggregator: ResultAggregator::new(),
        }
    }

    /// Replace the turn parameters; the default city is handed to the
    /// intent analyzer.
    pub fn with_params(mut self, params: OrchestrationParams) -> Self {
        self.intent_analyzer = self
            .intent_analyzer
            .with_default_city(params.default_city.clone());
        self.params = params;
        self
    }

    pub fn with_history(mut self, history: Arc<dyn ChatHistoryPort>) -> Self {
        self.history = history;
        self
    }

    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.conversation_logger = logger;
        self
    }

    pub fn params(&self) -> &OrchestrationParams {
        &self.params
    }

    pub fn history(&self) -> Arc<dyn ChatHistoryPort> {
        self.history.clone()
    }

    /// Run the turn to a terminal state.
    ///
    /// Always returns the finished turn; the outcome is in `turn.status`
    /// and was also announced on `control.events`.
    pub async fn execute(&self, input: RunTurnInput, control: TurnControl) -> ConversationTurn {
        let mut turn = ConversationTurn::new(input.turn_id, &input.request);
        info!(
            "Starting turn {} for session {}: {}",
            turn.turn_id,
            turn.session_id,
            truncate_str(&turn.user_utterance, 100)
        );
        self.conversation_logger.log(ConversationEvent::new(
            "turn_started",
            json!({
                "turn_id": turn.turn_id,
                "session_id": turn.session_id,
                "utterance": turn.user_utterance,
                "constraints": turn.constraints,
                "user_location": turn.user_location,
            }),
        ));

        match self.run_phases(&input.request, &mut turn, &control).await {
            Ok(()) => {
                turn.finish(TurnStatus::Done);
                info!(
                    "Turn {} done: {} candidate(s), {} option(s)",
                    turn.turn_id,
                    turn.candidates.len(),
                    turn.structured_answer
                        .as_ref()
                        .map(|a| a.options.len())
                        .unwrap_or(0)
                );
            }
            Err(e) if e.is_cancelled() => {
                control.lifecycle.cancel();
                turn.finish(TurnStatus::Cancelled);
                info!("Turn {} cancelled", turn.turn_id);
                control.send_terminal(TurnEvent::Cancelled);
            }
            Err(e) => {
                error!("Turn {} failed: {}", turn.turn_id, e);
                if control.lifecycle.transition(TurnStatus::Failed).is_ok() {
                    turn.failure_message = Some(GENERIC_FAILURE_MESSAGE.to_string());
                    turn.finish(TurnStatus::Failed);
                    control
                        .send(TurnEvent::Failed {
                            message: GENERIC_FAILURE_MESSAGE.to_string(),
                        })
                        .await;
                } else {
                    // Cancellation won the race
                    turn.finish(TurnStatus::Cancelled);
                    control.send_terminal(TurnEvent::Cancelled);
                }
            }
        }

        self.persist(&turn).await;
        turn
    }

    async fn run_phases(
        &self,
        request: &TurnRequest,
        turn: &mut ConversationTurn,
        control: &TurnControl,
    ) -> Result<(), RunTurnError> {
        let deadline = Instant::now() + self.params.turn_budget;

        // ==================== Phase 1: Planning ====================
        check_cancelled(&control.cancel)?;
        let intent = self
            .intent_analyzer
            .execute(&turn.user_utterance, &turn.constraints)
            .await;
        self.conversation_logger.log(ConversationEvent::new(
            "intent_analyzed",
            json!({ "turn_id": turn.turn_id, "intent": intent }),
        ));
        turn.intent = Some(intent.clone());

        let history = self.load_history(request).await;
        let invocations = self.plan_invocations(turn, &intent, &history, control).await?;

        // ==================== Phase 2: Executing tools ====================
        self.advance(turn, control, TurnStatus::ExecutingTools)?;
        self.execute_round(turn, invocations, deadline, control).await?;

        // ==================== Phase 3: Reflecting ====================
        self.advance(turn, control, TurnStatus::Reflecting)?;
        turn.candidates = self.aggregator.aggregate(&turn.results);

        if turn.candidates.is_empty() {
            let available = self.tool_executor.available_tools();
            let ctx = SelectionContext::new(&turn.user_utterance, &turn.constraints, &intent)
                .with_location(turn.user_location)
                .with_top_k(self.params.knowledge_top_k)
                .with_available_tools(&available);
            let next = self
                .params
                .selection_policy()
                .reflection_tool(&turn.invoked_tools(), &ctx);

            match next {
                Some(invocation) if Instant::now() < deadline => {
                    info!(
                        "No candidates after first round; trying {} once more",
                        invocation.tool_name
                    );
                    self.advance(turn, control, TurnStatus::ExecutingTools)?;
                    self.execute_round(turn, vec![invocation], deadline, control)
                        .await?;
                    self.advance(turn, control, TurnStatus::Reflecting)?;
                    turn.candidates = self.aggregator.aggregate(&turn.results);
                }
                Some(_) => warn!("Turn budget exhausted; skipping the extra round"),
                None => debug!("No untried recommended tool left for an extra round"),
            }
        }

        info!(
            "Aggregated {} candidate(s) from {}/{} successful result(s)",
            turn.candidates.len(),
            turn.successful_results(),
            turn.results.len()
        );
        self.conversation_logger.log(ConversationEvent::new(
            "candidates_aggregated",
            json!({
                "turn_id": turn.turn_id,
                "count": turn.candidates.len(),
                "candidates": turn
                    .candidates
                    .iter()
                    .map(|c| json!({ "id": c.id, "title": c.title(), "source_tool": c.source_tool }))
                    .collect::<Vec<_>>(),
            }),
        ));

        // ==================== Phase 4-5: Synthesizing / Streaming ====================
        self.advance(turn, control, TurnStatus::Synthesizing)?;
        self.synthesize(turn, &history, control).await
    }

    /// Move the shared lifecycle and mirror it on the turn.
    ///
    /// A refused transition on a cancelled turn is reported as cancellation.
    pub(super) fn advance(
        &self,
        turn: &mut ConversationTurn,
        control: &TurnControl,
        to: TurnStatus,
    ) -> Result<(), RunTurnError> {
        check_cancelled(&control.cancel)?;
        match control.lifecycle.transition(to) {
            Ok(()) => {
                debug!("Turn {}: {} -> {}", turn.turn_id, turn.status, to);
                turn.status = to;
                Ok(())
            }
            Err(_) if control.lifecycle.status() == TurnStatus::Cancelled => {
                Err(RunTurnError::Cancelled)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Run one batch, keeping whatever finished before the budget ran out.
    async fn execute_round(
        &self,
        turn: &mut ConversationTurn,
        invocations: Vec<ToolInvocation>,
        deadline: Instant,
        control: &TurnControl,
    ) -> Result<(), RunTurnError> {
        check_cancelled(&control.cancel)?;

        let batch_token = control.cancel.child_token();
        let remaining = deadline.saturating_duration_since(Instant::now());
        let results = {
            let mut batch =
                self.tool_executor
                    .run_batch(&invocations, self.params.per_call_timeout, &batch_token);

            tokio::select! {
                results = &mut batch => results,
                _ = tokio::time::sleep(remaining) => {
                    warn!(
                        "Turn budget of {:?} exhausted during tool execution; keeping completed results",
                        self.params.turn_budget
                    );
                    batch_token.cancel();
                    let budget_ms = self.params.turn_budget.as_millis() as u64;
                    batch
                        .await
                        .into_iter()
                        .map(|r| budget_exhausted(r, budget_ms))
                        .collect()
                }
            }
        };

        for (invocation, result) in invocations.iter().zip(&results) {
            match &result.error {
                None => debug!(
                    "Tool {} ({:?}): {} item(s) in {}ms{}",
                    result.tool_name,
                    invocation.origin,
                    result.payload.len(),
                    result.latency_ms,
                    if result.cached { " [cached]" } else { "" }
                ),
                Some(err) => debug!(
                    "Tool {} ({:?}) {}: {}",
                    result.tool_name, invocation.origin, result.status, err
                ),
            }
        }
        self.conversation_logger.log(ConversationEvent::new(
            "tool_batch",
            json!({
                "turn_id": turn.turn_id,
                "invocations": invocations,
                "results": results
                    .iter()
                    .map(|r| json!({
                        "tool_name": r.tool_name,
                        "status": r.status,
                        "items": r.payload.len(),
                        "latency_ms": r.latency_ms,
                        "cached": r.cached,
                        "error": r.error,
                    }))
                    .collect::<Vec<_>>(),
            }),
        ));

        turn.record_batch(invocations, results);
        check_cancelled(&control.cancel)
    }

    /// Prior messages for the LLM calls.
    ///
    /// Messages sent with the request win; otherwise the session's stored
    /// history is used. Either way at most `history_context_length` of the
    /// most recent messages are kept.
    async fn load_history(&self, request: &TurnRequest) -> Vec<Message> {
        let limit = self.params.history_context_length;
        let sent = request.history();
        let mut history = sent[sent.len().saturating_sub(limit)..].to_vec();
        if sent.is_empty() && limit > 0 {
            match self
                .history
                .recent_messages(&request.session_id, limit)
                .await
            {
                Ok(messages) => history = messages,
                Err(e) => warn!("Could not load chat history: {}", e),
            }
        }
        trim_history(&history, self.params.max_history_chars)
    }

    async fn persist(&self, turn: &ConversationTurn) {
        if turn.status == TurnStatus::Done
            && let Err(e) = self.history.record_turn(turn).await
        {
            warn!("Failed to record turn {} in chat history: {}", turn.turn_id, e);
        }

        self.conversation_logger.log(ConversationEvent::new(
            "turn_finished",
            json!({
                "turn_id": turn.turn_id,
                "session_id": turn.session_id,
                "status": turn.status,
                "duration_ms": turn.duration_ms(),
                "invocations": turn.invocations.len(),
                "successful_results": turn.successful_results(),
                "candidates": turn.candidates.len(),
                "answer": turn.structured_answer,
                "failure": turn.failure_message,
            }),
        ));
    }
}

/// In-flight calls aborted by the turn budget count as timeouts
fn budget_exhausted(result: ToolResult, budget_ms: u64) -> ToolResult {
    if result.error_kind() == Some(ErrorKind::Cancelled) {
        ToolResult::failure(
            result.tool_name,
            ToolError::timeout(budget_ms),
            result.latency_ms,
        )
    } else {
        result
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::intent_classifier::KeywordIntentClassifier;
    use crate::test_support::*;
    use planner_domain::tool::catalog::*;
    use planner_domain::{EntityRecord, InvocationOrigin, SynthesisEvent, ToolStatus};
    use std::time::Duration;
    use tokio::sync::mpsc;

    const DINNER: &str = "romantic dinner in Ottawa under $75";

    fn use_case(gateway: Arc<ScriptedGateway>, executor: Arc<StubExecutor>) -> RunTurnUseCase {
        RunTurnUseCase::new(
            gateway,
            executor,
            Arc::new(NameOnlySchema),
            AnalyzeIntentUseCase::new(Arc::new(KeywordIntentClassifier)),
        )
    }

    async fn run(
        use_case: &RunTurnUseCase,
        request: TurnRequest,
    ) -> (ConversationTurn, Vec<TurnEvent>) {
        let (tx, mut rx) = mpsc::channel(64);
        let turn = use_case
            .execute(RunTurnInput::new("turn-1", request), TurnControl::new(tx))
            .await;
        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        (turn, events)
    }

    fn whalesbone() -> EntityRecord {
        EntityRecord::venue("The Whalesbone")
            .with_geo(45.4121, -75.6903)
            .with_attribute("rating", 4.6)
    }

    fn dinner_executor() -> StubExecutor {
        StubExecutor::new()
            .with(GOOGLE_PLACES_SEARCH, StubBehavior::Items(vec![whalesbone()]))
            .with(
                SEARCH_DATE_IDEAS,
                StubBehavior::Items(vec![
                    EntityRecord::venue("the whalesbone").with_geo(45.4121, -75.6903),
                    EntityRecord::venue("Picnic at Major's Hill Park"),
                ]),
            )
    }

    fn happy_synthesis(ids: &[&str]) -> Vec<SynthesisEvent> {
        vec![
            SynthesisEvent::Delta("I found ".into()),
            SynthesisEvent::Delta("two spots.".into()),
            SynthesisEvent::Structured(answer_payload(ids)),
            SynthesisEvent::Completed("I found two spots.".into()),
        ]
    }

    #[tokio::test]
    async fn test_cold_start_forces_diversity_and_streams_answer() {
        let gateway = Arc::new(ScriptedGateway::new(
            vec![ToolInvocation::requested(GOOGLE_PLACES_SEARCH).with_arg("query", "romantic dinner")],
            happy_synthesis(&["candidate_1", "candidate_2", "candidate_7"]),
        ));
        let executor = Arc::new(dinner_executor());
        let use_case = use_case(gateway.clone(), executor.clone());

        let (turn, events) = run(&use_case, TurnRequest::new("s1", DINNER)).await;

        assert_eq!(turn.status, TurnStatus::Done);
        let tools = turn.invoked_tools();
        assert_eq!(tools[0], GOOGLE_PLACES_SEARCH);
        assert!(tools.len() >= 3);
        assert_eq!(turn.invocations[0].origin, InvocationOrigin::Llm);
        assert!(turn.invocations[1..].iter().all(|i| i.origin == InvocationOrigin::Forced));

        // Whalesbone from both sources collapses to the knowledge-store record
        assert_eq!(turn.candidates.len(), 2);
        assert_eq!(turn.candidates[0].source_tool, SEARCH_DATE_IDEAS);

        let prompt = gateway.last_synthesis_prompt.lock().unwrap().clone().unwrap();
        assert!(prompt.contains("[candidate_1] the whalesbone"));

        let answer = turn.structured_answer.clone().unwrap();
        assert_eq!(answer.options.len(), 2);
        assert!(answer.references_only(&turn.candidates));
        assert_eq!(answer.options[0].source_tool, SEARCH_DATE_IDEAS);
        assert_eq!(turn.answer_text, "I found two spots.");

        let kinds: Vec<_> = events.iter().map(|e| e.as_str()).collect();
        assert_eq!(
            kinds,
            vec!["text_delta", "text_delta", "structured_answer", "done"]
        );
    }

    #[tokio::test]
    async fn test_full_tool_failure_is_done_with_no_matches() {
        let executor = Arc::new(
            StubExecutor::new()
                .with(GOOGLE_PLACES_SEARCH, StubBehavior::Fail("502".into()))
                .with(ENHANCED_WEB_SEARCH, StubBehavior::Fail("quota".into()))
                .with(SEARCH_DATE_IDEAS, StubBehavior::Fail("db down".into()))
                .with(SEARCH_FEATURED_DATES, StubBehavior::Fail("db down".into())),
        );
        let gateway = Arc::new(ScriptedGateway::new(
            vec![ToolInvocation::requested(GOOGLE_PLACES_SEARCH).with_arg("query", "dinner")],
            happy_synthesis(&[]),
        ));
        let use_case = use_case(gateway.clone(), executor.clone());

        let (turn, events) = run(&use_case, TurnRequest::new("s1", DINNER)).await;

        assert_eq!(turn.status, TurnStatus::Done);
        assert!(turn.candidates.is_empty());
        let answer = turn.structured_answer.clone().unwrap();
        assert!(answer.options.is_empty());
        assert!(!answer.summary.is_empty());
        assert_eq!(gateway.synthesis_calls.load(std::sync::atomic::Ordering::SeqCst), 0);

        // One extra round with the next untried recommendation
        let batches = executor.batch_tools();
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[1], vec![SEARCH_FEATURED_DATES.to_string()]);
        assert_eq!(turn.invocations.last().unwrap().origin, InvocationOrigin::Reflection);

        assert!(matches!(events.last(), Some(TurnEvent::Done)));
    }

    #[tokio::test]
    async fn test_planning_failure_still_forces_tools() {
        let gateway = Arc::new(
            ScriptedGateway::new(Vec::new(), happy_synthesis(&["candidate_1"])).failing_planning(),
        );
        let use_case = use_case(gateway, Arc::new(dinner_executor()));

        let (turn, _) = run(&use_case, TurnRequest::new("s1", DINNER)).await;

        assert_eq!(turn.status, TurnStatus::Done);
        assert_eq!(turn.invocations.len(), 3);
        assert!(turn.invocations.iter().all(|i| i.origin == InvocationOrigin::Forced));
    }

    #[tokio::test]
    async fn test_synthesis_failure_is_generic() {
        let gateway = Arc::new(ScriptedGateway::new(Vec::new(), Vec::new()).failing_synthesis());
        let use_case = use_case(gateway, Arc::new(dinner_executor()));

        let (turn, events) = run(&use_case, TurnRequest::new("s1", DINNER)).await;

        assert_eq!(turn.status, TurnStatus::Failed);
        assert!(turn.structured_answer.is_none());
        assert_eq!(
            events,
            vec![TurnEvent::Failed {
                message: GENERIC_FAILURE_MESSAGE.to_string()
            }]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_turn_budget_keeps_completed_results() {
        let executor = Arc::new(dinner_executor().with(
            ENHANCED_WEB_SEARCH,
            StubBehavior::Slow(Duration::from_secs(600), vec![EntityRecord::venue("Late")]),
        ));
        let gateway = Arc::new(ScriptedGateway::new(
            Vec::new(),
            happy_synthesis(&["candidate_1"]),
        ));
        let use_case = use_case(gateway, executor).with_params(
            OrchestrationParams::default().with_turn_budget(Duration::from_secs(5)),
        );

        let (turn, _) = run(&use_case, TurnRequest::new("s1", DINNER)).await;

        assert_eq!(turn.status, TurnStatus::Done);
        let slow = turn
            .results
            .iter()
            .find(|r| r.tool_name == ENHANCED_WEB_SEARCH)
            .unwrap();
        assert_eq!(slow.status, ToolStatus::Timeout);
        assert!(turn.results.iter().filter(|r| r.is_success()).count() >= 2);
        assert!(!turn.candidates.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_execution() {
        let executor = Arc::new(dinner_executor().with(
            ENHANCED_WEB_SEARCH,
            StubBehavior::Slow(Duration::from_secs(20), Vec::new()),
        ));
        let gateway = Arc::new(ScriptedGateway::new(Vec::new(), happy_synthesis(&[])));
        let use_case = use_case(gateway.clone(), executor);

        let (tx, mut rx) = mpsc::channel(64);
        let control = TurnControl::new(tx);
        let lifecycle = control.lifecycle.clone();
        let token = control.cancel.clone();
        let task = tokio::spawn(async move {
            use_case
                .execute(RunTurnInput::new("turn-1", TurnRequest::new("s1", DINNER)), control)
                .await
        });

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(lifecycle.status(), TurnStatus::ExecutingTools);
        assert!(lifecycle.cancel());
        token.cancel();

        let turn = task.await.unwrap();
        assert_eq!(turn.status, TurnStatus::Cancelled);
        assert!(turn.structured_answer.is_none());
        assert_eq!(gateway.synthesis_calls.load(std::sync::atomic::Ordering::SeqCst), 0);
        let cancelled = turn
            .results
            .iter()
            .find(|r| r.tool_name == ENHANCED_WEB_SEARCH)
            .unwrap();
        assert!(cancelled.is_cancelled());

        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        assert_eq!(events, vec![TurnEvent::Cancelled]);
    }

    #[tokio::test]
    async fn test_done_turn_is_recorded_and_feeds_next_planning() {
        let history = Arc::new(RecordingHistory::default());
        let gateway = Arc::new(ScriptedGateway::new(Vec::new(), happy_synthesis(&["candidate_1"])));
        let use_case =
            use_case(gateway, Arc::new(dinner_executor())).with_history(history.clone());

        let (turn, _) = run(&use_case, TurnRequest::new("s1", DINNER)).await;
        assert_eq!(turn.status, TurnStatus::Done);
        assert_eq!(history.turns.lock().unwrap().len(), 1);

        let request = TurnRequest::new("s1", "something cheaper");
        let loaded = use_case.load_history(&request).await;
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].content, DINNER);
    }

    #[tokio::test]
    async fn test_request_history_is_capped_by_context_length() {
        let gateway = Arc::new(ScriptedGateway::new(Vec::new(), Vec::new()));
        let use_case = use_case(gateway, Arc::new(dinner_executor())).with_params(
            OrchestrationParams::default().with_history_context_length(2),
        );

        let request = TurnRequest::with_messages(
            "s1",
            vec![
                Message::user("first"),
                Message::assistant("second"),
                Message::user("third"),
                Message::assistant("fourth"),
                Message::user("something cheaper"),
            ],
        );
        let loaded = use_case.load_history(&request).await;
        let contents: Vec<_> = loaded.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["third", "fourth"]);
    }

    #[tokio::test]
    async fn test_structured_answer_without_summary_takes_streamed_text() {
        let mut payload = answer_payload(&["candidate_1"]);
        payload.as_object_mut().unwrap().remove("summary");
        let gateway = Arc::new(ScriptedGateway::new(
            Vec::new(),
            vec![
                SynthesisEvent::Delta("Oysters by the canal.\n\nMore below.".into()),
                SynthesisEvent::Structured(payload),
                SynthesisEvent::Completed(String::new()),
            ],
        ));
        let use_case = use_case(gateway, Arc::new(dinner_executor()));

        let (turn, _) = run(&use_case, TurnRequest::new("s1", DINNER)).await;

        let answer = turn.structured_answer.unwrap();
        assert_eq!(answer.options.len(), 1);
        assert_eq!(answer.summary, "Oysters by the canal.");
    }

    #[tokio::test]
    async fn test_default_city_from_params_reaches_intent() {
        let gateway = Arc::new(ScriptedGateway::new(Vec::new(), happy_synthesis(&["candidate_1"])));
        let use_case = use_case(gateway, Arc::new(dinner_executor()))
            .with_params(OrchestrationParams::default().with_default_city("Kingston"));

        let (turn, _) = run(&use_case, TurnRequest::new("s1", "a cozy dinner")).await;

        assert_eq!(turn.intent.unwrap().city, "Kingston");
    }
}
