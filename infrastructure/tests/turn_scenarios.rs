//! End-to-end turns over the real registry, executor and session controller,
//! with in-process tool providers and a scripted LLM gateway.

use async_trait::async_trait;
use planner_application::{
    AnalyzeIntentUseCase, GatewayError, KeywordIntentClassifier, LlmGateway, PlanningRequest,
    RunTurnUseCase, SessionController, SynthesisRequest, SynthesisStream,
};
use planner_domain::tool::catalog::{
    self, ENHANCED_WEB_SEARCH, EVENTBRITE_SEARCH, GOOGLE_PLACES_SEARCH, SEARCH_DATE_IDEAS,
};
use planner_domain::{
    ConversationTurn, EntityRecord, InvocationOrigin, ProviderError, SynthesisEvent,
    ToolDefinition, ToolInvocation, ToolProvider, TurnEvent, TurnRequest, TurnStatus,
};
use planner_infrastructure::{
    InMemoryChatHistory, JsonSchemaToolConverter, ParallelToolExecutor, ResultCache, ToolRegistry,
};
use serde_json::{Value, json};
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

const DINNER: &str = "romantic dinner in Ottawa";

#[derive(Clone)]
enum Mode {
    Items(Vec<EntityRecord>),
    Fail,
    Hang,
}

struct StubProvider {
    definition: ToolDefinition,
    mode: Mode,
    calls: Arc<AtomicUsize>,
}

impl StubProvider {
    fn new(name: &str, mode: Mode) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let provider = Self {
            definition: catalog::definition(name).unwrap(),
            mode,
            calls: calls.clone(),
        };
        (provider, calls)
    }
}

#[async_trait]
impl ToolProvider for StubProvider {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn invoke(&self, _invocation: &ToolInvocation) -> Result<Vec<EntityRecord>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.mode {
            Mode::Items(items) => Ok(items.clone()),
            Mode::Fail => Err(ProviderError::ExecutionFailed("upstream returned 503".into())),
            Mode::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(Vec::new())
            }
        }
    }
}

/// Plans nothing and answers with a fixed stream
struct ScriptedGateway {
    synthesis: Vec<SynthesisEvent>,
    synthesis_calls: AtomicUsize,
    last_prompt: Mutex<Option<String>>,
}

impl ScriptedGateway {
    fn new(synthesis: Vec<SynthesisEvent>) -> Self {
        Self {
            synthesis,
            synthesis_calls: AtomicUsize::new(0),
            last_prompt: Mutex::new(None),
        }
    }

    fn answering(payload: Value) -> Self {
        Self::new(vec![
            SynthesisEvent::Delta("Here is what I found.".into()),
            SynthesisEvent::Structured(payload),
            SynthesisEvent::Completed(String::new()),
        ])
    }
}

#[async_trait]
impl LlmGateway for ScriptedGateway {
    async fn plan_tools(&self, _request: PlanningRequest) -> Result<Vec<ToolInvocation>, GatewayError> {
        Ok(Vec::new())
    }

    async fn synthesize(&self, request: SynthesisRequest) -> Result<SynthesisStream, GatewayError> {
        self.synthesis_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_prompt.lock().unwrap() = request.messages.last().map(|m| m.content.clone());
        Ok(SynthesisStream::from_events(self.synthesis.clone()))
    }
}

fn controller(registry: ToolRegistry, gateway: Arc<ScriptedGateway>) -> SessionController {
    let executor = ParallelToolExecutor::new(Arc::new(registry), Arc::new(ResultCache::default()));
    let run_turn = RunTurnUseCase::new(
        gateway,
        Arc::new(executor),
        Arc::new(JsonSchemaToolConverter),
        AnalyzeIntentUseCase::new(Arc::new(KeywordIntentClassifier)),
    )
    .with_history(Arc::new(InMemoryChatHistory::new()));
    SessionController::new(run_turn)
}

async fn run_turn(
    controller: &SessionController,
    session: &str,
    utterance: &str,
) -> (ConversationTurn, Vec<TurnEvent>) {
    let mut handle = controller
        .begin_turn(TurnRequest::new(session, utterance))
        .unwrap();
    let mut events = Vec::new();
    while let Some(event) = handle.next_event().await {
        events.push(event);
    }
    controller.end_turn(&handle);
    (handle.outcome().await.unwrap(), events)
}

fn whalesbone() -> EntityRecord {
    EntityRecord::venue("The Whalesbone")
        .with_geo(45.4121, -75.6903)
        .with_url("https://www.thewhalesbone.com")
}

fn empty_answer() -> Value {
    json!({ "summary": "Here is what I found.", "options": [] })
}

#[tokio::test]
async fn cold_start_dinner_reaches_minimum_diversity() {
    let mut registry = ToolRegistry::new();
    for name in [SEARCH_DATE_IDEAS, GOOGLE_PLACES_SEARCH, ENHANCED_WEB_SEARCH, EVENTBRITE_SEARCH] {
        let (provider, _) = StubProvider::new(name, Mode::Items(vec![EntityRecord::venue(name)]));
        registry = registry.register(provider).unwrap();
    }
    let gateway = Arc::new(ScriptedGateway::answering(empty_answer()));
    let controller = controller(registry, gateway.clone());

    let (turn, events) = run_turn(&controller, "cold", DINNER).await;

    assert_eq!(turn.status, TurnStatus::Done);
    let tools: HashSet<&str> = turn.invoked_tools().into_iter().collect();
    assert_eq!(tools.len(), 3);
    assert!(
        turn.invocations
            .iter()
            .all(|i| i.origin == InvocationOrigin::Forced)
    );
    assert_eq!(turn.candidates.len(), 3);
    assert_eq!(gateway.synthesis_calls.load(Ordering::SeqCst), 1);
    assert_eq!(events.last(), Some(&TurnEvent::Done));
}

#[tokio::test]
async fn every_tool_failing_still_finishes_with_no_matches() {
    let mut registry = ToolRegistry::new();
    for name in [SEARCH_DATE_IDEAS, GOOGLE_PLACES_SEARCH, ENHANCED_WEB_SEARCH, EVENTBRITE_SEARCH] {
        let (provider, _) = StubProvider::new(name, Mode::Fail);
        registry = registry.register(provider).unwrap();
    }
    let gateway = Arc::new(ScriptedGateway::answering(empty_answer()));
    let controller = controller(registry, gateway.clone());

    let (turn, events) = run_turn(&controller, "outage", DINNER).await;

    assert_eq!(turn.status, TurnStatus::Done);
    assert!(turn.candidates.is_empty());
    assert!(turn.results.iter().all(|r| !r.is_success()));
    assert_eq!(gateway.synthesis_calls.load(Ordering::SeqCst), 0);

    let answer = turn.structured_answer.unwrap();
    assert!(answer.options.is_empty());
    assert!(answer.summary.contains("couldn't find"));
    assert!(matches!(events.first(), Some(TurnEvent::TextDelta(_))));
    assert_eq!(events.last(), Some(&TurnEvent::Done));
}

#[tokio::test]
async fn duplicate_venue_is_merged_and_options_are_grounded() {
    let (places, _) = StubProvider::new(
        GOOGLE_PLACES_SEARCH,
        Mode::Items(vec![whalesbone(), EntityRecord::venue("Beckta")]),
    );
    let (ideas, _) = StubProvider::new(
        SEARCH_DATE_IDEAS,
        Mode::Items(vec![
            EntityRecord::venue("the whalesbone")
                .with_geo(45.4121, -75.6903)
                .with_attribute("price_tier", 3),
        ]),
    );
    let (web, _) = StubProvider::new(ENHANCED_WEB_SEARCH, Mode::Items(Vec::new()));
    let registry = ToolRegistry::new()
        .register(places)
        .unwrap()
        .register(ideas)
        .unwrap()
        .register(web)
        .unwrap();

    let gateway = Arc::new(ScriptedGateway::answering(json!({
        "summary": "Oysters it is.",
        "options": [
            {
                "title": "The Whalesbone",
                "candidate_id": "candidate_1",
                "justification": "Intimate oyster bar",
            },
            {
                "title": "Invented Bistro",
                "candidate_id": "candidate_42",
                "justification": "Does not exist",
            }
        ]
    })));
    let controller = controller(registry, gateway.clone());

    let (turn, _) = run_turn(&controller, "dupes", DINNER).await;

    let whalesbones: Vec<_> = turn
        .candidates
        .iter()
        .filter(|c| c.title().eq_ignore_ascii_case("the whalesbone"))
        .collect();
    assert_eq!(whalesbones.len(), 1);
    assert_eq!(whalesbones[0].id, "candidate_1");
    assert_eq!(whalesbones[0].source_tool, SEARCH_DATE_IDEAS);
    assert_eq!(turn.candidates.len(), 2);

    let prompt = gateway.last_prompt.lock().unwrap().clone().unwrap();
    assert!(prompt.contains("candidate_1"));
    assert!(prompt.contains("Beckta"));

    let answer = turn.structured_answer.unwrap();
    assert_eq!(answer.options.len(), 1);
    assert_eq!(answer.options[0].source_tool, SEARCH_DATE_IDEAS);
    assert_eq!(
        answer.options[0].url.as_deref(),
        Some("https://www.thewhalesbone.com")
    );
}

#[tokio::test]
async fn cancelling_during_tool_execution_ends_the_turn() {
    let mut registry = ToolRegistry::new();
    let mut counters = Vec::new();
    for name in [SEARCH_DATE_IDEAS, GOOGLE_PLACES_SEARCH, ENHANCED_WEB_SEARCH] {
        let (provider, calls) = StubProvider::new(name, Mode::Hang);
        registry = registry.register(provider).unwrap();
        counters.push(calls);
    }
    let gateway = Arc::new(ScriptedGateway::answering(empty_answer()));
    let controller = controller(registry, gateway.clone());

    let mut handle = controller
        .begin_turn(TurnRequest::new("cancel", DINNER))
        .unwrap();
    while handle.status() != TurnStatus::ExecutingTools {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert!(controller.cancel("cancel"));
    assert!(!controller.cancel("cancel"));

    assert_eq!(handle.next_event().await, Some(TurnEvent::Cancelled));
    assert_eq!(handle.next_event().await, None);

    controller.end_turn(&handle);
    let turn = handle.outcome().await.unwrap();
    assert_eq!(turn.status, TurnStatus::Cancelled);
    assert!(turn.structured_answer.is_none());
    assert_eq!(gateway.synthesis_calls.load(Ordering::SeqCst), 0);

    // The session accepts a new turn once the cancelled one is released
    assert!(controller.begin_turn(TurnRequest::new("cancel", DINNER)).is_ok());
    assert!(controller.cancel("cancel"));
}

#[tokio::test]
async fn repeated_turn_is_served_from_cache() {
    let mut registry = ToolRegistry::new();
    let mut counters = Vec::new();
    for name in [SEARCH_DATE_IDEAS, GOOGLE_PLACES_SEARCH, ENHANCED_WEB_SEARCH] {
        let (provider, calls) = StubProvider::new(name, Mode::Items(vec![EntityRecord::venue(name)]));
        registry = registry.register(provider).unwrap();
        counters.push(calls);
    }
    let gateway = Arc::new(ScriptedGateway::answering(empty_answer()));
    let controller = controller(registry, gateway);

    let (first, _) = run_turn(&controller, "alice", DINNER).await;
    let (second, _) = run_turn(&controller, "bob", DINNER).await;

    assert!(first.results.iter().all(|r| !r.cached));
    assert_eq!(second.results.len(), 3);
    assert!(second.results.iter().all(|r| r.cached && r.is_success()));
    for calls in &counters {
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
    assert_eq!(second.candidates.len(), first.candidates.len());
}
