//! Planning phase: LLM tool choice topped up by the selection policy.

use super::RunTurnUseCase;
use super::types::{RunTurnError, TurnControl};
use crate::ports::conversation_logger::ConversationEvent;
use crate::ports::llm_gateway::PlanningRequest;
use planner_domain::{
    ConversationTurn, Message, PlannerPromptTemplate, QueryIntent, SelectionContext, ToolInvocation,
};
use serde_json::json;
use tracing::{info, warn};

impl RunTurnUseCase {
    /// Final invocation set for the first round.
    ///
    /// A failed planning call degrades to an empty request list; the policy
    /// still forces tools.
    pub(super) async fn plan_invocations(
        &self,
        turn: &ConversationTurn,
        intent: &QueryIntent,
        history: &[Message],
        control: &TurnControl,
    ) -> Result<Vec<ToolInvocation>, RunTurnError> {
        let definitions = self.tool_executor.definitions();
        let available: Vec<String> = definitions.iter().map(|d| d.name.clone()).collect();

        let mut messages = history.to_vec();
        messages.push(Message::user(PlannerPromptTemplate::planning_prompt(
            &turn.user_utterance,
            &turn.constraints,
            intent,
        )));
        let request = PlanningRequest {
            system_prompt: PlannerPromptTemplate::planning_system().to_string(),
            messages,
            tools: self.tool_schema.all_tools_schema(&definitions),
        };

        let llm_requested = tokio::select! {
            biased;
            _ = control.cancel.cancelled() => return Err(RunTurnError::Cancelled),
            result = self.gateway.plan_tools(request) => match result {
                Ok(invocations) => invocations,
                Err(e) => {
                    warn!("Planning call failed, continuing with forced tools only: {}", e);
                    Vec::new()
                }
            },
        };

        let ctx = SelectionContext::new(&turn.user_utterance, &turn.constraints, intent)
            .with_location(turn.user_location)
            .with_top_k(self.params.knowledge_top_k)
            .with_available_tools(&available);
        let requested_count = llm_requested.len();
        let selected = self.params.selection_policy().select(llm_requested, &ctx);

        info!(
            "Selected {} invocation(s) ({} requested by the LLM): {}",
            selected.len(),
            requested_count,
            selected
                .iter()
                .map(|i| i.tool_name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
        self.conversation_logger.log(ConversationEvent::new(
            "tools_selected",
            json!({
                "turn_id": turn.turn_id,
                "requested": requested_count,
                "invocations": selected,
            }),
        ));

        Ok(selected)
    }
}
