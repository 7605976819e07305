//! Synthesis and streaming phases.

use super::RunTurnUseCase;
use super::types::{RunTurnError, TurnControl};
use crate::ports::conversation_logger::ConversationEvent;
use crate::ports::llm_gateway::SynthesisRequest;
use crate::use_cases::shared::check_cancelled;
use planner_domain::turn::parse_answer_text;
use planner_domain::util::ellipsize;
use planner_domain::{
    ConversationTurn, Message, PlannerPromptTemplate, StructuredAnswer, SynthesisEvent, TurnEvent,
    TurnStatus,
};
use serde_json::{Value, json};
use tracing::{debug, info, warn};

impl RunTurnUseCase {
    /// Stream the answer to the caller and finish the turn.
    ///
    /// With no candidates the LLM is skipped and a "no matches" answer is
    /// produced directly.
    pub(super) async fn synthesize(
        &self,
        turn: &mut ConversationTurn,
        history: &[Message],
        control: &TurnControl,
    ) -> Result<(), RunTurnError> {
        if turn.candidates.is_empty() {
            info!("No candidates for turn {}; answering without synthesis", turn.turn_id);
            self.advance(turn, control, TurnStatus::Streaming)?;
            let answer = StructuredAnswer::no_matches(&turn.user_utterance);
            turn.answer_text = answer.summary.clone();
            self.emit(control, TurnEvent::TextDelta(answer.summary.clone()))
                .await?;
            return self.finish_answer(turn, answer, control).await;
        }

        check_cancelled(&control.cancel)?;
        let shown = turn.candidates.len().min(self.params.max_candidates_in_prompt);
        if shown < turn.candidates.len() {
            debug!(
                "Listing {} of {} candidates in the synthesis prompt",
                shown,
                turn.candidates.len()
            );
        }

        let mut messages = history.to_vec();
        messages.push(Message::user(PlannerPromptTemplate::synthesis_prompt(
            &turn.user_utterance,
            &turn.constraints,
            &turn.candidates[..shown],
        )));
        let request = SynthesisRequest {
            system_prompt: PlannerPromptTemplate::synthesis_system().to_string(),
            messages,
            answer_schema: PlannerPromptTemplate::answer_schema(),
        };

        let mut stream = tokio::select! {
            biased;
            _ = control.cancel.cancelled() => return Err(RunTurnError::Cancelled),
            result = self.gateway.synthesize(request) => {
                result.map_err(|e| RunTurnError::SynthesisFailed(e.to_string()))?
            }
        };

        let mut structured: Option<Value> = None;
        let mut streaming = false;
        let mut completed = false;

        loop {
            let event = tokio::select! {
                biased;
                _ = control.cancel.cancelled() => return Err(RunTurnError::Cancelled),
                event = stream.recv() => event,
            };
            let Some(event) = event else {
                break;
            };

            if !streaming {
                self.advance(turn, control, TurnStatus::Streaming)?;
                streaming = true;
            }

            match event {
                SynthesisEvent::Delta(chunk) => {
                    if chunk.is_empty() {
                        continue;
                    }
                    turn.answer_text.push_str(&chunk);
                    self.emit(control, TurnEvent::TextDelta(chunk)).await?;
                }
                SynthesisEvent::Structured(payload) => structured = Some(payload),
                SynthesisEvent::Completed(text) => {
                    if turn.answer_text.is_empty() && !text.is_empty() {
                        turn.answer_text = text.clone();
                        self.emit(control, TurnEvent::TextDelta(text)).await?;
                    }
                    completed = true;
                    break;
                }
                SynthesisEvent::Error(e) => return Err(RunTurnError::SynthesisFailed(e)),
            }
        }

        if !completed {
            if turn.answer_text.is_empty() && structured.is_none() {
                return Err(RunTurnError::SynthesisFailed(
                    "stream closed before any output".to_string(),
                ));
            }
            debug!("Synthesis stream closed without a completion marker");
        }

        let mut answer = structured
            .as_ref()
            .and_then(StructuredAnswer::from_value)
            .or_else(|| parse_answer_text(&turn.answer_text))
            .unwrap_or_else(|| {
                warn!("Synthesis returned no structured answer; presenting text only");
                StructuredAnswer::new(String::new())
            });
        if answer.summary.trim().is_empty() {
            answer.summary = summary_from_text(&turn.answer_text);
        }
        if answer.summary.is_empty() {
            answer.summary = FALLBACK_SUMMARY.to_string();
        }

        let (answer, dropped) = answer.validated(&turn.candidates);
        for option in &dropped {
            warn!("Dropped option '{}': {}", option.title, option.reason);
            self.conversation_logger.log(ConversationEvent::new(
                "option_dropped",
                json!({
                    "turn_id": turn.turn_id,
                    "title": option.title,
                    "reason": option.reason.to_string(),
                }),
            ));
        }

        self.finish_answer(turn, answer, control).await
    }

    /// Mark the turn done, then emit the structured answer and `Done`.
    ///
    /// Reaching `done` first means a later cancel returns `false`, so an
    /// answer that was emitted is never followed by a cancellation.
    async fn finish_answer(
        &self,
        turn: &mut ConversationTurn,
        answer: StructuredAnswer,
        control: &TurnControl,
    ) -> Result<(), RunTurnError> {
        self.advance(turn, control, TurnStatus::Done)?;
        turn.structured_answer = Some(answer.clone());
        if control.send(TurnEvent::StructuredAnswer(answer)).await {
            control.send(TurnEvent::Done).await;
        }
        Ok(())
    }

    async fn emit(&self, control: &TurnControl, event: TurnEvent) -> Result<(), RunTurnError> {
        if !control.send(event).await {
            debug!("Turn event not delivered; abandoning the turn");
            return Err(RunTurnError::Cancelled);
        }
        Ok(())
    }
}

/// Summary used when neither the payload nor the text offers one
const FALLBACK_SUMMARY: &str = "Here are some date ideas based on what I found.";

/// First paragraph of the answer text, used when no structured payload came back
fn summary_from_text(text: &str) -> String {
    let paragraph = text
        .split("\n\n")
        .map(str::trim)
        .find(|p| !p.is_empty())
        .unwrap_or_default();
    ellipsize(paragraph, 280)
}
