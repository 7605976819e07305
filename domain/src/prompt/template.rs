//! Prompt templates for the planning turn

use serde_json::{Value, json};

use crate::entity::CandidateEntity;
use crate::intent::QueryIntent;
use crate::turn::Constraints;

/// Name of the function the synthesis model calls with the structured answer
pub const ANSWER_FUNCTION_NAME: &str = "present_date_options";

/// Templates for generating prompts at each stage
pub struct PlannerPromptTemplate;

impl PlannerPromptTemplate {
    /// System prompt for the tool-planning call
    pub fn planning_system() -> &'static str {
        r#"You are Date Planner, an assistant that researches date ideas.
Decide which tools to call to gather candidate venues, activities and events
for the user's request. Prefer several complementary sources: the curated
date-idea database first, then live place search, web search and event listings.
Only call tools whose required arguments you can fill in.
Do not answer the user yet; just request the tool calls."#
    }

    /// User prompt for the tool-planning call
    pub fn planning_prompt(utterance: &str, constraints: &Constraints, intent: &QueryIntent) -> String {
        let mut prompt = format!(
            r#"Request: {}

Constraints: {}
City: {}
Detected intent: {} (category: {})"#,
            utterance,
            constraints.describe(),
            intent.city,
            intent.intent_kind.as_str(),
            intent.category
        );

        if intent.time_sensitive {
            prompt.push_str("\nThe user is asking about something happening soon; check event listings.");
        }
        if !intent.recommended_tools.is_empty() {
            prompt.push_str(&format!(
                "\nSuggested tools: {}",
                intent.recommended_tools.join(", ")
            ));
        }

        prompt
    }

    /// System prompt for the synthesis call
    pub fn synthesis_system() -> &'static str {
        r#"You are Date Planner. Recommend date ideas using only the candidates provided.
Write a short, friendly reply for the user, then call the present_date_options
function with a summary and the options you recommend.
Every option must reference one of the candidate ids exactly as given
(for example "candidate_3") and explain why it fits the request.
Respect the user's budget, duration, indoor/outdoor and category constraints.
Never invent venues, prices or links that are not in the candidates."#
    }

    /// User prompt for the synthesis call
    pub fn synthesis_prompt(
        utterance: &str,
        constraints: &Constraints,
        candidates: &[CandidateEntity],
    ) -> String {
        let mut prompt = format!(
            r#"Request: {}

Constraints: {}

Candidates:
"#,
            utterance,
            constraints.describe()
        );

        for candidate in candidates {
            prompt.push_str(&candidate.prompt_line());
            prompt.push('\n');
        }

        prompt.push_str(
            r#"
Pick the best three to five options. Reply conversationally first, then call
present_date_options."#,
        );

        prompt
    }

    /// Function schema the synthesis model fills with the structured answer
    pub fn answer_schema() -> Value {
        json!({
            "name": ANSWER_FUNCTION_NAME,
            "description": "Present the recommended date options to the user",
            "input_schema": {
                "type": "object",
                "properties": {
                    "summary": {
                        "type": "string",
                        "description": "One or two sentence overview of the recommendations"
                    },
                    "options": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "title": { "type": "string" },
                                "categories": { "type": "array", "items": { "type": "string" } },
                                "price": { "type": "string" },
                                "duration_min": { "type": "integer" },
                                "why_it_fits": { "type": "string" },
                                "logistics": { "type": "string" },
                                "source": { "type": "string" },
                                "website": { "type": "string" },
                                "candidate_id": {
                                    "type": "string",
                                    "description": "Id of the candidate this option is based on"
                                }
                            },
                            "required": ["title", "why_it_fits", "candidate_id"]
                        }
                    }
                },
                "required": ["summary", "options"]
            }
        })
    }
}
