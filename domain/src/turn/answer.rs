//! Structured answer produced by synthesis
//!
//! The LLM returns a JSON object with a summary and a list of options, each
//! referencing a candidate id. Parsing is lenient about field names (the
//! prompt historically asked for `why_it_fits`, `price`, `duration_min`,
//! `website`, `source`); validation against the turn's candidates is strict.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::entity::CandidateEntity;

/// One recommendation shown to the user
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RecommendedOption {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default, alias = "price")]
    pub price_display: String,
    #[serde(default, alias = "duration_min", skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,
    #[serde(default, alias = "why_it_fits")]
    pub justification: String,
    #[serde(default)]
    pub logistics: String,
    #[serde(default, alias = "source")]
    pub source_tool: String,
    #[serde(default, alias = "website", skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, alias = "id")]
    pub candidate_id: String,
}

/// Final answer of a turn
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StructuredAnswer {
    pub summary: String,
    #[serde(default)]
    pub options: Vec<RecommendedOption>,
}

/// Why an option was removed during validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropReason {
    UnknownCandidate(String),
    MissingTitle,
    MissingJustification,
}

impl std::fmt::Display for DropReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DropReason::UnknownCandidate(id) => write!(f, "unknown candidate id '{}'", id),
            DropReason::MissingTitle => write!(f, "blank title"),
            DropReason::MissingJustification => write!(f, "blank justification and logistics"),
        }
    }
}

/// An option removed by [`StructuredAnswer::validated`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedOption {
    pub title: String,
    pub reason: DropReason,
}

impl StructuredAnswer {
    pub fn new(summary: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            options: Vec::new(),
        }
    }

    pub fn with_option(mut self, option: RecommendedOption) -> Self {
        self.options.push(option);
        self
    }

    /// Answer for a turn where no tool produced anything usable
    pub fn no_matches(utterance: &str) -> Self {
        Self::new(format!(
            "I couldn't find any matching ideas for \"{}\" right now. Try widening the budget, \
             another neighbourhood, or a different kind of outing.",
            crate::util::truncate_str(utterance.trim(), 120)
        ))
    }

    /// Lenient conversion from the LLM's JSON payload.
    ///
    /// Options that are not objects are skipped; unknown fields are ignored.
    /// Returns `None` when there is neither a summary nor an options array.
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let summary = object
            .get("summary")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .trim()
            .to_string();
        let raw_options = object.get("options").and_then(Value::as_array);

        if summary.is_empty() && raw_options.is_none() {
            return None;
        }

        let options = raw_options
            .map(|items| {
                items
                    .iter()
                    .filter(|item| item.is_object())
                    .filter_map(|item| serde_json::from_value(item.clone()).ok())
                    .collect()
            })
            .unwrap_or_default();

        Some(Self { summary, options })
    }

    /// Keep only options that reference a known candidate and carry the
    /// required display fields.
    ///
    /// Missing `source_tool` / `url` are filled in from the referenced
    /// candidate. Returns the cleaned answer plus what was dropped.
    pub fn validated(self, candidates: &[CandidateEntity]) -> (Self, Vec<DroppedOption>) {
        let mut kept = Vec::with_capacity(self.options.len());
        let mut dropped = Vec::new();

        for mut option in self.options {
            let reason = if option.title.trim().is_empty() {
                Some(DropReason::MissingTitle)
            } else if option.justification.trim().is_empty() && option.logistics.trim().is_empty() {
                Some(DropReason::MissingJustification)
            } else {
                None
            };
            if let Some(reason) = reason {
                dropped.push(DroppedOption {
                    title: option.title,
                    reason,
                });
                continue;
            }

            let Some(candidate) = candidates.iter().find(|c| c.id == option.candidate_id) else {
                dropped.push(DroppedOption {
                    title: option.title,
                    reason: DropReason::UnknownCandidate(option.candidate_id),
                });
                continue;
            };

            if option.source_tool.trim().is_empty() {
                option.source_tool = candidate.source_tool.clone();
            }
            if option.url.as_deref().is_none_or(|u| u.trim().is_empty()) {
                option.url = candidate.record.url.clone();
            }
            kept.push(option);
        }

        (
            Self {
                summary: self.summary,
                options: kept,
            },
            dropped,
        )
    }

    /// Every referenced id exists in `candidates`
    pub fn references_only(&self, candidates: &[CandidateEntity]) -> bool {
        self.options
            .iter()
            .all(|o| candidates.iter().any(|c| c.id == o.candidate_id))
    }
}

/// Extract the structured answer from free text.
///
/// Supports a ` ```json ` fenced block, or the whole response being JSON.
pub fn parse_answer_text(response: &str) -> Option<StructuredAnswer> {
    let mut in_block = false;
    let mut current_block = String::new();

    for line in response.lines() {
        let trimmed = line.trim();
        if !in_block && (trimmed == "```json" || trimmed == "```") {
            in_block = true;
            current_block.clear();
        } else if in_block && trimmed == "```" {
            in_block = false;
            if let Ok(parsed) = serde_json::from_str::<Value>(&current_block)
                && let Some(answer) = StructuredAnswer::from_value(&parsed)
            {
                return Some(answer);
            }
        } else if in_block {
            current_block.push_str(line);
            current_block.push('\n');
        }
    }

    serde_json::from_str::<Value>(response.trim())
        .ok()
        .and_then(|parsed| StructuredAnswer::from_value(&parsed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityRecord;
    use serde_json::json;

    fn candidates() -> Vec<CandidateEntity> {
        vec![
            CandidateEntity::new(
                1,
                "search_date_ideas",
                EntityRecord::venue("The Whalesbone").with_url("https://thewhalesbone.com"),
            ),
            CandidateEntity::new(2, "google_places_search", EntityRecord::venue("Riviera")),
        ]
    }

    fn option(id: &str, title: &str, why: &str) -> RecommendedOption {
        RecommendedOption {
            title: title.to_string(),
            justification: why.to_string(),
            candidate_id: id.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_from_value_accepts_legacy_field_names() {
        let value = json!({
            "summary": "Two cozy spots",
            "options": [{
                "title": "The Whalesbone",
                "categories": ["seafood"],
                "price": "$$",
                "duration_min": 90,
                "why_it_fits": "Oysters and wine",
                "logistics": "Bank St",
                "website": "https://thewhalesbone.com",
                "source": "search_date_ideas",
                "candidate_id": "candidate_1"
            }, "garbage"]
        });
        let answer = StructuredAnswer::from_value(&value).unwrap();
        assert_eq!(answer.summary, "Two cozy spots");
        assert_eq!(answer.options.len(), 1);
        let opt = &answer.options[0];
        assert_eq!(opt.price_display, "$$");
        assert_eq!(opt.duration_minutes, Some(90));
        assert_eq!(opt.justification, "Oysters and wine");
        assert_eq!(opt.source_tool, "search_date_ideas");
    }

    #[test]
    fn test_from_value_rejects_unrelated_json() {
        assert!(StructuredAnswer::from_value(&json!({"foo": 1})).is_none());
        assert!(StructuredAnswer::from_value(&json!([1, 2])).is_none());
    }

    #[test]
    fn test_validated_drops_unknown_ids_and_blank_fields() {
        let answer = StructuredAnswer::new("s")
            .with_option(option("candidate_1", "The Whalesbone", "Oysters"))
            .with_option(option("candidate_9", "Ghost", "Does not exist"))
            .with_option(option("candidate_2", "  ", "No title"))
            .with_option(option("candidate_2", "Riviera", ""));

        let (clean, dropped) = answer.validated(&candidates());
        assert_eq!(clean.options.len(), 1);
        assert!(clean.references_only(&candidates()));
        assert_eq!(dropped.len(), 3);
        assert_eq!(
            dropped[0].reason,
            DropReason::UnknownCandidate("candidate_9".into())
        );
        assert_eq!(dropped[1].reason, DropReason::MissingTitle);
        assert_eq!(dropped[2].reason, DropReason::MissingJustification);
    }

    #[test]
    fn test_validated_fills_source_and_url_from_candidate() {
        let answer =
            StructuredAnswer::new("s").with_option(option("candidate_1", "The Whalesbone", "Oysters"));
        let (clean, _) = answer.validated(&candidates());
        assert_eq!(clean.options[0].source_tool, "search_date_ideas");
        assert_eq!(
            clean.options[0].url.as_deref(),
            Some("https://thewhalesbone.com")
        );
    }

    #[test]
    fn test_logistics_alone_is_enough() {
        let mut opt = option("candidate_2", "Riviera", "");
        opt.logistics = "Reserve ahead".into();
        let (clean, dropped) = StructuredAnswer::new("s")
            .with_option(opt)
            .validated(&candidates());
        assert_eq!(clean.options.len(), 1);
        assert!(dropped.is_empty());
    }

    #[test]
    fn test_parse_answer_text_fenced_block() {
        let text = "Here you go!\n```json\n{\"summary\": \"One idea\", \"options\": []}\n```\nEnjoy.";
        let answer = parse_answer_text(text).unwrap();
        assert_eq!(answer.summary, "One idea");
    }

    #[test]
    fn test_parse_answer_text_raw_json_and_plain_text() {
        assert!(parse_answer_text("{\"summary\": \"x\"}").is_some());
        assert!(parse_answer_text("just chatting").is_none());
    }

    #[test]
    fn test_no_matches_summary_is_not_empty() {
        let answer = StructuredAnswer::no_matches("sledding in July");
        assert!(answer.options.is_empty());
        assert!(answer.summary.contains("sledding in July"));
    }
}
