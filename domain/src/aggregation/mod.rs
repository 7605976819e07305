//! Result aggregation
//!
//! Flattens successful tool payloads into one deterministic, deduplicated
//! candidate list.
//!
//! Ordering: results are stably sorted by [`catalog::priority`] of their
//! tool, so the knowledge store comes first and ties keep input order;
//! payload order is preserved within a result.
//!
//! Two records are duplicates when their normalised titles are equal and,
//! if both carry a location, the locations fall into the same
//! [`GeoCell`](crate::entity::GeoCell). The record from the higher-priority
//! tool wins; between records of the same tool the one with more non-empty
//! `raw_attributes` wins, then the higher similarity score. The winner
//! absorbs attributes only the loser had.

use crate::entity::{CandidateEntity, EntityRecord, is_non_empty, normalize_title, same_place};
use crate::tool::ToolResult;
use crate::tool::catalog;

/// Working entry while deduplicating
struct Survivor {
    source_tool: String,
    priority: usize,
    normalized_title: String,
    record: EntityRecord,
}

/// Deduplicates tool output into candidates
#[derive(Debug, Clone, Copy, Default)]
pub struct ResultAggregator;

impl ResultAggregator {
    pub fn new() -> Self {
        Self
    }

    /// Build candidates from a turn's results.
    ///
    /// Ids are `candidate_1..n` in survival order. Records whose title is
    /// empty after normalisation are skipped.
    pub fn aggregate(&self, results: &[ToolResult]) -> Vec<CandidateEntity> {
        let mut ordered: Vec<&ToolResult> = results.iter().filter(|r| r.is_success()).collect();
        ordered.sort_by_key(|r| catalog::priority(&r.tool_name));

        let mut survivors: Vec<Survivor> = Vec::new();

        for result in ordered {
            let priority = catalog::priority(&result.tool_name);
            for record in &result.payload {
                let normalized_title = normalize_title(&record.title);
                if normalized_title.is_empty() {
                    continue;
                }

                let existing = survivors.iter_mut().find(|s| {
                    s.normalized_title == normalized_title
                        && same_place(s.record.valid_geo(), record.valid_geo())
                });

                match existing {
                    Some(survivor) => {
                        let challenger_wins =
                            priority == survivor.priority && is_richer(record, &survivor.record);
                        if challenger_wins {
                            survivor.record = merged(record, &survivor.record);
                            survivor.source_tool = result.tool_name.clone();
                        } else {
                            survivor.record = merged(&survivor.record, record);
                        }
                    }
                    None => survivors.push(Survivor {
                        source_tool: result.tool_name.clone(),
                        priority,
                        normalized_title,
                        record: record.clone(),
                    }),
                }
            }
        }

        survivors
            .into_iter()
            .enumerate()
            .map(|(index, s)| CandidateEntity::new(index + 1, s.source_tool, s.record))
            .collect()
    }
}

/// Whether `challenger` should replace `incumbent` from the same tool
fn is_richer(challenger: &EntityRecord, incumbent: &EntityRecord) -> bool {
    let (a, b) = (
        challenger.non_empty_attribute_count(),
        incumbent.non_empty_attribute_count(),
    );
    if a != b {
        return a > b;
    }
    challenger.similarity_score.unwrap_or(f64::MIN) > incumbent.similarity_score.unwrap_or(f64::MIN)
}

/// New record: `winner` plus whatever only `loser` knew
fn merged(winner: &EntityRecord, loser: &EntityRecord) -> EntityRecord {
    let mut record = winner.clone();

    for (key, value) in &loser.raw_attributes {
        let winner_has = record.raw_attributes.get(key).is_some_and(is_non_empty);
        if !winner_has && is_non_empty(value) {
            record.raw_attributes.insert(key.clone(), value.clone());
        }
    }
    if record.description.trim().is_empty() && !loser.description.trim().is_empty() {
        record.description = loser.description.clone();
    }
    if record.url.is_none() {
        record.url = loser.url.clone();
    }
    if record.valid_geo().is_none() {
        record.geo = loser.valid_geo();
    }
    if record.price_hint.is_none() {
        record.price_hint = loser.price_hint.clone();
    }
    record
}
