//! Tool selection policy
//!
//! Starts from whatever the LLM asked for and, when fewer than
//! `min_diversity` distinct tools were requested, adds invocations from the
//! intent's recommendations followed by the baseline list. Forcing is
//! additive only: requested invocations are never removed or reordered.

use serde_json::{Value, json};
use std::collections::BTreeMap;

use crate::intent::{IntentKind, QueryIntent};
use crate::tool::catalog::{
    BASELINE_FORCED_TOOLS, ENHANCED_WEB_SEARCH, EVENTBRITE_SEARCH, FIND_NEARBY_VENUES,
    GEOCODE_LOCATION, GET_DIRECTIONS, GOOGLE_PLACES_SEARCH, SCRAPINGBEE_SCRAPE,
    SEARCH_DATE_IDEAS, SEARCH_FEATURED_DATES, WEB_SCRAPE_VENUE_INFO, WEB_SEARCH,
};
use crate::tool::{InvocationOrigin, ToolInvocation};
use crate::turn::{Constraints, UserLocation};

/// Everything the policy may draw on to synthesise arguments
#[derive(Debug, Clone, Copy)]
pub struct SelectionContext<'a> {
    pub utterance: &'a str,
    pub constraints: &'a Constraints,
    pub user_location: Option<UserLocation>,
    pub intent: &'a QueryIntent,
    /// Result count for knowledge-store searches
    pub top_k: Option<u32>,
    /// Registered tool names; `None` means the whole catalog
    pub available_tools: Option<&'a [String]>,
}

impl<'a> SelectionContext<'a> {
    pub fn new(utterance: &'a str, constraints: &'a Constraints, intent: &'a QueryIntent) -> Self {
        Self {
            utterance,
            constraints,
            user_location: None,
            intent,
            top_k: None,
            available_tools: None,
        }
    }

    pub fn with_location(mut self, location: Option<UserLocation>) -> Self {
        self.user_location = location;
        self
    }

    pub fn with_top_k(mut self, top_k: u32) -> Self {
        self.top_k = Some(top_k);
        self
    }

    pub fn with_available_tools(mut self, tools: &'a [String]) -> Self {
        self.available_tools = Some(tools);
        self
    }

    fn is_available(&self, tool: &str) -> bool {
        self.available_tools
            .is_none_or(|tools| tools.iter().any(|t| t == tool))
    }

    /// Search text for forced invocations; never blank
    fn query(&self) -> String {
        let utterance = self.utterance.trim();
        if utterance.is_empty() {
            format!("{} date ideas", self.intent.category)
        } else {
            utterance.to_string()
        }
    }

    /// A category worth passing on, if the intent has a specific one
    fn specific_category(&self) -> Option<&str> {
        match self.intent.category.as_str() {
            "general" | "comprehensive" | "" => None,
            other => Some(other),
        }
    }

    fn first_url(&self) -> Option<&str> {
        self.utterance
            .split_whitespace()
            .map(|w| {
                w.trim_matches(|c: char| {
                    matches!(c, '<' | '>' | '(' | ')' | ',' | '"' | '?' | '!' | '.')
                })
            })
            .find(|w| w.starts_with("http://") || w.starts_with("https://"))
    }
}

/// Diversity forcing parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionPolicy {
    pub min_diversity: usize,
    pub max_forced: usize,
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        Self {
            min_diversity: 3,
            max_forced: 3,
        }
    }
}

impl SelectionPolicy {
    pub fn new(min_diversity: usize, max_forced: usize) -> Self {
        Self {
            min_diversity,
            max_forced,
        }
    }

    /// Ordered, de-duplicated forcing candidates for an intent
    pub fn forcing_candidates(intent: &QueryIntent) -> Vec<String> {
        let mut candidates: Vec<String> = Vec::new();
        let baseline = BASELINE_FORCED_TOOLS.iter().map(|t| t.to_string());
        for tool in intent.recommended_tools.iter().cloned().chain(baseline) {
            if !candidates.contains(&tool) {
                candidates.push(tool);
            }
        }
        candidates
    }

    /// Final invocation set for the first execution round
    pub fn select(
        &self,
        llm_requested: Vec<ToolInvocation>,
        ctx: &SelectionContext<'_>,
    ) -> Vec<ToolInvocation> {
        let mut present: Vec<String> = Vec::new();
        for inv in &llm_requested {
            if !present.contains(&inv.tool_name) {
                present.push(inv.tool_name.clone());
            }
        }

        let mut selected = llm_requested;
        if present.len() >= self.min_diversity {
            return selected;
        }

        let mut forced = 0;
        for tool in Self::forcing_candidates(ctx.intent) {
            if present.len() >= self.min_diversity || forced >= self.max_forced {
                break;
            }
            if present.contains(&tool) || !ctx.is_available(&tool) {
                continue;
            }
            let Some(arguments) = forced_arguments(&tool, ctx) else {
                continue;
            };
            selected.push(
                ToolInvocation::new(tool.clone(), InvocationOrigin::Forced).with_arguments(arguments),
            );
            present.push(tool);
            forced += 1;
        }

        selected
    }

    /// Next recommended tool not yet tried, for the extra reflection round
    pub fn reflection_tool(
        &self,
        already_invoked: &[&str],
        ctx: &SelectionContext<'_>,
    ) -> Option<ToolInvocation> {
        ctx.intent
            .recommended_tools
            .iter()
            .filter(|tool| !already_invoked.contains(&tool.as_str()) && ctx.is_available(tool))
            .find_map(|tool| {
                forced_arguments(tool, ctx).map(|arguments| {
                    ToolInvocation::new(tool.clone(), InvocationOrigin::Reflection)
                        .with_arguments(arguments)
                })
            })
    }
}

/// Best-effort arguments for a tool nobody explicitly asked for.
///
/// Returns `None` when a required parameter cannot be filled from the
/// utterance, constraints, intent or user location.
pub fn forced_arguments(tool: &str, ctx: &SelectionContext<'_>) -> Option<BTreeMap<String, Value>> {
    let mut args = BTreeMap::new();
    let city = ctx.intent.city.clone();
    let query = ctx.query();

    match tool {
        SEARCH_DATE_IDEAS => {
            args.insert("query".into(), json!(query));
            args.insert("city".into(), json!(city));
            if let Some(tier) = ctx.constraints.budget_tier {
                args.insert("max_price_tier".into(), json!(tier));
            }
            if let Some(indoor) = ctx.constraints.indoor {
                args.insert("indoor".into(), json!(indoor));
            }
            if !ctx.constraints.categories.is_empty() {
                args.insert("categories".into(), json!(ctx.constraints.categories));
            }
            if let Some(bounds) = ctx.constraints.duration_bounds {
                if let Some(min) = bounds.min_minutes {
                    args.insert("min_duration".into(), json!(min));
                }
                if let Some(max) = bounds.max_minutes {
                    args.insert("max_duration".into(), json!(max));
                }
            }
            if let Some(top_k) = ctx.top_k {
                args.insert("top_k".into(), json!(top_k));
            }
        }
        SEARCH_FEATURED_DATES => {
            args.insert("city".into(), json!(city));
            if let Some(category) = ctx.specific_category() {
                args.insert("category".into(), json!(category));
            }
        }
        GOOGLE_PLACES_SEARCH => {
            let query = if query.to_lowercase().contains(&city.to_lowercase()) {
                query
            } else {
                format!("{} {}", query, city)
            };
            args.insert("query".into(), json!(query));
            args.insert("location".into(), json!(city));
        }
        FIND_NEARBY_VENUES => {
            let location = ctx.user_location?;
            args.insert("lat".into(), json!(location.lat));
            args.insert("lon".into(), json!(location.lon));
            let venue_type = match ctx.intent.intent_kind {
                IntentKind::Restaurant => "restaurant",
                IntentKind::Event => "entertainment",
                _ => "point_of_interest",
            };
            args.insert("venue_type".into(), json!(venue_type));
        }
        ENHANCED_WEB_SEARCH => {
            args.insert("query".into(), json!(query));
            args.insert("city".into(), json!(city));
            let result_type = if ctx.intent.intent_kind == IntentKind::Event {
                "events"
            } else {
                "general"
            };
            args.insert("result_type".into(), json!(result_type));
        }
        EVENTBRITE_SEARCH | WEB_SEARCH => {
            args.insert("query".into(), json!(query));
            args.insert("city".into(), json!(city));
        }
        WEB_SCRAPE_VENUE_INFO | SCRAPINGBEE_SCRAPE => {
            args.insert("url".into(), json!(ctx.first_url()?));
        }
        GEOCODE_LOCATION => {
            if !ctx.intent.location_specific {
                return None;
            }
            args.insert("address".into(), json!(city));
        }
        GET_DIRECTIONS => return None,
        _ => return None,
    }

    Some(args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::classify;

    fn names(invocations: &[ToolInvocation]) -> Vec<&str> {
        invocations.iter().map(|i| i.tool_name.as_str()).collect()
    }

    #[test]
    fn test_single_llm_tool_is_topped_up_to_diversity() {
        let constraints = Constraints::new().with_budget_tier(2);
        let utterance = "romantic dinner in Ottawa under $75";
        let intent = classify(utterance, &constraints);
        let ctx = SelectionContext::new(utterance, &constraints, &intent);

        let requested = vec![
            ToolInvocation::requested(GOOGLE_PLACES_SEARCH).with_arg("query", "romantic dinner"),
        ];
        let selected = SelectionPolicy::default().select(requested, &ctx);

        assert_eq!(selected.len(), 3);
        assert_eq!(selected[0].tool_name, GOOGLE_PLACES_SEARCH);
        assert_eq!(selected[0].origin, InvocationOrigin::Llm);
        // Restaurant recommendations after google_places_search
        assert_eq!(names(&selected)[1..], [ENHANCED_WEB_SEARCH, SEARCH_DATE_IDEAS]);
        assert!(selected[1..].iter().all(|i| i.origin == InvocationOrigin::Forced));
        assert_eq!(selected[2].get_u64("max_price_tier"), Some(2));
    }

    #[test]
    fn test_enough_diversity_is_untouched() {
        let constraints = Constraints::new();
        let intent = classify("dinner", &constraints);
        let ctx = SelectionContext::new("dinner", &constraints, &intent);
        let requested = vec![
            ToolInvocation::requested(WEB_SEARCH).with_arg("query", "a"),
            ToolInvocation::requested(GEOCODE_LOCATION).with_arg("address", "b"),
            ToolInvocation::requested(EVENTBRITE_SEARCH).with_arg("query", "c"),
            ToolInvocation::requested(WEB_SEARCH).with_arg("query", "d"),
        ];
        let selected = SelectionPolicy::default().select(requested.clone(), &ctx);
        assert_eq!(selected, requested);
    }

    #[test]
    fn test_duplicate_requests_count_once_for_diversity() {
        let constraints = Constraints::new();
        let intent = classify("dinner", &constraints);
        let ctx = SelectionContext::new("dinner", &constraints, &intent);
        let requested = vec![
            ToolInvocation::requested(WEB_SEARCH).with_arg("query", "a"),
            ToolInvocation::requested(WEB_SEARCH).with_arg("query", "b"),
        ];
        let selected = SelectionPolicy::default().select(requested, &ctx);
        assert_eq!(selected.len(), 4);
        assert_eq!(names(&selected)[2..], [GOOGLE_PLACES_SEARCH, ENHANCED_WEB_SEARCH]);
    }

    #[test]
    fn test_empty_request_forces_up_to_cap() {
        let constraints = Constraints::new();
        let intent = QueryIntent::general("Ottawa");
        let ctx = SelectionContext::new("", &constraints, &intent);

        let selected = SelectionPolicy::new(5, 3).select(Vec::new(), &ctx);
        // Empty recommendations fall back to the baseline list, capped at 3
        assert_eq!(
            names(&selected),
            vec![SEARCH_DATE_IDEAS, GOOGLE_PLACES_SEARCH, ENHANCED_WEB_SEARCH]
        );
        assert_eq!(selected[0].get_str("query"), Some("general date ideas"));
    }

    #[test]
    fn test_unsatisfiable_tools_are_skipped() {
        let constraints = Constraints::new();
        let mut intent = QueryIntent::general("Ottawa");
        intent.recommended_tools = vec![
            FIND_NEARBY_VENUES.to_string(),
            WEB_SCRAPE_VENUE_INFO.to_string(),
            GET_DIRECTIONS.to_string(),
        ];
        let ctx = SelectionContext::new("ideas", &constraints, &intent);
        let selected = SelectionPolicy::default().select(Vec::new(), &ctx);
        assert_eq!(
            names(&selected),
            vec![SEARCH_DATE_IDEAS, GOOGLE_PLACES_SEARCH, ENHANCED_WEB_SEARCH]
        );

        let ctx = ctx.with_location(Some(UserLocation::new(45.4, -75.7)));
        let selected = SelectionPolicy::default().select(Vec::new(), &ctx);
        assert_eq!(selected[0].tool_name, FIND_NEARBY_VENUES);
        assert_eq!(selected[0].get_f64("lat"), Some(45.4));
    }

    #[test]
    fn test_scrape_uses_url_from_utterance() {
        let constraints = Constraints::new();
        let mut intent = QueryIntent::general("Ottawa");
        intent.recommended_tools = vec![WEB_SCRAPE_VENUE_INFO.to_string()];
        let ctx = SelectionContext::new(
            "what are the hours at (https://example.com/menu)?",
            &constraints,
            &intent,
        );
        let args = forced_arguments(WEB_SCRAPE_VENUE_INFO, &ctx).unwrap();
        assert_eq!(args["url"], json!("https://example.com/menu"));
    }

    #[test]
    fn test_zero_min_diversity_disables_forcing() {
        let constraints = Constraints::new();
        let intent = classify("dinner", &constraints);
        let ctx = SelectionContext::new("dinner", &constraints, &intent);
        let selected = SelectionPolicy::new(0, 3).select(Vec::new(), &ctx);
        assert!(selected.is_empty());
    }

    #[test]
    fn test_reflection_tool_skips_invoked() {
        let constraints = Constraints::new();
        let intent = classify("concert", &constraints);
        let ctx = SelectionContext::new("concert", &constraints, &intent);
        let next = SelectionPolicy::default()
            .reflection_tool(&[EVENTBRITE_SEARCH, ENHANCED_WEB_SEARCH], &ctx)
            .unwrap();
        assert_eq!(next.tool_name, SEARCH_FEATURED_DATES);
        assert_eq!(next.origin, InvocationOrigin::Reflection);

        let none = SelectionPolicy::default().reflection_tool(
            &[EVENTBRITE_SEARCH, ENHANCED_WEB_SEARCH, SEARCH_FEATURED_DATES],
            &ctx,
        );
        assert!(none.is_none());
    }

    #[test]
    fn test_forcing_skips_unregistered_tools() {
        let constraints = Constraints::new();
        let intent = classify("romantic dinner in Ottawa", &constraints);
        let registered = vec![
            GOOGLE_PLACES_SEARCH.to_string(),
            SEARCH_DATE_IDEAS.to_string(),
            EVENTBRITE_SEARCH.to_string(),
        ];
        let ctx = SelectionContext::new("romantic dinner in Ottawa", &constraints, &intent)
            .with_available_tools(&registered);
        let selected = SelectionPolicy::default().select(Vec::new(), &ctx);
        let names: Vec<_> = selected.iter().map(|i| i.tool_name.as_str()).collect();
        assert_eq!(names, vec![GOOGLE_PLACES_SEARCH, SEARCH_DATE_IDEAS, EVENTBRITE_SEARCH]);
    }
}
