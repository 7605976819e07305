//! Fixed keyword tables for intent classification
//!
//! Rules are checked in order and the first rule with a matching keyword
//! wins. Each rule carries its prioritised tool list, which is the
//! `intent → recommended_tools` mapping table.

use super::value_objects::{IntentKind, QueryIntent, Timeframe};
use crate::tool::catalog::{
    ENHANCED_WEB_SEARCH, EVENTBRITE_SEARCH, GOOGLE_PLACES_SEARCH, SEARCH_DATE_IDEAS,
    SEARCH_FEATURED_DATES, WEB_SCRAPE_VENUE_INFO,
};
use crate::turn::Constraints;

/// City used when neither the utterance nor the constraints name one
pub const DEFAULT_CITY: &str = "Ottawa";

/// Lowercase key → display name
pub const KNOWN_CITIES: [(&str, &str); 5] = [
    ("ottawa", "Ottawa"),
    ("toronto", "Toronto"),
    ("montreal", "Montreal"),
    ("vancouver", "Vancouver"),
    ("calgary", "Calgary"),
];

pub const TIME_WORDS: [&str; 6] = ["today", "tonight", "tomorrow", "weekend", "now", "soon"];

pub const BUDGET_WORDS: [&str; 6] = ["cheap", "free", "budget", "affordable", "expensive", "luxury"];

/// One row of the classification table
#[derive(Debug, Clone, Copy)]
pub struct KeywordRule {
    pub kind: IntentKind,
    pub category: &'static str,
    pub keywords: &'static [&'static str],
    pub tools: &'static [&'static str],
}

pub const RULES: [KeywordRule; 6] = [
    KeywordRule {
        kind: IntentKind::Restaurant,
        category: "food",
        keywords: &[
            "restaurant",
            "restaurants",
            "dining",
            "dinner",
            "lunch",
            "brunch",
            "food",
            "eat",
            "meal",
        ],
        tools: &[
            GOOGLE_PLACES_SEARCH,
            ENHANCED_WEB_SEARCH,
            SEARCH_DATE_IDEAS,
            SEARCH_FEATURED_DATES,
            EVENTBRITE_SEARCH,
        ],
    },
    KeywordRule {
        kind: IntentKind::Activity,
        category: "outdoor",
        keywords: &[
            "outdoor", "outdoors", "hike", "hiking", "park", "sledding", "skiing", "beach",
            "trail", "hill", "mountain", "lake", "river",
        ],
        tools: &[
            ENHANCED_WEB_SEARCH,
            GOOGLE_PLACES_SEARCH,
            SEARCH_DATE_IDEAS,
            SEARCH_FEATURED_DATES,
            EVENTBRITE_SEARCH,
        ],
    },
    KeywordRule {
        kind: IntentKind::Event,
        category: "entertainment",
        keywords: &[
            "event",
            "events",
            "concert",
            "concerts",
            "show",
            "shows",
            "festival",
            "performance",
        ],
        tools: &[EVENTBRITE_SEARCH, ENHANCED_WEB_SEARCH, SEARCH_FEATURED_DATES],
    },
    KeywordRule {
        kind: IntentKind::Activity,
        category: "cultural",
        keywords: &["museum", "museums", "gallery", "art", "culture", "exhibit"],
        tools: &[GOOGLE_PLACES_SEARCH, SEARCH_FEATURED_DATES, WEB_SCRAPE_VENUE_INFO],
    },
    KeywordRule {
        kind: IntentKind::Activity,
        category: "educational",
        keywords: &[
            "class", "classes", "workshop", "lesson", "course", "learn", "cooking", "pottery",
            "yoga", "fitness", "dance",
        ],
        tools: &[
            EVENTBRITE_SEARCH,
            GOOGLE_PLACES_SEARCH,
            ENHANCED_WEB_SEARCH,
            SEARCH_FEATURED_DATES,
        ],
    },
    KeywordRule {
        kind: IntentKind::General,
        category: "comprehensive",
        keywords: &[
            "date",
            "dates",
            "plan",
            "ideas",
            "things to do",
            "activities",
            "find",
            "suggest",
            "recommend",
        ],
        tools: &[
            ENHANCED_WEB_SEARCH,
            SEARCH_DATE_IDEAS,
            GOOGLE_PLACES_SEARCH,
            SEARCH_FEATURED_DATES,
            EVENTBRITE_SEARCH,
        ],
    },
];

/// Tools recommended when no rule matches
pub const GENERAL_TOOLS: [&str; 4] = [
    ENHANCED_WEB_SEARCH,
    SEARCH_DATE_IDEAS,
    GOOGLE_PLACES_SEARCH,
    EVENTBRITE_SEARCH,
];

/// Lowercased words of an utterance with punctuation removed
fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

/// Whole-word (or whole-phrase) keyword match
fn contains_keyword(tokens: &[String], keyword: &str) -> bool {
    let parts: Vec<&str> = keyword.split_whitespace().collect();
    match parts.as_slice() {
        [] => false,
        [single] => tokens.iter().any(|t| t == single),
        phrase => tokens
            .windows(phrase.len())
            .any(|w| w.iter().zip(phrase.iter()).all(|(a, b)| a == b)),
    }
}

fn matches_any(tokens: &[String], keywords: &[&str]) -> bool {
    keywords.iter().any(|k| contains_keyword(tokens, k))
}

/// Classify an utterance with the keyword tables.
///
/// Constraints take precedence over what the utterance says: a constraint
/// city replaces the detected one, the first constraint category replaces
/// the rule's category, and `indoor == true` drops web search from the
/// recommendations.
pub fn classify(utterance: &str, constraints: &Constraints) -> QueryIntent {
    let tokens = tokenize(utterance);

    let mut intent = QueryIntent::general(DEFAULT_CITY);
    match RULES.iter().find(|rule| matches_any(&tokens, rule.keywords)) {
        Some(rule) => {
            intent.intent_kind = rule.kind;
            intent.category = rule.category.to_string();
            intent.recommended_tools = rule.tools.iter().map(|t| t.to_string()).collect();
        }
        None => {
            intent.recommended_tools = GENERAL_TOOLS.iter().map(|t| t.to_string()).collect();
        }
    }

    if let Some((_, name)) = KNOWN_CITIES
        .iter()
        .find(|(key, _)| tokens.iter().any(|t| t == key))
    {
        intent.city = name.to_string();
        intent.location_specific = true;
    }

    if matches_any(&tokens, &TIME_WORDS) {
        intent.time_sensitive = true;
        intent.timeframe = Timeframe::Immediate;
        intent.recommended_tools.retain(|t| t != EVENTBRITE_SEARCH);
        intent.recommended_tools.insert(0, EVENTBRITE_SEARCH.to_string());
    }

    if matches_any(&tokens, &BUDGET_WORDS) || constraints.budget_tier.is_some_and(|t| t <= 1) {
        intent.budget_conscious = true;
    }

    if let Some(city) = constraints.city.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
        intent.city = city.to_string();
        intent.location_specific = true;
    }
    if let Some(category) = constraints.categories.first() {
        intent.category = category.clone();
    }
    if constraints.indoor == Some(true) {
        intent.recommended_tools.retain(|t| t != ENHANCED_WEB_SEARCH);
    }

    intent
}
