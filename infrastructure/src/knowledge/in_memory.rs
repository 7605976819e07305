//! In-memory knowledge store over curated date ideas.

use async_trait::async_trait;
use planner_application::ports::knowledge_store::{KnowledgeStore, KnowledgeStoreError, SearchFilters};
use planner_domain::{EntityKind, EntityRecord};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

/// Seed shipped with the binary, used when no `knowledge_seed` is configured
const BUILTIN_SEED: &str = include_str!("../../data/date_ideas.json");

const STOPWORDS: [&str; 12] = [
    "a", "an", "and", "at", "for", "in", "of", "on", "or", "the", "to", "with",
];

/// One curated idea as stored in the seed file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateIdea {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub city: Option<String>,
    /// 1 = budget, 2 = moderate, 3 = expensive
    #[serde(default)]
    pub price_tier: Option<u8>,
    #[serde(default)]
    pub indoor: Option<bool>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub duration_minutes: Option<u32>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
}

impl DateIdea {
    /// Filters pass when the idea satisfies them or lacks the field
    fn matches(&self, filters: &SearchFilters) -> bool {
        if let Some(city) = &filters.city
            && let Some(own) = &self.city
            && !own.eq_ignore_ascii_case(city)
        {
            return false;
        }
        if let (Some(max), Some(tier)) = (filters.max_price_tier, self.price_tier)
            && tier > max
        {
            return false;
        }
        if let (Some(indoor), Some(own)) = (filters.indoor, self.indoor)
            && indoor != own
        {
            return false;
        }
        if !filters.categories.is_empty()
            && !self.categories.is_empty()
            && !filters
                .categories
                .iter()
                .any(|c| self.categories.iter().any(|own| own.eq_ignore_ascii_case(c)))
        {
            return false;
        }
        if let Some(duration) = self.duration_minutes {
            if filters.min_duration.is_some_and(|min| duration < min) {
                return false;
            }
            if filters.max_duration.is_some_and(|max| duration > max) {
                return false;
            }
        }
        true
    }

    fn tokens(&self) -> HashSet<String> {
        let mut text = format!("{} {}", self.title, self.description);
        for category in &self.categories {
            text.push(' ');
            text.push_str(category);
        }
        tokenize(&text)
    }

    fn to_record(&self, score: f64) -> EntityRecord {
        let mut record = EntityRecord::new(EntityKind::DatabaseRecord, self.title.clone())
            .with_description(self.description.clone())
            .with_similarity(score);
        if let Some(url) = &self.url {
            record = record.with_url(url.clone());
        }
        if let (Some(lat), Some(lon)) = (self.lat, self.lon) {
            record = record.with_geo(lat, lon);
        }
        if let Some(tier) = self.price_tier {
            record = record
                .with_price_hint("$".repeat(usize::from(tier)))
                .with_attribute("price_tier", tier);
        }
        if let Some(city) = &self.city {
            record = record.with_attribute("city", city.clone());
        }
        if let Some(indoor) = self.indoor {
            record = record.with_attribute("indoor", indoor);
        }
        if !self.categories.is_empty() {
            record = record.with_attribute("categories", self.categories.clone());
        }
        if let Some(duration) = self.duration_minutes {
            record = record.with_attribute("duration_minutes", duration);
        }
        record
    }
}

fn tokenize(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .filter(|t| !STOPWORDS.contains(&t.as_str()))
        .collect()
}

/// Read-only store ranking ideas by the share of query words they contain
#[derive(Debug, Clone, Default)]
pub struct InMemoryKnowledgeStore {
    ideas: Vec<DateIdea>,
}

impl InMemoryKnowledgeStore {
    pub fn new(ideas: Vec<DateIdea>) -> Self {
        Self { ideas }
    }

    /// Store over the seed shipped with the binary
    pub fn builtin() -> Result<Self, KnowledgeStoreError> {
        Self::from_json_str(BUILTIN_SEED)
    }

    pub fn from_json_str(json: &str) -> Result<Self, KnowledgeStoreError> {
        let ideas: Vec<DateIdea> = serde_json::from_str(json)
            .map_err(|e| KnowledgeStoreError::Unavailable(format!("invalid seed: {}", e)))?;
        Ok(Self::new(ideas))
    }

    pub fn from_json_file(path: &Path) -> Result<Self, KnowledgeStoreError> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            KnowledgeStoreError::Unavailable(format!("{}: {}", path.display(), e))
        })?;
        Self::from_json_str(&json)
    }

    pub fn len(&self) -> usize {
        self.ideas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ideas.is_empty()
    }
}

#[async_trait]
impl KnowledgeStore for InMemoryKnowledgeStore {
    async fn search(
        &self,
        query: &str,
        filters: &SearchFilters,
        top_k: usize,
    ) -> Result<Vec<EntityRecord>, KnowledgeStoreError> {
        let query_tokens = tokenize(query);

        let mut scored: Vec<(f64, &DateIdea)> = self
            .ideas
            .iter()
            .filter(|idea| idea.matches(filters))
            .filter_map(|idea| {
                if query_tokens.is_empty() {
                    return Some((0.0, idea));
                }
                let own = idea.tokens();
                let hits = query_tokens.iter().filter(|t| own.contains(*t)).count();
                (hits > 0).then(|| (hits as f64 / query_tokens.len() as f64, idea))
            })
            .collect();

        // Stable: equal scores keep seed order
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));
        scored.truncate(top_k);

        debug!("Knowledge search '{}' matched {} ideas", query, scored.len());
        Ok(scored
            .into_iter()
            .map(|(score, idea)| idea.to_record(score))
            .collect())
    }
}
