//! Entity records and candidates

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// What kind of real-world thing a record describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    #[default]
    Venue,
    Event,
    Article,
    DatabaseRecord,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Venue => "venue",
            EntityKind::Event => "event",
            EntityKind::Article => "article",
            EntityKind::DatabaseRecord => "database_record",
        }
    }
}

/// Latitude/longitude pair in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }
}

/// A candidate-shaped record as returned by a tool, before it has an id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct EntityRecord {
    #[serde(default)]
    pub kind: EntityKind,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geo: Option<GeoPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_hint: Option<String>,
    /// Ranking signal from the knowledge store, used for tie-breaks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub similarity_score: Option<f64>,
    #[serde(default)]
    pub raw_attributes: Map<String, Value>,
}

impl EntityRecord {
    pub fn new(kind: EntityKind, title: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn venue(title: impl Into<String>) -> Self {
        Self::new(EntityKind::Venue, title)
    }

    pub fn event(title: impl Into<String>) -> Self {
        Self::new(EntityKind::Event, title)
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_geo(mut self, lat: f64, lon: f64) -> Self {
        self.geo = Some(GeoPoint::new(lat, lon));
        self
    }

    pub fn with_price_hint(mut self, price: impl Into<String>) -> Self {
        self.price_hint = Some(price.into());
        self
    }

    pub fn with_similarity(mut self, score: f64) -> Self {
        self.similarity_score = Some(score);
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.raw_attributes.insert(key.into(), value.into());
        self
    }

    /// Number of `raw_attributes` entries carrying real information
    pub fn non_empty_attribute_count(&self) -> usize {
        self.raw_attributes
            .values()
            .filter(|v| is_non_empty(v))
            .count()
    }

    /// Geo point if present and within valid coordinate ranges
    pub fn valid_geo(&self) -> Option<GeoPoint> {
        self.geo.filter(GeoPoint::is_valid)
    }
}

/// Whether a JSON value carries information (not null, "", [] or {})
pub fn is_non_empty(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
        Value::Bool(_) | Value::Number(_) => true,
    }
}

/// A deduplicated entity with a turn-scoped id.
///
/// Candidates are never mutated; merging duplicates produces a new value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateEntity {
    /// `candidate_<n>`, unique within the turn
    pub id: String,
    pub source_tool: String,
    #[serde(flatten)]
    pub record: EntityRecord,
}

impl CandidateEntity {
    pub fn new(index: usize, source_tool: impl Into<String>, record: EntityRecord) -> Self {
        Self {
            id: candidate_id(index),
            source_tool: source_tool.into(),
            record,
        }
    }

    pub fn title(&self) -> &str {
        &self.record.title
    }

    pub fn kind(&self) -> EntityKind {
        self.record.kind
    }

    /// One-line summary used in synthesis prompts
    pub fn prompt_line(&self) -> String {
        let mut line = format!(
            "[{}] {} ({}, via {})",
            self.id,
            self.record.title,
            self.record.kind.as_str(),
            self.source_tool
        );
        if let Some(price) = &self.record.price_hint {
            line.push_str(&format!(" price: {}", price));
        }
        if !self.record.description.is_empty() {
            line.push_str(" - ");
            line.push_str(crate::util::truncate_str(&self.record.description, 200));
        }
        if let Some(url) = &self.record.url {
            line.push_str(&format!(" <{}>", url));
        }
        line
    }
}

/// Format the 1-based candidate id
pub fn candidate_id(index: usize) -> String {
    format!("candidate_{}", index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_non_empty_attribute_count() {
        let record = EntityRecord::venue("Cafe")
            .with_attribute("rating", 4.5)
            .with_attribute("phone", "")
            .with_attribute("hours", Value::Null)
            .with_attribute("tags", json!([]))
            .with_attribute("address", "1 Main St");
        assert_eq!(record.non_empty_attribute_count(), 2);
    }

    #[test]
    fn test_record_deserializes_with_defaults() {
        let record: EntityRecord = serde_json::from_value(json!({
            "title": "The Whalesbone",
            "geo": {"lat": 45.41, "lon": -75.69}
        }))
        .unwrap();
        assert_eq!(record.kind, EntityKind::Venue);
        assert!(record.description.is_empty());
        assert!(record.valid_geo().is_some());
    }

    #[test]
    fn test_invalid_geo_is_ignored() {
        let record = EntityRecord::venue("Nowhere").with_geo(f64::NAN, 10.0);
        assert!(record.valid_geo().is_none());
        let record = EntityRecord::venue("Nowhere").with_geo(95.0, 10.0);
        assert!(record.valid_geo().is_none());
    }

    #[test]
    fn test_candidate_serializes_flat() {
        let candidate = CandidateEntity::new(1, "search_date_ideas", EntityRecord::venue("Cafe"));
        let value = serde_json::to_value(&candidate).unwrap();
        assert_eq!(value["id"], "candidate_1");
        assert_eq!(value["title"], "Cafe");
        assert_eq!(value["source_tool"], "search_date_ideas");
    }

    #[test]
    fn test_prompt_line() {
        let candidate = CandidateEntity::new(
            2,
            "google_places_search",
            EntityRecord::venue("Riviera")
                .with_price_hint("$$$")
                .with_description("Elegant dining"),
        );
        let line = candidate.prompt_line();
        assert!(line.starts_with("[candidate_2] Riviera (venue, via google_places_search)"));
        assert!(line.contains("price: $$$"));
        assert!(line.contains("Elegant dining"));
    }
}
