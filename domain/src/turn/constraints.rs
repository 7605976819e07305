//! User-supplied filters for a turn

use serde::{Deserialize, Serialize};

use crate::core::error::DomainError;
use crate::entity::GeoPoint;

/// Lower and upper duration limits in minutes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DurationBounds {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_minutes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_minutes: Option<u32>,
}

/// Optional structured filters accompanying an utterance.
///
/// Every field is optional; an empty `Constraints` means "no filtering".
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Constraints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    /// 1 = budget, 2 = moderate, 3 = expensive
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_tier: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_bounds: Option<DurationBounds>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indoor: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,
}

impl Constraints {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    pub fn with_budget_tier(mut self, tier: u8) -> Self {
        self.budget_tier = Some(tier);
        self
    }

    pub fn with_duration(mut self, min_minutes: Option<u32>, max_minutes: Option<u32>) -> Self {
        self.duration_bounds = Some(DurationBounds {
            min_minutes,
            max_minutes,
        });
        self
    }

    pub fn with_indoor(mut self, indoor: bool) -> Self {
        self.indoor = Some(indoor);
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.categories.push(category.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Reject values outside their documented ranges
    pub fn validate(&self) -> Result<(), DomainError> {
        if let Some(tier) = self.budget_tier
            && !(1..=3).contains(&tier)
        {
            return Err(DomainError::InvalidConstraints(format!(
                "budget tier must be between 1 and 3, got {}",
                tier
            )));
        }
        if let Some(DurationBounds {
            min_minutes: Some(min),
            max_minutes: Some(max),
        }) = self.duration_bounds
            && min > max
        {
            return Err(DomainError::InvalidConstraints(format!(
                "minimum duration {} exceeds maximum {}",
                min, max
            )));
        }
        Ok(())
    }

    /// Short human-readable rendering used in prompts
    pub fn describe(&self) -> String {
        let mut parts = Vec::new();
        if let Some(city) = &self.city {
            parts.push(format!("city: {}", city));
        }
        if let Some(tier) = self.budget_tier {
            parts.push(format!("budget tier: {} of 3", tier));
        }
        if let Some(bounds) = &self.duration_bounds {
            match (bounds.min_minutes, bounds.max_minutes) {
                (Some(min), Some(max)) => parts.push(format!("duration: {}-{} min", min, max)),
                (Some(min), None) => parts.push(format!("duration: at least {} min", min)),
                (None, Some(max)) => parts.push(format!("duration: at most {} min", max)),
                (None, None) => {}
            }
        }
        match self.indoor {
            Some(true) => parts.push("indoor".to_string()),
            Some(false) => parts.push("outdoor".to_string()),
            None => {}
        }
        if !self.categories.is_empty() {
            parts.push(format!("categories: {}", self.categories.join(", ")));
        }
        if parts.is_empty() {
            "none".to_string()
        } else {
            parts.join("; ")
        }
    }
}

/// Where the user currently is, when the caller knows it
pub type UserLocation = GeoPoint;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_constraints() {
        assert!(Constraints::new().is_empty());
        assert_eq!(Constraints::new().describe(), "none");
        assert!(Constraints::new().validate().is_ok());
    }

    #[test]
    fn test_budget_tier_range() {
        assert!(Constraints::new().with_budget_tier(3).validate().is_ok());
        assert!(Constraints::new().with_budget_tier(0).validate().is_err());
        assert!(Constraints::new().with_budget_tier(4).validate().is_err());
    }

    #[test]
    fn test_duration_bounds_order() {
        let bad = Constraints::new().with_duration(Some(120), Some(60));
        assert!(bad.validate().is_err());
        let ok = Constraints::new().with_duration(Some(60), None);
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn test_describe() {
        let c = Constraints::new()
            .with_city("Ottawa")
            .with_budget_tier(2)
            .with_indoor(true)
            .with_category("romantic");
        assert_eq!(
            c.describe(),
            "city: Ottawa; budget tier: 2 of 3; indoor; categories: romantic"
        );
    }
}
