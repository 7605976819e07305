//! Title normalisation and geo bucketing used for deduplication

use super::entities::GeoPoint;

/// Size of one geo cell in degrees (roughly 100 m of latitude)
pub const GEO_CELL_DEGREES: f64 = 0.001;

/// Lowercase, strip punctuation, collapse whitespace.
///
/// ```
/// use planner_domain::entity::normalize_title;
/// assert_eq!(normalize_title("  The  Whalesbone! "), "the whalesbone");
/// ```
pub fn normalize_title(title: &str) -> String {
    let cleaned: String = title
        .chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c.to_lowercase().next().unwrap_or(c)
            } else if c.is_whitespace() {
                ' '
            } else {
                // Punctuation is dropped; apostrophes inside words must not
                // split them ("Joe's" -> "joes").
                '\0'
            }
        })
        .filter(|c| *c != '\0')
        .collect();

    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Grid cell a point falls into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GeoCell {
    pub lat_index: i64,
    pub lon_index: i64,
}

impl GeoCell {
    pub fn of(point: GeoPoint) -> Self {
        Self {
            lat_index: (point.lat / GEO_CELL_DEGREES).floor() as i64,
            lon_index: (point.lon / GEO_CELL_DEGREES).floor() as i64,
        }
    }
}

/// Whether two optional locations are compatible for deduplication.
///
/// When both sides have a location they must share a cell; otherwise the
/// title match alone decides.
pub fn same_place(a: Option<GeoPoint>, b: Option<GeoPoint>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => GeoCell::of(a) == GeoCell::of(b),
        _ => true,
    }
}
