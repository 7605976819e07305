//! Entity domain module
//!
//! Tools return [`EntityRecord`]s; the aggregator turns them into
//! deduplicated [`CandidateEntity`]s with turn-scoped ids.

pub mod entities;
pub mod normalize;

pub use entities::{
    CandidateEntity, EntityKind, EntityRecord, GeoPoint, candidate_id, is_non_empty,
};
pub use normalize::{GEO_CELL_DEGREES, GeoCell, normalize_title, same_place};
