//! Query intent: what kind of outing the user wants, where, and when

pub mod keywords;
pub mod value_objects;

pub use keywords::{DEFAULT_CITY, KNOWN_CITIES, classify};
pub use value_objects::{IntentKind, QueryIntent, Timeframe};
