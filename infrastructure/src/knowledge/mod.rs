//! Knowledge store adapters.
//!
//! [`InMemoryKnowledgeStore`] implements the
//! [`KnowledgeStore`](planner_application::KnowledgeStore) port over a JSON
//! file of curated date ideas, ranked by token overlap with the query.

mod in_memory;

pub use in_memory::{DateIdea, InMemoryKnowledgeStore};
