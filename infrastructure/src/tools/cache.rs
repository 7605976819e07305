//! TTL cache for successful tool results.
//!
//! One [`ResultCache`] is created at start-up and shared by every turn of
//! every session through an `Arc`. It is the only cross-turn mutable state
//! in the process.
//!
//! Keys come from [`ToolInvocation::cache_key`](planner_domain::ToolInvocation::cache_key):
//! the tool name plus canonical JSON of the arguments. Failures are never
//! stored, so a transient error can be retried by the next identical call.

use planner_domain::ToolResult;
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;
use tokio::time::Instant;

/// Default entry lifetime
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

struct CacheEntry {
    result: ToolResult,
    stored_at: Instant,
}

/// Thread-safe cache of successful [`ToolResult`]s with TTL eviction
pub struct ResultCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    ttl: Duration,
}

impl ResultCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Fresh entry for `key`, marked as a cache hit
    pub fn get(&self, key: &str) -> Option<ToolResult> {
        let entries = self.entries.read().ok()?;
        let entry = entries.get(key)?;
        if entry.stored_at.elapsed() >= self.ttl {
            return None;
        }
        Some(entry.result.as_cache_hit())
    }

    /// Store a result. Anything but a success is ignored.
    pub fn put(&self, key: impl Into<String>, result: &ToolResult) {
        if !result.is_success() || self.ttl.is_zero() {
            return;
        }
        let Ok(mut entries) = self.entries.write() else {
            return;
        };
        let ttl = self.ttl;
        entries.retain(|_, e| e.stored_at.elapsed() < ttl);
        entries.insert(
            key.into(),
            CacheEntry {
                result: result.clone(),
                stored_at: Instant::now(),
            },
        );
    }

    /// Drop expired entries, returning how many were removed
    pub fn purge_expired(&self) -> usize {
        let Ok(mut entries) = self.entries.write() else {
            return 0;
        };
        let before = entries.len();
        let ttl = self.ttl;
        entries.retain(|_, e| e.stored_at.elapsed() < ttl);
        before - entries.len()
    }

    /// Number of stored entries, including expired ones not yet purged
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_TTL)
    }
}
