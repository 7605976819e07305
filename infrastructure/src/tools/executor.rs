//! Parallel tool executor, the concrete implementation of [`ToolExecutorPort`].
//!
//! [`ParallelToolExecutor`] runs a batch of invocations concurrently against
//! the providers of a [`ToolRegistry`].
//!
//! # Per-invocation path
//!
//! ```text
//! invocation
//!   ├─ unknown tool?        → error result (unknown_tool), no dispatch
//!   ├─ coerce + validate    → error result (invalid_arguments), no dispatch
//!   ├─ cache hit?           → cached result, latency 0
//!   ├─ wait for a worker    (Semaphore, default 5 permits)
//!   └─ provider task        → success | error (tool_failure, panics too)
//!                             | timeout (per-call timeout)
//!                             | error (cancelled) when the token fires
//! ```
//!
//! Results come back in invocation order, one per invocation, and the
//! batch itself never fails.

use async_trait::async_trait;
use futures::future::join_all;
use planner_application::ports::tool_executor::ToolExecutorPort;
use planner_domain::{
    DefaultToolValidator, ToolDefinition, ToolError, ToolInvocation, ToolResult, ToolValidator,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::cache::ResultCache;
use super::registry::ToolRegistry;

/// Default size of the worker pool
pub const DEFAULT_MAX_WORKERS: usize = 5;

/// Executor that fans a batch out over a bounded worker pool.
///
/// Cloning is cheap; clones share the registry, the cache and the pool.
#[derive(Clone)]
pub struct ParallelToolExecutor {
    registry: Arc<ToolRegistry>,
    cache: Arc<ResultCache>,
    workers: Arc<Semaphore>,
    validator: DefaultToolValidator,
}

impl ParallelToolExecutor {
    pub fn new(registry: Arc<ToolRegistry>, cache: Arc<ResultCache>) -> Self {
        Self {
            registry,
            cache,
            workers: Arc::new(Semaphore::new(DEFAULT_MAX_WORKERS)),
            validator: DefaultToolValidator,
        }
    }

    /// Set the number of provider calls allowed in flight at once
    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.workers = Arc::new(Semaphore::new(max_workers.max(1)));
        self
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    async fn run_one(
        &self,
        invocation: &ToolInvocation,
        per_call_timeout: Duration,
        cancel: &CancellationToken,
    ) -> ToolResult {
        let tool = invocation.tool_name.as_str();

        let Some(provider) = self.registry.provider(tool) else {
            return ToolResult::failure(tool, ToolError::unknown_tool(tool), 0);
        };

        let mut invocation = invocation.clone();
        invocation.coerce_to(provider.definition());
        if let Err(e) = self.validator.validate(&invocation, provider.definition()) {
            debug!("Rejected {} before dispatch: {}", tool, e);
            return ToolResult::failure(tool, ToolError::invalid_arguments(e), 0);
        }

        let key = invocation.cache_key();
        if let Some(hit) = self.cache.get(&key) {
            debug!("Cache hit for {}", tool);
            return hit;
        }

        let permit = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                return ToolResult::failure(tool, ToolError::cancelled(), 0);
            }
            permit = self.workers.clone().acquire_owned() => match permit {
                Ok(permit) => permit,
                Err(_) => {
                    return ToolResult::failure(
                        tool,
                        ToolError::failure("worker pool closed"),
                        0,
                    );
                }
            },
        };

        let started = Instant::now();
        let call = invocation.clone();
        let mut task = tokio::spawn(async move {
            let _permit = permit;
            provider.invoke(&call).await
        });

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                task.abort();
                ToolResult::failure(tool, ToolError::cancelled(), elapsed_ms(started))
            }
            outcome = tokio::time::timeout(per_call_timeout, &mut task) => match outcome {
                Ok(Ok(Ok(records))) => ToolResult::success(tool, records, elapsed_ms(started)),
                Ok(Ok(Err(e))) => {
                    ToolResult::failure(tool, ToolError::failure(e.to_string()), elapsed_ms(started))
                }
                Ok(Err(join_error)) => {
                    warn!("Provider task for {} did not complete: {}", tool, join_error);
                    ToolResult::failure(
                        tool,
                        ToolError::failure(format!("provider task failed: {}", join_error)),
                        elapsed_ms(started),
                    )
                }
                Err(_) => {
                    task.abort();
                    let timeout_ms = per_call_timeout.as_millis() as u64;
                    ToolResult::failure(tool, ToolError::timeout(timeout_ms), elapsed_ms(started))
                }
            },
        };

        if result.is_success() {
            self.cache.put(key, &result);
        }
        result
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}

#[async_trait]
impl ToolExecutorPort for ParallelToolExecutor {
    fn definitions(&self) -> Vec<ToolDefinition> {
        self.registry.tool_spec()
    }

    fn has_tool(&self, name: &str) -> bool {
        self.registry.has_tool(name)
    }

    async fn run_batch(
        &self,
        invocations: &[ToolInvocation],
        per_call_timeout: Duration,
        cancel: &CancellationToken,
    ) -> Vec<ToolResult> {
        let results = join_all(
            invocations
                .iter()
                .map(|invocation| self.run_one(invocation, per_call_timeout, cancel)),
        )
        .await;

        for result in &results {
            debug!(
                tool = %result.tool_name,
                status = %result.status,
                latency_ms = result.latency_ms,
                cached = result.cached,
                "Tool call finished"
            );
        }
        results
    }
}
