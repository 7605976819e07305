//! Tool domain module
//!
//! Every tool is described by a [`ToolDefinition`], invoked through a
//! [`ToolInvocation`] and answers with exactly one [`ToolResult`].
//!
//! ```text
//! ┌──────────────┐    ┌────────────────┐    ┌──────────────┐
//! │ catalog      │───▶│ ToolInvocation │───▶│ ToolResult   │
//! │ (11 tools)   │    │ (validated)    │    │ (status)     │
//! └──────────────┘    └────────────────┘    └──────────────┘
//! ```
//!
//! # Key Types
//!
//! - [`catalog`]: the closed set of tool names, schemas and priorities
//! - [`ToolInvocation`]: one call with canonical (sorted) arguments
//! - [`ToolResult`]: `success` / `timeout` / `error` with entity payload
//! - [`ToolValidator`]: pure argument validation, run before dispatch
//! - [`ToolProvider`]: the capability implemented by adapters
//!
//! # Architecture
//!
//! - **Domain** (this module): definitions, validation, no I/O
//! - **Application** (`ToolExecutorPort`): batch execution port
//! - **Infrastructure** (`ToolRegistry`, `ParallelToolExecutor`): routing,
//!   timeouts, caching and concrete providers

pub mod catalog;
pub mod entities;
pub mod provider;
pub mod traits;
pub mod value_objects;

pub use entities::{InvocationOrigin, ParamType, ToolDefinition, ToolInvocation, ToolParameter};
pub use provider::{ProviderError, ToolProvider};
pub use traits::{DefaultToolValidator, ToolValidator};
pub use value_objects::{ToolError, ToolResult, ToolStatus};
