//! Application-level configuration.
//!
//! - [`OrchestrationParams`]: turn control (diversity forcing, timeouts,
//!   budget, prompt sizing)

pub mod orchestration_params;

pub use orchestration_params::OrchestrationParams;
