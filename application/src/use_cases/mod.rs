//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod analyze_intent;
pub mod run_turn;
pub mod session_controller;
pub(crate) mod shared;
