//! Presentation layer for date-planner
//!
//! This crate contains the CLI definition, answer rendering,
//! the turn progress spinner and the interactive chat loop.

pub mod chat;
pub mod cli;
pub mod output;
pub mod progress;

// Re-export commonly used types
pub use chat::ChatRepl;
pub use cli::commands::{Cli, OutputFormat};
pub use output::console::ConsoleFormatter;
pub use output::stream::{RenderOptions, TurnRenderer};
pub use progress::reporter::TurnProgress;
