//! Interactive chat module
//!
//! Provides a line-based interactive session; every line is one turn.

mod repl;

pub use repl::ChatRepl;
