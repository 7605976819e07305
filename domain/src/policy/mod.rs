//! Policies that decide which tools run in a turn

pub mod selection;

pub use selection::{SelectionContext, SelectionPolicy, forced_arguments};
