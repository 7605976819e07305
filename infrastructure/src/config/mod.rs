//! Configuration file loading for date-planner
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `PLANNER_*` environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./planner.toml` or `./.planner.toml`
//! 4. Global: `$XDG_CONFIG_HOME/date-planner/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileConfig, FileLlmConfig, FileLoggingConfig, FileOrchestrationConfig,
    FileToolsConfig,
};
pub use loader::ConfigLoader;
