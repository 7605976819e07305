//! Logging configuration from TOML (`[logging]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// JSONL file receiving turn records (disabled when unset)
    pub conversation_log: Option<PathBuf>,
    /// Daily-rolling diagnostic log, written in addition to stderr
    pub file: Option<PathBuf>,
}
