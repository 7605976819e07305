//! Configuration validation results.
//!
//! Configuration loaders report problems as a list of [`ConfigIssue`]s
//! rather than failing on the first one, so the CLI can print every
//! warning and refuse to start only when an [`Severity::Error`] is present.

/// Severity level of a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Fatal: the configuration cannot work at all.
    Error,
    /// Non-fatal: the configuration works but may not behave as expected.
    Warning,
}

/// Identifies a specific configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigIssueCode {
    /// A timeout or budget of zero seconds.
    ZeroTimeout,
    /// Worker pool with no workers.
    ZeroWorkers,
    /// `[tools]` references a name outside the catalog.
    UnknownToolName,
    /// `min_diversity = 0` disables diversity forcing.
    DiversityDisabled,
    /// The turn budget is shorter than a single tool timeout.
    BudgetShorterThanToolTimeout,
    /// The configured default city is blank.
    BlankDefaultCity,
}

/// A detected issue in the configuration.
#[derive(Debug, Clone)]
pub struct ConfigIssue {
    pub severity: Severity,
    pub code: ConfigIssueCode,
    pub message: String,
}

impl ConfigIssue {
    pub fn error(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
        }
    }

    pub fn warning(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors_set_severity() {
        let err = ConfigIssue::error(ConfigIssueCode::ZeroWorkers, "no workers");
        assert!(err.is_error());
        let warn = ConfigIssue::warning(ConfigIssueCode::DiversityDisabled, "off");
        assert!(!warn.is_error());
        assert_eq!(warn.code, ConfigIssueCode::DiversityDisabled);
    }
}
