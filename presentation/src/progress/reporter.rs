//! Progress reporting while a turn runs

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use planner_domain::TurnStatus;
use std::time::Duration;

/// Spinner shown on stderr until the first answer text arrives
pub struct TurnProgress {
    bar: Option<ProgressBar>,
    last: Option<TurnStatus>,
}

impl TurnProgress {
    /// A spinner, or a silent reporter when `enabled` is false
    pub fn new(enabled: bool) -> Self {
        let bar = enabled.then(|| {
            let bar = ProgressBar::new_spinner();
            if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
                bar.set_style(style);
            }
            bar.enable_steady_tick(Duration::from_millis(100));
            bar
        });
        Self { bar, last: None }
    }

    pub fn hidden() -> Self {
        Self::new(false)
    }

    pub fn status_message(status: TurnStatus) -> &'static str {
        match status {
            TurnStatus::Planning => "Understanding the request...",
            TurnStatus::ExecutingTools => "Searching venues, events and ideas...",
            TurnStatus::Reflecting => "Comparing what came back...",
            TurnStatus::Synthesizing => "Writing suggestions...",
            TurnStatus::Streaming => "Writing suggestions...",
            TurnStatus::Done => "Done",
            TurnStatus::Cancelled => "Cancelled",
            TurnStatus::Failed => "Failed",
        }
    }

    /// Update the message when the status changed since the last call
    pub fn on_status(&mut self, status: TurnStatus) {
        if self.last == Some(status) {
            return;
        }
        self.last = Some(status);
        if let Some(bar) = &self.bar {
            bar.set_message(Self::status_message(status).to_string());
        }
    }

    /// Remove the spinner before text is written to stdout
    pub fn clear(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }

    /// Leave a final line on stderr for turns that ended without an answer
    pub fn abandon(&mut self, status: TurnStatus) {
        if let Some(bar) = self.bar.take() {
            let message = match status {
                TurnStatus::Cancelled => "Cancelled".yellow().to_string(),
                _ => Self::status_message(status).red().to_string(),
            };
            bar.abandon_with_message(message);
        }
    }

    pub fn is_visible(&self) -> bool {
        self.bar.is_some()
    }
}

impl Drop for TurnProgress {
    fn drop(&mut self) {
        self.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hidden_reporter_tracks_status() {
        let mut progress = TurnProgress::hidden();
        progress.on_status(TurnStatus::Planning);
        progress.on_status(TurnStatus::ExecutingTools);
        assert_eq!(progress.last, Some(TurnStatus::ExecutingTools));
        assert!(!progress.is_visible());
    }

    #[test]
    fn test_clear_hides_spinner() {
        let mut progress = TurnProgress::new(true);
        progress.on_status(TurnStatus::Planning);
        assert!(progress.is_visible());
        progress.clear();
        assert!(!progress.is_visible());
    }

    #[test]
    fn test_status_messages() {
        assert_eq!(
            TurnProgress::status_message(TurnStatus::ExecutingTools),
            "Searching venues, events and ideas..."
        );
        assert_eq!(TurnProgress::status_message(TurnStatus::Done), "Done");
    }
}
