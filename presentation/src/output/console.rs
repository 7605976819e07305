//! Console rendering of turn answers

use colored::Colorize;
use planner_domain::{ConversationTurn, RecommendedOption, StructuredAnswer, TurnEvent};

/// Formats answers and turn summaries for the terminal
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// The option list of a structured answer.
    ///
    /// The summary is not repeated; it was already streamed as text.
    pub fn format_options(answer: &StructuredAnswer) -> String {
        if answer.options.is_empty() {
            return String::new();
        }

        let mut output = Self::section_header("Date options");
        for (index, option) in answer.options.iter().enumerate() {
            output.push_str(&Self::format_option(index + 1, option));
        }
        output
    }

    fn format_option(number: usize, option: &RecommendedOption) -> String {
        let mut output = format!(
            "\n{} {}\n",
            format!("{}.", number).yellow().bold(),
            option.title.bold()
        );

        let mut facts = Vec::new();
        if !option.categories.is_empty() {
            facts.push(option.categories.join(", "));
        }
        if !option.price_display.is_empty() {
            facts.push(option.price_display.clone());
        }
        if let Some(minutes) = option.duration_minutes {
            facts.push(Self::format_duration(minutes));
        }
        if !facts.is_empty() {
            output.push_str(&format!("   {}\n", facts.join(" · ").dimmed()));
        }

        if !option.justification.is_empty() {
            output.push_str(&Self::indent(&option.justification, "   "));
            output.push('\n');
        }
        if !option.logistics.is_empty() {
            output.push_str(&format!("   {} {}\n", "Getting there:".cyan(), option.logistics));
        }
        if let Some(url) = &option.url {
            output.push_str(&format!("   {}\n", url.underline()));
        }
        if !option.source_tool.is_empty() {
            output.push_str(&format!("   {}\n", format!("via {}", option.source_tool).dimmed()));
        }
        output
    }

    /// "90 min", "2 h" or "2 h 30 min"
    pub fn format_duration(minutes: u32) -> String {
        match (minutes / 60, minutes % 60) {
            (0, m) => format!("{} min", m),
            (h, 0) => format!("{} h", h),
            (h, m) => format!("{} h {} min", h, m),
        }
    }

    /// One-line footer with what the turn did, for verbose runs
    pub fn format_turn_summary(turn: &ConversationTurn) -> String {
        let cached = turn.results.iter().filter(|r| r.cached).count();
        let mut line = format!(
            "{} tool call(s), {} succeeded",
            turn.results.len(),
            turn.successful_results()
        );
        if cached > 0 {
            line.push_str(&format!(" ({} cached)", cached));
        }
        line.push_str(&format!(", {} candidate(s)", turn.candidates.len()));
        if let Some(ms) = turn.duration_ms() {
            line.push_str(&format!(" in {:.1}s", ms as f64 / 1000.0));
        }
        format!("\n{}\n", line.dimmed())
    }

    /// One JSON object for a turn event
    pub fn format_event_json(event: &TurnEvent) -> String {
        serde_json::to_string(event).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn format_failure(message: &str) -> String {
        format!("{} {}", "Error:".red().bold(), message)
    }

    fn section_header(title: &str) -> String {
        format!("\n\n{}\n{}", title.cyan().bold(), "-".repeat(40))
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
