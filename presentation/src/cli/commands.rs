//! CLI command definitions

use clap::{Parser, ValueEnum};
use planner_domain::{Constraints, DomainError, TurnRequest};
use std::path::PathBuf;

/// How the answer is written to stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Streamed text followed by the formatted options
    Text,
    /// One JSON object per turn event
    Json,
}

/// CLI arguments for date-planner
#[derive(Parser, Debug)]
#[command(name = "date-planner")]
#[command(author, version, about = "Plan a date from a single sentence")]
#[command(long_about = r#"
date-planner turns a request like "cozy dinner in Ottawa under $75" into a
short list of concrete date options.

Each turn:
1. Classifies the request and picks a diverse set of search tools
2. Runs the tools in parallel, keeping whatever succeeds
3. Streams an answer that only recommends venues the tools actually found

Without an UTTERANCE an interactive session starts; follow-up messages keep
the conversation history.

Configuration files are loaded from (in priority order):
1. --config <path>     Explicit config file
2. ./planner.toml      Project-level config
3. ~/.config/date-planner/config.toml   Global config

Example:
  date-planner "romantic seafood dinner in Ottawa"
  date-planner --budget 1 --outdoor --category active "something fun this weekend"
  date-planner --lat 45.42 --lon -75.69 "coffee nearby"
"#)]
pub struct Cli {
    /// What kind of date you are looking for (omit for interactive mode)
    pub utterance: Option<String>,

    /// Session identifier; turns in one session share history
    #[arg(short, long, value_name = "ID", default_value = "cli")]
    pub session: String,

    /// City to search in
    #[arg(long)]
    pub city: Option<String>,

    /// Budget tier: 1 = budget, 2 = moderate, 3 = expensive
    #[arg(short, long, value_name = "1-3", value_parser = clap::value_parser!(u8).range(1..=3))]
    pub budget: Option<u8>,

    /// Only indoor activities
    #[arg(long, conflicts_with = "outdoor")]
    pub indoor: bool,

    /// Only outdoor activities
    #[arg(long)]
    pub outdoor: bool,

    /// Preferred category (can be specified multiple times)
    #[arg(short, long, value_name = "CATEGORY")]
    pub category: Vec<String>,

    /// Minimum duration in minutes
    #[arg(long, value_name = "MINUTES")]
    pub min_duration: Option<u32>,

    /// Maximum duration in minutes
    #[arg(long, value_name = "MINUTES")]
    pub max_duration: Option<u32>,

    /// Current latitude (requires --lon)
    #[arg(long, requires = "lon", allow_hyphen_values = true)]
    pub lat: Option<f64>,

    /// Current longitude (requires --lat)
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    pub lon: Option<f64>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Shorthand for `--output json`
    #[arg(long)]
    pub json: bool,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}

impl Cli {
    pub fn output_format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            self.output
        }
    }

    /// Filters given on the command line
    pub fn constraints(&self) -> Constraints {
        let mut constraints = Constraints::new();
        constraints.city = self.city.clone();
        constraints.budget_tier = self.budget;
        constraints.categories = self.category.clone();
        if self.indoor {
            constraints.indoor = Some(true);
        } else if self.outdoor {
            constraints.indoor = Some(false);
        }
        if self.min_duration.is_some() || self.max_duration.is_some() {
            constraints = constraints.with_duration(self.min_duration, self.max_duration);
        }
        constraints
    }

    /// Turn request for `utterance` carrying the command-line filters
    pub fn request(&self, utterance: &str) -> Result<TurnRequest, DomainError> {
        let constraints = self.constraints();
        constraints.validate()?;
        let mut request = TurnRequest::new(self.session.clone(), utterance).with_constraints(constraints);
        if let (Some(lat), Some(lon)) = (self.lat, self.lon) {
            request = request.with_location(lat, lon);
        }
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("date-planner").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_filters_become_constraints() {
        let cli = parse(&[
            "--budget",
            "2",
            "--outdoor",
            "--category",
            "active",
            "--category",
            "nature",
            "--max-duration",
            "120",
            "--city",
            "Ottawa",
            "a hike",
        ]);
        let constraints = cli.constraints();
        assert_eq!(constraints.budget_tier, Some(2));
        assert_eq!(constraints.indoor, Some(false));
        assert_eq!(constraints.categories, vec!["active", "nature"]);
        assert_eq!(constraints.duration_bounds.unwrap().max_minutes, Some(120));
        assert_eq!(constraints.city.as_deref(), Some("Ottawa"));
        assert_eq!(cli.utterance.as_deref(), Some("a hike"));
    }

    #[test]
    fn test_budget_out_of_range_is_rejected() {
        let result = Cli::try_parse_from(["date-planner", "--budget", "4", "dinner"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_indoor_conflicts_with_outdoor() {
        let result = Cli::try_parse_from(["date-planner", "--indoor", "--outdoor", "dinner"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_location_requires_both_coordinates() {
        assert!(Cli::try_parse_from(["date-planner", "--lat", "45.4", "coffee"]).is_err());

        let cli = parse(&["--lat", "45.42", "--lon", "-75.69", "coffee"]);
        let request = cli.request("coffee").unwrap();
        let location = request.user_location.unwrap();
        assert_eq!(location.lon, -75.69);
    }

    #[test]
    fn test_inverted_duration_is_invalid() {
        let cli = parse(&["--min-duration", "180", "--max-duration", "60", "dinner"]);
        assert!(cli.request("dinner").is_err());
    }

    #[test]
    fn test_json_flag() {
        assert_eq!(parse(&["x"]).output_format(), OutputFormat::Text);
        assert_eq!(parse(&["--json", "x"]).output_format(), OutputFormat::Json);
    }
}
