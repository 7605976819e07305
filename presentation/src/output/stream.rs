//! Live rendering of a running turn
//!
//! [`TurnRenderer`] starts a turn on the [`SessionController`], writes its
//! events to stdout as they arrive and cancels it on Ctrl-C.

use crate::cli::commands::OutputFormat;
use crate::output::console::ConsoleFormatter;
use crate::progress::reporter::TurnProgress;
use planner_application::{SessionController, SessionError};
use planner_domain::{ConversationTurn, TurnEvent, TurnRequest};
use std::io::Write;
use std::time::Duration;
use tracing::{debug, info};

/// How often the spinner picks up status changes
const STATUS_POLL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    pub format: OutputFormat,
    /// Spinner on stderr (text output only)
    pub show_progress: bool,
    /// Tool and timing footer after the answer (text output only)
    pub show_summary: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            show_progress: true,
            show_summary: false,
        }
    }
}

/// Runs turns and renders them to the terminal
pub struct TurnRenderer<'a> {
    controller: &'a SessionController,
    options: RenderOptions,
}

impl<'a> TurnRenderer<'a> {
    pub fn new(controller: &'a SessionController, options: RenderOptions) -> Self {
        Self {
            controller,
            options,
        }
    }

    /// Run one turn to its end.
    ///
    /// The first Ctrl-C cancels the turn; the session stays usable.
    pub async fn run(&self, request: TurnRequest) -> Result<ConversationTurn, SessionError> {
        let mut handle = self.controller.begin_turn(request)?;
        let text = self.options.format == OutputFormat::Text;
        let mut progress = TurnProgress::new(text && self.options.show_progress);
        let mut ticker = tokio::time::interval(STATUS_POLL);

        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);
        let mut interrupted = false;

        loop {
            tokio::select! {
                event = handle.next_event() => {
                    let Some(event) = event else {
                        break;
                    };
                    self.render(event, &mut progress);
                }
                _ = ticker.tick() => progress.on_status(handle.status()),
                result = &mut ctrl_c, if !interrupted => {
                    interrupted = true;
                    if let Err(e) = result {
                        debug!("Ctrl-C handler unavailable: {}", e);
                        continue;
                    }
                    if self.controller.cancel(handle.session_id()) {
                        info!("Turn {} cancelled by user", handle.turn_id());
                    }
                }
            }
        }

        self.controller.end_turn(&handle);
        let turn = handle.outcome().await?;
        if text && self.options.show_summary {
            eprint!("{}", ConsoleFormatter::format_turn_summary(&turn));
        }
        Ok(turn)
    }

    fn render(&self, event: TurnEvent, progress: &mut TurnProgress) {
        if self.options.format == OutputFormat::Json {
            println!("{}", ConsoleFormatter::format_event_json(&event));
            return;
        }

        match event {
            TurnEvent::TextDelta(chunk) => {
                progress.clear();
                let mut stdout = std::io::stdout().lock();
                let _ = write!(stdout, "{}", chunk);
                let _ = stdout.flush();
            }
            TurnEvent::StructuredAnswer(answer) => {
                progress.clear();
                print!("{}", ConsoleFormatter::format_options(&answer));
            }
            TurnEvent::Done => println!(),
            TurnEvent::Cancelled => {
                progress.abandon(planner_domain::TurnStatus::Cancelled);
                println!();
            }
            TurnEvent::Failed { message } => {
                progress.abandon(planner_domain::TurnStatus::Failed);
                eprintln!("{}", ConsoleFormatter::format_failure(&message));
            }
        }
    }
}
