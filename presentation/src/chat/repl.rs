//! REPL (Read-Eval-Print Loop) for interactive planning

use crate::output::console::ConsoleFormatter;
use crate::output::stream::{RenderOptions, TurnRenderer};
use planner_application::{SessionController, SessionError};
use planner_domain::{Constraints, TurnRequest, UserLocation};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

/// What the REPL should do with one input line
#[derive(Debug, PartialEq)]
enum Input<'a> {
    Empty,
    Quit,
    Help,
    NewSession,
    Unknown(&'a str),
    Utterance(&'a str),
}

fn classify(line: &str) -> Input<'_> {
    let line = line.trim();
    if line.is_empty() {
        return Input::Empty;
    }
    if !line.starts_with('/') {
        return Input::Utterance(line);
    }
    match line {
        "/quit" | "/exit" | "/q" => Input::Quit,
        "/help" | "/h" | "/?" => Input::Help,
        "/new" => Input::NewSession,
        other => Input::Unknown(other),
    }
}

/// Interactive planning session over one [`SessionController`]
pub struct ChatRepl<'a> {
    controller: &'a SessionController,
    options: RenderOptions,
    base_session: String,
    session_id: String,
    restarts: u32,
    constraints: Constraints,
    location: Option<UserLocation>,
}

impl<'a> ChatRepl<'a> {
    pub fn new(controller: &'a SessionController, session_id: impl Into<String>) -> Self {
        let session_id = session_id.into();
        Self {
            controller,
            options: RenderOptions::default(),
            base_session: session_id.clone(),
            session_id,
            restarts: 0,
            constraints: Constraints::default(),
            location: None,
        }
    }

    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    /// Filters applied to every turn of the session
    pub fn with_constraints(mut self, constraints: Constraints) -> Self {
        self.constraints = constraints;
        self
    }

    pub fn with_location(mut self, location: Option<UserLocation>) -> Self {
        self.location = location;
        self
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    fn request(&self, utterance: &str) -> TurnRequest {
        let mut request = TurnRequest::new(self.session_id.clone(), utterance)
            .with_constraints(self.constraints.clone());
        request.user_location = self.location;
        request
    }

    fn start_new_session(&mut self) {
        self.restarts += 1;
        self.session_id = format!("{}-{}", self.base_session, self.restarts);
    }

    /// Run until `/quit`, end of input or Ctrl-C at the prompt
    pub async fn run(&mut self) -> std::io::Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        self.print_welcome();

        loop {
            print!(">>> ");
            std::io::stdout().flush()?;

            let line = tokio::select! {
                line = lines.next_line() => line?,
                _ = tokio::signal::ctrl_c() => {
                    println!("^C");
                    None
                }
            };
            let Some(line) = line else {
                println!("Bye!");
                break;
            };

            match classify(&line) {
                Input::Empty => continue,
                Input::Quit => {
                    println!("Bye!");
                    break;
                }
                Input::Help => Self::print_help(),
                Input::NewSession => {
                    self.start_new_session();
                    println!("Started a new conversation ({})", self.session_id);
                }
                Input::Unknown(cmd) => {
                    println!("Unknown command: {}", cmd);
                    println!("Type /help for available commands");
                }
                Input::Utterance(utterance) => self.process(utterance).await,
            }
        }

        Ok(())
    }

    async fn process(&self, utterance: &str) {
        println!();
        let renderer = TurnRenderer::new(self.controller, self.options);
        match renderer.run(self.request(utterance)).await {
            Ok(_) => {}
            Err(SessionError::Busy(_)) => {
                eprintln!(
                    "{}",
                    ConsoleFormatter::format_failure("the previous request is still running")
                );
            }
            Err(e) => eprintln!("{}", ConsoleFormatter::format_failure(&e.to_string())),
        }
        println!();
    }

    fn print_welcome(&self) {
        println!();
        println!("╭─────────────────────────────────────────────╮");
        println!("│           date-planner - Chat Mode          │");
        println!("╰─────────────────────────────────────────────╯");
        println!();
        if !self.constraints.is_empty() {
            println!("Filters: {}", self.constraints.describe());
            println!();
        }
        println!("Describe the date you have in mind; follow-ups refine it.");
        Self::print_help();
    }

    fn print_help() {
        println!();
        println!("Commands:");
        println!("  /help, /h, /?    - Show this help");
        println!("  /new             - Start a new conversation");
        println!("  /quit, /exit, /q - Exit chat");
        println!("  Ctrl-C           - Cancel the running request");
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(classify("   "), Input::Empty);
        assert_eq!(classify("/q"), Input::Quit);
        assert_eq!(classify("/help"), Input::Help);
        assert_eq!(classify("/new"), Input::NewSession);
        assert_eq!(classify("/nope"), Input::Unknown("/nope"));
        assert_eq!(
            classify("  something cheaper?  "),
            Input::Utterance("something cheaper?")
        );
    }
}
