//! Prompt helpers with inquire → stdin fallback.
//!
//! Every prompt degrades gracefully: if `inquire` fails (e.g. not a real TTY),
//! we fall back to plain stdin.

use copert_core::PromptAnswer;
use inquire::{Confirm, InquireError, Text};
use std::io::{self, BufRead, Write};

/// One line of REPL input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Line(String),
    /// Ctrl+C or Esc at the prompt
    Interrupted,
    /// stdin closed
    Eof,
}

/// Read a raw line from stdin, `None` on EOF.
fn read_stdin_line() -> io::Result<Option<String>> {
    let mut input = String::new();
    let read = io::stdin().lock().read_line(&mut input)?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(input.trim_end_matches(['\n', '\r']).to_string()))
}

/// Map a typed answer onto yes/no; anything else is a refusal.
pub fn parse_yes_no(input: &str) -> PromptAnswer {
    match input.trim().to_lowercase().as_str() {
        "y" | "yes" => PromptAnswer::Yes,
        _ => PromptAnswer::No,
    }
}

/// Yes/no question defaulting to no.
pub fn confirm(message: &str) -> PromptAnswer {
    match Confirm::new(message).with_default(false).prompt() {
        Ok(true) => PromptAnswer::Yes,
        Ok(false) => PromptAnswer::No,
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => {
            PromptAnswer::Interrupted
        }
        Err(_) => {
            print!("? {message} (y/N) ");
            if io::stdout().flush().is_err() {
                return PromptAnswer::No;
            }
            match read_stdin_line() {
                Ok(Some(line)) => parse_yes_no(&line),
                _ => PromptAnswer::No,
            }
        }
    }
}

/// The REPL's input line.
pub fn read_input(prompt: &str) -> Input {
    match Text::new(prompt).prompt() {
        Ok(line) => Input::Line(line),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => {
            Input::Interrupted
        }
        Err(_) => {
            print!("{prompt} ");
            if io::stdout().flush().is_err() {
                return Input::Eof;
            }
            match read_stdin_line() {
                Ok(Some(line)) => Input::Line(line),
                Ok(None) | Err(_) => Input::Eof,
            }
        }
    }
}
