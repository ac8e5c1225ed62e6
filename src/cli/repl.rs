//! Interactive REPL

use super::prompts::{self, Input};
use super::render;
use super::session::Session;
use copert_core::{
    format_error_for_cli, ConversationState, SubAgentReport, TurnEvent, TurnOutcome,
};
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

const INPUT_PROMPT: &str = "You:";

/// A slash command typed at the prompt
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Help,
    Clear,
    History,
    ListAgents,
    Stats,
    Init,
    /// `None` when the argument is missing or not on/off
    AutoApprove(Option<bool>),
    Exit,
    Unknown(String),
}

impl Command {
    fn parse(line: &str) -> Self {
        let mut parts = line.split_whitespace();
        let name = parts.next().unwrap_or_default();
        match name {
            "/help" => Self::Help,
            "/clear" => Self::Clear,
            "/history" => Self::History,
            "/list-agents" => Self::ListAgents,
            "/stats" => Self::Stats,
            "/init" => Self::Init,
            "/auto-approve" => Self::AutoApprove(match parts.next() {
                Some("on") => Some(true),
                Some("off") => Some(false),
                _ => None,
            }),
            "/exit" | "/quit" => Self::Exit,
            other => Self::Unknown(other.to_string()),
        }
    }
}

enum Flow {
    Continue,
    Exit,
}

/// Run the REPL until `/exit` or end of input
pub async fn run(session: Session) -> anyhow::Result<()> {
    println!(
        "{}",
        render::welcome(&session.agent.config().model, session.has_context)
    );

    let mut conversation = ConversationState::new();
    let mut events = session.events.subscribe();

    loop {
        let input = tokio::task::spawn_blocking(|| prompts::read_input(INPUT_PROMPT))
            .await
            .unwrap_or(Input::Eof);
        let line = match input {
            Input::Line(line) => line,
            // Ctrl+C at the prompt does nothing; /exit leaves
            Input::Interrupted => continue,
            Input::Eof => break,
        };

        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if line.starts_with('/') {
            match handle_command(&session, &mut conversation, line).await {
                Flow::Continue => continue,
                Flow::Exit => break,
            }
        }

        interactive_turn(&session, &mut conversation, line, &mut events).await;
    }

    println!("\nGoodbye! 👋\n");
    Ok(())
}

async fn handle_command(
    session: &Session,
    conversation: &mut ConversationState,
    line: &str,
) -> Flow {
    match Command::parse(line) {
        Command::Help => println!("\n{}\n", render::HELP),
        Command::Clear => {
            *conversation = ConversationState::new();
            println!("\n🧹 Conversation cleared.\n");
        }
        Command::History => println!("\n{}", render::history(conversation)),
        Command::ListAgents => println!("\n{}", render::agents()),
        Command::Stats => {
            let mode = if session.approval.is_auto_approve() {
                "on"
            } else {
                "off"
            };
            println!(
                "\n📊 {}\nAuto-approve: {mode}\n",
                session.approval.stats()
            );
        }
        Command::Init => {
            println!("\n🔍 Analyzing project and generating COPERT.md...\n");
            match session.factory.init_project().await {
                SubAgentReport::Completed(text) => println!("{text}\n"),
                SubAgentReport::Failed(text) => println!("❌ {text}\n"),
            }
        }
        Command::AutoApprove(Some(enabled)) => {
            session.approval.set_auto_approve(enabled);
            if enabled {
                println!("\n⚠️  Auto-approve ON: destructive tools run without asking.\n");
            } else {
                println!("\n🔒 Auto-approve OFF: destructive tools ask first.\n");
            }
        }
        Command::AutoApprove(None) => println!("\nUsage: /auto-approve on|off\n"),
        Command::Exit => return Flow::Exit,
        Command::Unknown(name) => {
            println!("\nUnknown command: {name}. Type /help for commands.\n");
        }
    }
    Flow::Continue
}

/// Run one turn; Ctrl+C cancels it
async fn interactive_turn(
    session: &Session,
    conversation: &mut ConversationState,
    message: &str,
    events: &mut broadcast::Receiver<TurnEvent>,
) {
    let cancel = CancellationToken::new();
    let watcher = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                debug!("Ctrl+C received, cancelling turn");
                cancel.cancel();
            }
        })
    };

    let result = drive_turn(session, conversation, message, &cancel, events).await;
    watcher.abort();

    match result {
        Ok(outcome) => println!("{}", render::reply(&outcome)),
        Err(e) => println!("\n❌ {}\n", format_error_for_cli(&e)),
    }
}

/// Run one turn while echoing its events in order
pub async fn drive_turn(
    session: &Session,
    conversation: &mut ConversationState,
    message: &str,
    cancel: &CancellationToken,
    events: &mut broadcast::Receiver<TurnEvent>,
) -> copert_core::Result<TurnOutcome> {
    let turn = session.agent.run_turn(conversation, message, cancel);
    tokio::pin!(turn);

    let mut open = true;
    let result = loop {
        tokio::select! {
            result = &mut turn => break result,
            event = events.recv(), if open => match event {
                Ok(event) => print_event(&event),
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "Dropped tool events"),
                Err(RecvError::Closed) => open = false,
            },
        }
    };

    loop {
        match events.try_recv() {
            Ok(event) => print_event(&event),
            Err(TryRecvError::Lagged(skipped)) => warn!(skipped, "Dropped tool events"),
            Err(TryRecvError::Empty | TryRecvError::Closed) => break,
        }
    }
    result
}

fn print_event(event: &TurnEvent) {
    if let Some(text) = render::event(event) {
        println!("{text}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("/help"), Command::Help);
        assert_eq!(Command::parse("/clear"), Command::Clear);
        assert_eq!(Command::parse("/history"), Command::History);
        assert_eq!(Command::parse("/list-agents"), Command::ListAgents);
        assert_eq!(Command::parse("/stats"), Command::Stats);
        assert_eq!(Command::parse("/init"), Command::Init);
        assert_eq!(Command::parse("/exit"), Command::Exit);
        assert_eq!(Command::parse("/quit"), Command::Exit);
    }

    #[test]
    fn test_parse_auto_approve() {
        assert_eq!(
            Command::parse("/auto-approve on"),
            Command::AutoApprove(Some(true))
        );
        assert_eq!(
            Command::parse("/auto-approve   off"),
            Command::AutoApprove(Some(false))
        );
        assert_eq!(Command::parse("/auto-approve"), Command::AutoApprove(None));
        assert_eq!(
            Command::parse("/auto-approve maybe"),
            Command::AutoApprove(None)
        );
    }

    #[test]
    fn test_parse_unknown() {
        assert_eq!(
            Command::parse("/deploy now"),
            Command::Unknown("/deploy".to_string())
        );
    }
}
