//! CLI module for Copert
//!
//! Provides commands:
//! - (none): interactive REPL
//! - `chat`: one-shot turn
//! - `init`: generate COPERT.md for the current project
//! - `config`: print effective settings

use crate::settings::Settings;
use anyhow::Context;
use clap::{Parser, Subcommand};
use copert_core::ConversationState;
use tokio_util::sync::CancellationToken;

mod approval;
mod prompts;
mod render;
mod repl;
mod session;

/// Copert AI coding assistant
#[derive(Parser, Debug)]
#[command(name = "copert")]
#[command(about = "Interactive AI coding assistant")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Model to use (overrides llm.model)
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Approve destructive tool calls without asking
    #[arg(long, global = true)]
    pub auto_approve: bool,

    /// Model round-trips allowed per turn
    #[arg(long, global = true)]
    pub max_iterations: Option<usize>,

    /// Debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a single turn and print the reply
    Chat {
        /// Message to send
        #[arg(required = true, trailing_var_arg = true)]
        message: Vec<String>,
    },
    /// Generate COPERT.md for the current project
    Init,
    /// Print the effective settings
    Config,
}

impl Cli {
    /// Let command-line flags win over files and environment
    pub fn apply_overrides(&self, settings: &mut Settings) {
        if let Some(model) = &self.model {
            settings.llm.model.clone_from(model);
        }
        if let Some(max) = self.max_iterations {
            settings.agent.max_iterations = max;
        }
        if self.auto_approve {
            settings.agent.auto_approve = true;
        }
        if self.verbose {
            settings.agent.verbose = true;
        }
    }
}

/// Run the CLI command
pub async fn run(cli: Cli, settings: Settings) -> anyhow::Result<()> {
    match cli.command {
        Some(Commands::Chat { message }) => chat(&settings, &message.join(" ")).await,
        Some(Commands::Init) => init(&settings).await,
        Some(Commands::Config) => {
            let rendered =
                serde_json::to_string_pretty(&settings).context("Failed to render settings")?;
            println!("{rendered}");
            Ok(())
        }
        None => {
            let session = session::Session::build(&settings).await?;
            repl::run(session).await
        }
    }
}

async fn chat(settings: &Settings, message: &str) -> anyhow::Result<()> {
    let session = session::Session::build(settings).await?;
    let mut conversation = ConversationState::new();
    let mut events = session.events.subscribe();

    let cancel = CancellationToken::new();
    let outcome = repl::drive_turn(&session, &mut conversation, message, &cancel, &mut events).await;
    match outcome {
        Ok(outcome) => {
            println!("{}", render::reply(&outcome));
            Ok(())
        }
        Err(e) => anyhow::bail!(copert_core::format_error_for_cli(&e)),
    }
}

async fn init(settings: &Settings) -> anyhow::Result<()> {
    let session = session::Session::build(settings).await?;
    println!("\n🔍 Analyzing project and generating COPERT.md...\n");
    let report = session.factory.init_project().await;
    if !report.is_success() {
        anyhow::bail!(report);
    }
    println!("{report}");
    Ok(())
}
