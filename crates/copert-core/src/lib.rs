//! Copert Core - Agent Orchestration
//!
//! This crate provides the agent loop of the Copert coding assistant:
//! - Conversation: the append-only message history of a session
//! - Orchestrator: the per-turn model/tool state machine with an iteration ceiling
//! - Dispatcher: sequential tool call execution with one result per call
//! - Approval: user confirmation for destructive tool calls
//! - Delegate: sub-agents with restricted tool subsets (`task`, `init`)
//! - Events: broadcast of turn and tool activity for the CLI
//! - Prompts: system prompts of the main agent and sub-agents

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod approval;
pub mod conversation;
pub mod delegate;
pub mod dispatcher;
pub mod error;
pub mod events;
pub mod orchestrator;
pub mod prompts;

pub use approval::{
    ApprovalDecision, ApprovalGate, ApprovalPreview, ApprovalPrompt, ApprovalStats, PromptAnswer,
    SharedApprovalGate,
};
pub use conversation::ConversationState;
pub use delegate::{AgentFactory, InitTool, SubAgentClass, SubAgentReport, TaskTool};
pub use dispatcher::{Dispatcher, ToolCallRecord};
pub use error::{format_error_for_cli, Error, Result, UserFriendlyError};
pub use events::{EventBus, TurnEvent};
pub use orchestrator::{
    Orchestrator, OrchestratorConfig, TurnOutcome, TurnState, TurnStatus, DEFAULT_MAX_ITERATIONS,
};
