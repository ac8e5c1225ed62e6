//! Orchestrator types

use crate::dispatcher::ToolCallRecord;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Where a turn is in its model/tool cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    /// Waiting for the next assistant message
    AwaitingModel,
    /// The last assistant message has tool calls still to answer
    AwaitingToolResults,
    /// The model answered without tool calls; absorbing until the next user message
    Terminal,
}

/// How a turn ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnStatus {
    /// The model produced a final reply
    Completed,
    /// The user interrupted the turn
    Cancelled,
}

/// Result of one turn
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnOutcome {
    /// Turn identifier
    pub turn_id: Uuid,
    /// Final status
    pub status: TurnStatus,
    /// Final assistant text, if any
    pub reply: Option<String>,
    /// Model round-trips used
    pub round_trips: usize,
    /// Every tool call made during the turn
    pub tool_calls: Vec<ToolCallRecord>,
}

impl TurnOutcome {
    /// Whether the turn ended with a reply
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.status == TurnStatus::Completed
    }
}
