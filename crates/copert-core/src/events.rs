//! EventBus - broadcast events emitted while a turn runs
//!
//! The REPL subscribes to show tool activity, todo lists and delegations.
//! Nothing in the turn depends on whether anyone listens.

use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

/// Events emitted during one turn
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TurnEvent {
    /// A user message was accepted
    TurnStarted {
        /// Turn identifier
        turn_id: Uuid,
    },
    /// The model is about to be called
    ModelRequested {
        /// Turn identifier
        turn_id: Uuid,
        /// One-based round-trip number within the turn
        round_trip: usize,
    },
    /// A tool call is about to run
    ToolStarted {
        /// Turn identifier
        turn_id: Uuid,
        /// Call id from the model
        tool_call_id: String,
        /// Requested tool name
        tool_name: String,
        /// Parsed arguments (`null` when they did not parse)
        input: serde_json::Value,
    },
    /// A tool call produced its result
    ToolCompleted {
        /// Turn identifier
        turn_id: Uuid,
        /// Call id from the model
        tool_call_id: String,
        /// Requested tool name
        tool_name: String,
        /// Whether the tool succeeded
        success: bool,
        /// Execution duration in milliseconds
        duration_ms: u64,
    },
    /// A sub-agent was handed a task
    DelegationStarted {
        /// Sub-agent class name
        subagent_type: String,
        /// Short task description
        description: String,
    },
    /// The turn ended with a reply
    TurnCompleted {
        /// Turn identifier
        turn_id: Uuid,
        /// Model round-trips used
        round_trips: usize,
    },
    /// The turn was interrupted
    TurnCancelled {
        /// Turn identifier
        turn_id: Uuid,
    },
}

impl TurnEvent {
    /// Turn the event belongs to, if any
    #[must_use]
    pub fn turn_id(&self) -> Option<Uuid> {
        match self {
            Self::TurnStarted { turn_id }
            | Self::ModelRequested { turn_id, .. }
            | Self::ToolStarted { turn_id, .. }
            | Self::ToolCompleted { turn_id, .. }
            | Self::TurnCompleted { turn_id, .. }
            | Self::TurnCancelled { turn_id } => Some(*turn_id),
            Self::DelegationStarted { .. } => None,
        }
    }
}

/// Broadcast-based event bus
///
/// Slow subscribers lag and miss events instead of blocking the turn.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<TurnEvent>,
}

impl EventBus {
    /// Create a bus buffering `capacity` events per subscriber
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Receive every event published from now on
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<TurnEvent> {
        self.sender.subscribe()
    }

    /// Publish to all subscribers, returning how many got it
    pub fn publish(&self, event: TurnEvent) -> usize {
        // no receivers is fine
        self.sender.send(event).unwrap_or(0)
    }

    /// Number of live subscribers
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
