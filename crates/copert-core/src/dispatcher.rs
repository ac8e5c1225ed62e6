//! Dispatcher - runs the tool calls of one assistant message
//!
//! Calls run one after another in the order the model sent them. Every call
//! yields exactly one [`ToolCallRecord`]; no single failure stops the batch.

use crate::approval::SharedApprovalGate;
use crate::events::{EventBus, TurnEvent};
use copert_llm::{Message, ToolCall};
use copert_tools::ToolRunner;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Content recorded for calls cut short by an interrupt
pub const INTERRUPTED: &str = "Error: Interrupted by user";

/// Outcome of one tool call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRecord {
    /// Call id from the model
    pub call_id: String,
    /// Tool name as the model sent it
    pub tool_name: String,
    /// Parsed arguments (`null` when they did not parse)
    pub input: serde_json::Value,
    /// Whether the tool succeeded
    pub success: bool,
    /// Text handed back to the model
    pub content: String,
    /// Execution duration in milliseconds
    pub duration_ms: u64,
}

impl ToolCallRecord {
    fn failed(call: &ToolCall, input: serde_json::Value, content: String) -> Self {
        Self {
            call_id: call.id.clone(),
            tool_name: call.name.clone(),
            input,
            success: false,
            content,
            duration_ms: 0,
        }
    }

    /// Tool message answering the call
    #[must_use]
    pub fn to_message(&self) -> Message {
        Message::tool_response(&self.call_id, &self.tool_name, &self.content)
    }
}

fn rejection_content(tool: &str, input: &serde_json::Value) -> String {
    match input.get("file_path").and_then(|v| v.as_str()) {
        Some(path) => {
            format!("Error: User rejected the {tool} operation on {path}. No changes were made.")
        }
        None => format!("Error: User rejected the {tool} operation. No changes were made."),
    }
}

/// Resolves, approves and runs tool calls against one registry
#[derive(Debug, Clone)]
pub struct Dispatcher {
    runner: ToolRunner,
    approval: SharedApprovalGate,
    event_bus: Option<Arc<EventBus>>,
}

impl Dispatcher {
    /// Create a dispatcher over `runner`'s registry
    #[must_use]
    pub fn new(runner: ToolRunner, approval: SharedApprovalGate) -> Self {
        Self {
            runner,
            approval,
            event_bus: None,
        }
    }

    /// Publish tool activity on `bus`
    #[must_use]
    pub fn with_event_bus(mut self, bus: Arc<EventBus>) -> Self {
        self.event_bus = Some(bus);
        self
    }

    /// The runner (and through it the registry) calls go to
    #[must_use]
    pub fn runner(&self) -> &ToolRunner {
        &self.runner
    }

    /// The gate destructive calls go through
    #[must_use]
    pub fn approval(&self) -> &SharedApprovalGate {
        &self.approval
    }

    fn emit(&self, event: TurnEvent) {
        if let Some(bus) = &self.event_bus {
            bus.publish(event);
        }
    }

    /// Run every call in order, returning one record per call
    ///
    /// Once `cancel` fires, the running call is abandoned and the remaining
    /// ones are answered with [`INTERRUPTED`] without running.
    #[instrument(skip(self, calls, cancel), fields(calls = calls.len()))]
    pub async fn dispatch(
        &self,
        turn_id: Uuid,
        calls: &[ToolCall],
        cancel: &CancellationToken,
    ) -> Vec<ToolCallRecord> {
        let mut records = Vec::with_capacity(calls.len());

        for call in calls {
            if cancel.is_cancelled() {
                records.push(ToolCallRecord::failed(
                    call,
                    serde_json::Value::Null,
                    INTERRUPTED.to_string(),
                ));
                continue;
            }

            let input = call.parse_arguments().unwrap_or(serde_json::Value::Null);
            self.emit(TurnEvent::ToolStarted {
                turn_id,
                tool_call_id: call.id.clone(),
                tool_name: call.name.clone(),
                input: input.clone(),
            });

            let record = self.dispatch_one(call, cancel).await;

            info!(
                tool = %record.tool_name,
                call_id = %record.call_id,
                success = record.success,
                duration_ms = record.duration_ms,
                "Tool completed"
            );
            self.emit(TurnEvent::ToolCompleted {
                turn_id,
                tool_call_id: record.call_id.clone(),
                tool_name: record.tool_name.clone(),
                success: record.success,
                duration_ms: record.duration_ms,
            });
            records.push(record);
        }

        records
    }

    async fn dispatch_one(&self, call: &ToolCall, cancel: &CancellationToken) -> ToolCallRecord {
        let tool = match self.runner.resolve(&call.name) {
            Ok(tool) => tool,
            Err(e) => {
                warn!(tool = %call.name, "Model requested an unavailable tool");
                return ToolCallRecord::failed(
                    call,
                    serde_json::Value::Null,
                    format!("Error: {e}"),
                );
            }
        };

        let input = match call.parse_arguments() {
            Ok(input) => input,
            Err(e) => {
                warn!(tool = %call.name, error = %e, "Unparseable tool arguments");
                return ToolCallRecord::failed(
                    call,
                    serde_json::Value::Null,
                    format!("Error: Invalid arguments for {}: {e}", call.name),
                );
            }
        };

        if let Err(e) = tool.validate_input(&input) {
            debug!(tool = %call.name, error = %e, "Tool input rejected by schema");
            return ToolCallRecord::failed(
                call,
                input,
                format!("Error: Invalid input for {}: {e}", call.name),
            );
        }

        let kind = tool.definition().kind;
        if kind.is_destructive() {
            let approved = self.approval.request_approval(kind, &input).await;
            // an interrupt while the prompt was open rejects the call
            if !approved || cancel.is_cancelled() {
                info!(tool = %call.name, approved, "Destructive call rejected");
                let content = rejection_content(&call.name, &input);
                return ToolCallRecord::failed(call, input, content);
            }
        }

        info!(tool = %call.name, call_id = %call.id, "Executing tool");
        let result = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                info!(tool = %call.name, "Tool execution interrupted");
                return ToolCallRecord::failed(call, input, INTERRUPTED.to_string());
            }
            result = self.runner.run(tool.as_ref(), input.clone()) => result,
        };

        ToolCallRecord {
            call_id: call.id.clone(),
            tool_name: call.name.clone(),
            input,
            success: result.success,
            content: result.output,
            duration_ms: result.duration_ms,
        }
    }
}
