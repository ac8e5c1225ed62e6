//! The `task` tool: hands a self-contained job to a sub-agent

use crate::events::TurnEvent;
use copert_tools::{Tool, ToolDefinition, ToolKind, ToolResult};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use super::class::SubAgentClass;
use super::factory::AgentFactory;

const DESCRIPTION: &str = "Launch a sub-agent to handle a complex, multi-step task on its own.

The sub-agent starts with a fresh context, cannot ask follow-up questions and \
returns one final report to you (not to the user).

Sub-agent types:
- general-purpose: read-only research. Tools: read_file, ls, grep, glob, webfetch, websearch. \
Use for codebase-wide searches, pattern analysis and documentation research.
- code-writer: implementation without command execution. Tools: read_file, write_file, \
edit_file, multiedit, ls, grep, glob. Use for multi-file changes and refactoring.
- project-init: writes COPERT.md (normally used through init).

Use it when a job needs many searches across unknown locations or would clutter the \
conversation. Do not use it for reading one to three known files, single small edits, \
or anything that needs running tests.

Write a detailed prompt: what to look for, where, and exactly what to report back.";

/// Tool that delegates to a sub-agent
pub struct TaskTool {
    definition: ToolDefinition,
    factory: Arc<AgentFactory>,
}

impl TaskTool {
    /// Create a new task tool backed by `factory`
    #[must_use]
    pub fn new(factory: Arc<AgentFactory>) -> Self {
        let definition = ToolDefinition::new(ToolKind::Task, DESCRIPTION).with_parameters(
            serde_json::json!({
                "type": "object",
                "properties": {
                    "description": {
                        "type": "string",
                        "description": "A short (3-5 word) description of the task"
                    },
                    "prompt": {
                        "type": "string",
                        "description": "Detailed instructions for the sub-agent, including what information to return"
                    },
                    "subagent_type": {
                        "type": "string",
                        "description": "Which sub-agent to use: 'general-purpose' or 'code-writer'"
                    }
                },
                "required": ["description", "prompt", "subagent_type"]
            }),
        );

        Self {
            definition,
            factory,
        }
    }
}

#[async_trait::async_trait]
impl Tool for TaskTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, input: serde_json::Value) -> copert_tools::Result<ToolResult> {
        let start = Instant::now();
        let elapsed = || u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        let field = |key: &str| {
            input
                .get(key)
                .and_then(|v| v.as_str())
                .ok_or_else(|| copert_tools::Error::InvalidInput(format!("Missing '{key}' parameter")))
        };
        let description = field("description")?;
        let prompt = field("prompt")?;
        let subagent_type = field("subagent_type")?;

        let class = match subagent_type.parse::<SubAgentClass>() {
            Ok(class) => class,
            Err(message) => return Ok(ToolResult::failure(message, elapsed())),
        };

        info!(class = %class, description = %description, "Starting delegation");
        if let Some(bus) = self.factory.event_bus() {
            bus.publish(TurnEvent::DelegationStarted {
                subagent_type: class.name().to_string(),
                description: description.to_string(),
            });
        }

        let report = self.factory.delegate(class, prompt).await;
        Ok(report.into_tool_result(elapsed()))
    }
}
