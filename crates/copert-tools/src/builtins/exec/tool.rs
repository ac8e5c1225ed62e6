use crate::builtins::file::Workspace;
use crate::error::{Error, Result};
use crate::registry::{Tool, ToolDefinition, ToolKind, ToolResult};
use std::time::Instant;
use tracing::{debug, info, warn};

use super::config::ExecConfig;
use super::runner;

/// Tool for running shell commands in the working directory
pub struct BashTool {
    pub(crate) definition: ToolDefinition,
    pub(crate) config: ExecConfig,
    workspace: Workspace,
}

impl BashTool {
    /// Create a new shell tool
    #[must_use]
    pub fn new(workspace: Workspace, config: ExecConfig) -> Self {
        let timeout_desc = format!(
            "Timeout in milliseconds (default {}, max {})",
            config.default_timeout_ms, config.max_timeout_ms
        );
        let definition = ToolDefinition::new(
            ToolKind::Bash,
            "Execute a shell command in the working directory and return its combined \
             stdout/stderr. Use it for terminal operations like git, cargo, npm or docker; use \
             the dedicated tools for reading, writing, editing and searching files.",
        )
        .with_parameters(serde_json::json!({
            "type": "object",
            "properties": {
                "command": {
                    "type": "string",
                    "description": "The command to execute"
                },
                "timeout": {
                    "type": "integer",
                    "description": timeout_desc
                },
                "description": {
                    "type": "string",
                    "description": "Clear, concise description of what this command does (5-10 words)"
                }
            },
            "required": ["command"]
        }));

        Self {
            definition,
            config,
            workspace,
        }
    }
}

#[async_trait::async_trait]
impl Tool for BashTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, input: serde_json::Value) -> Result<ToolResult> {
        let start = Instant::now();
        let elapsed = || u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        let command = input
            .get("command")
            .and_then(|v| v.as_str())
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| Error::InvalidInput("Missing 'command' parameter".to_string()))?;
        let timeout_ms = self
            .config
            .effective_timeout_ms(input.get("timeout").and_then(|v| v.as_u64()));
        let description = input.get("description").and_then(|v| v.as_str());

        info!(command = %command, ?description, timeout_ms, "Running shell command");

        match runner::run_command(&self.config, command, self.workspace.root(), timeout_ms).await {
            Ok(output) => {
                debug!(exit_code = output.exit_code, "Command finished");
                Ok(ToolResult::success(
                    runner::format_output(&output, self.config.output_limit),
                    elapsed(),
                ))
            }
            Err(Error::Timeout(ms)) => {
                warn!(command = %command, timeout_ms = ms, "Command timed out");
                #[allow(clippy::cast_precision_loss)]
                let minutes = ms as f64 / 60_000.0;
                Ok(ToolResult::failure(
                    format!("Error: Command timed out after {minutes:.1} minutes"),
                    elapsed(),
                ))
            }
            Err(e) => Ok(ToolResult::failure(
                format!("Error executing command: {e}"),
                elapsed(),
            )),
        }
    }
}
