use super::security::{line_count, Workspace};
use crate::error::{Error, Result};
use crate::registry::{Tool, ToolDefinition, ToolKind, ToolResult};
use std::time::Instant;
use tracing::{debug, warn};

/// Tool for creating or overwriting files
pub struct FileWriteTool {
    definition: ToolDefinition,
    workspace: Workspace,
}

impl FileWriteTool {
    /// Create a new file write tool
    #[must_use]
    pub fn new(workspace: Workspace) -> Self {
        let definition = ToolDefinition::new(
            ToolKind::WriteFile,
            "Write a file to the local filesystem, overwriting it if it exists. \
             Parent directories are created as needed. Prefer edit_file for changes to existing files.",
        )
        .with_parameters(serde_json::json!({
            "type": "object",
            "properties": {
                "file_path": {
                    "type": "string",
                    "description": "Path to the file to write (relative to the working directory)"
                },
                "content": {
                    "type": "string",
                    "description": "The full content to write"
                }
            },
            "required": ["file_path", "content"]
        }));

        Self {
            definition,
            workspace,
        }
    }
}

#[async_trait::async_trait]
impl Tool for FileWriteTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, input: serde_json::Value) -> Result<ToolResult> {
        let start = Instant::now();

        let raw = input
            .get("file_path")
            .and_then(|v| v.as_str())
            .ok_or_else(|| Error::InvalidInput("Missing 'file_path' parameter".to_string()))?;
        let content = input
            .get("content")
            .and_then(|v| v.as_str())
            .ok_or_else(|| Error::InvalidInput("Missing 'content' parameter".to_string()))?;

        let path = self.workspace.resolve_for_write(raw)?;
        debug!(path = %path.display(), bytes = content.len(), "Writing file");

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let elapsed = || u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        if let Err(e) = tokio::fs::write(&path, content).await {
            warn!(path = %path.display(), error = %e, "File write failed");
            let message = if e.kind() == std::io::ErrorKind::PermissionDenied {
                format!("Error: Permission denied: {}", path.display())
            } else {
                format!("Error: Unable to write file: {e}")
            };
            return Ok(ToolResult::failure(message, elapsed()));
        }

        Ok(ToolResult::success(
            format!(
                "Successfully wrote to {} ({} lines, {} characters)",
                path.display(),
                line_count(content),
                content.chars().count()
            ),
            elapsed(),
        ))
    }
}
