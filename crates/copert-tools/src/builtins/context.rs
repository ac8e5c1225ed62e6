//! Project context file (`COPERT.md`)
//!
//! Always lives at the workspace root, whatever path the model has in mind.

use super::file::read::number_lines;
use super::file::{line_count, read_text, TextFile, Workspace};
use crate::error::Result;
use crate::registry::{Tool, ToolDefinition, ToolKind, ToolResult};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

/// File name of the project context file
pub const COPERT_MD: &str = "COPERT.md";

/// Load `COPERT.md` from `dir` for the session system prompt
///
/// Returns `None` when the file is missing, empty or unreadable.
pub async fn load_context_file(dir: &Path) -> Option<String> {
    let path = dir.join(COPERT_MD);
    match read_text(&path).await {
        Ok(TextFile::Text(content)) if !content.trim().is_empty() => {
            debug!(path = %path.display(), "Loaded project context");
            Some(content)
        }
        Ok(_) => None,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to read project context");
            None
        }
    }
}

fn context_path(workspace: &Workspace) -> PathBuf {
    workspace.root().join(COPERT_MD)
}

/// Tool that reads `COPERT.md` with line numbers
pub struct ReadCopertMdTool {
    definition: ToolDefinition,
    workspace: Workspace,
}

impl ReadCopertMdTool {
    /// Create a new tool reading from the workspace root
    #[must_use]
    pub fn new(workspace: Workspace) -> Self {
        let definition = ToolDefinition::new(
            ToolKind::ReadCopertMd,
            "Read COPERT.md from the project root to see what project context is already \
             documented. Takes no parameters.",
        )
        .with_parameters(serde_json::json!({
            "type": "object",
            "properties": {}
        }));

        Self {
            definition,
            workspace,
        }
    }
}

#[async_trait::async_trait]
impl Tool for ReadCopertMdTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, _input: serde_json::Value) -> Result<ToolResult> {
        let start = Instant::now();
        let elapsed = || u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        let path = context_path(&self.workspace);
        let shown = path.display();

        Ok(match read_text(&path).await? {
            TextFile::Text(content) => {
                let lines: Vec<&str> = content.lines().collect();
                ToolResult::success(
                    format!(
                        "[Read COPERT.md from {shown} - {} lines]\n\n{}",
                        lines.len(),
                        number_lines(&lines, 1)
                    ),
                    elapsed(),
                )
            }
            TextFile::Missing => ToolResult::success(
                format!(
                    "COPERT.md not found in {}\n\nYou can create one using the init tool or write_copert_md tool.",
                    self.workspace.root().display()
                ),
                elapsed(),
            ),
            TextFile::NotAFile => ToolResult::failure(
                format!("Error: COPERT.md exists but is not a file: {shown}"),
                elapsed(),
            ),
            TextFile::Binary => ToolResult::failure(
                format!("Error: Unable to decode COPERT.md (possibly binary): {shown}"),
                elapsed(),
            ),
        })
    }
}

/// Tool that overwrites `COPERT.md` at the workspace root
pub struct WriteCopertMdTool {
    definition: ToolDefinition,
    workspace: Workspace,
}

impl WriteCopertMdTool {
    /// Create a new tool writing to the workspace root
    #[must_use]
    pub fn new(workspace: Workspace) -> Self {
        let definition = ToolDefinition::new(
            ToolKind::WriteCopertMd,
            "Write COPERT.md in the project root. It is loaded automatically as context in \
             future sessions. Content should start with \"# COPERT.md\" followed by a line \
             saying the file guides Copert when working with this repository.",
        )
        .with_parameters(serde_json::json!({
            "type": "object",
            "properties": {
                "content": {
                    "type": "string",
                    "description": "The full content to write to COPERT.md"
                }
            },
            "required": ["content"]
        }));

        Self {
            definition,
            workspace,
        }
    }
}

#[async_trait::async_trait]
impl Tool for WriteCopertMdTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, input: serde_json::Value) -> Result<ToolResult> {
        let start = Instant::now();
        let elapsed = || u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        let content = input.get("content").and_then(|v| v.as_str()).ok_or_else(|| {
            crate::error::Error::InvalidInput("Missing 'content' parameter".to_string())
        })?;

        let path = context_path(&self.workspace);
        let shown = path.display();

        if let Err(e) = tokio::fs::write(&path, content).await {
            let message = if e.kind() == std::io::ErrorKind::PermissionDenied {
                format!("Error: Permission denied writing to {shown}")
            } else {
                format!("Error: Unable to write COPERT.md: {e}")
            };
            return Ok(ToolResult::failure(message, elapsed()));
        }

        info!(path = %shown, bytes = content.len(), "Wrote project context");
        Ok(ToolResult::success(
            format!(
                "✅ Successfully wrote COPERT.md to {shown}\n({} lines, {} characters)\n\n\
                 This file will be automatically loaded in future Copert sessions.",
                line_count(content),
                content.chars().count()
            ),
            elapsed(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_read_missing_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let tool = ReadCopertMdTool::new(Workspace::new(dir.path()));

        let result = tool.execute(json!({})).await.unwrap();
        assert!(result.success);
        assert!(result.output.starts_with("COPERT.md not found in "));
        assert!(result.output.ends_with("init tool or write_copert_md tool."));
    }

    #[tokio::test]
    async fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let workspace = Workspace::new(dir.path());
        let writer = WriteCopertMdTool::new(workspace.clone());
        let reader = ReadCopertMdTool::new(workspace);

        let written = writer
            .execute(json!({"content": "# COPERT.md\n\nBuild with make."}))
            .await
            .unwrap();
        assert!(written.success);
        assert!(written.output.contains("(3 lines, 29 characters)"));

        let read = reader.execute(json!({})).await.unwrap();
        assert!(read.success);
        assert!(read.output.contains("- 3 lines]\n\n     1\t# COPERT.md\n     2\t\n     3\tBuild with make."));
    }

    #[tokio::test]
    async fn test_load_context_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_context_file(dir.path()).await.is_none());

        std::fs::write(dir.path().join(COPERT_MD), "  \n").unwrap();
        assert!(load_context_file(dir.path()).await.is_none());

        std::fs::write(dir.path().join(COPERT_MD), "# COPERT.md\nuse cargo").unwrap();
        assert_eq!(
            load_context_file(dir.path()).await.as_deref(),
            Some("# COPERT.md\nuse cargo")
        );
    }

    #[test]
    fn test_definitions() {
        let ws = Workspace::new(".");
        assert_eq!(ReadCopertMdTool::new(ws.clone()).definition().kind, ToolKind::ReadCopertMd);
        let write = WriteCopertMdTool::new(ws);
        assert_eq!(write.definition().kind, ToolKind::WriteCopertMd);
        assert!(!write.definition().destructive);
    }
}
