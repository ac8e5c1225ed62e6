use super::{relative_display, walk_files};
use crate::builtins::file::Workspace;
use crate::error::{Error, Result};
use crate::registry::{Tool, ToolDefinition, ToolKind, ToolResult};
use std::path::PathBuf;
use std::time::{Instant, SystemTime};
use tracing::debug;

/// Filename pattern search, newest files first
pub struct GlobTool {
    definition: ToolDefinition,
    workspace: Workspace,
}

impl GlobTool {
    /// Create a new glob tool
    #[must_use]
    pub fn new(workspace: Workspace) -> Self {
        let definition = ToolDefinition::new(
            ToolKind::Glob,
            "Find files by name pattern such as \"**/*.rs\" or \"src/**/*.toml\". Returns \
             matching file paths sorted by modification time, newest first.",
        )
        .with_parameters(serde_json::json!({
            "type": "object",
            "properties": {
                "pattern": {
                    "type": "string",
                    "description": "The glob pattern to match files against"
                },
                "path": {
                    "type": "string",
                    "description": "Directory to search in (defaults to the working directory)"
                }
            },
            "required": ["pattern"]
        }));

        Self {
            definition,
            workspace,
        }
    }
}

#[async_trait::async_trait]
impl Tool for GlobTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, input: serde_json::Value) -> Result<ToolResult> {
        let start = Instant::now();
        let elapsed = || u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        let pattern = input
            .get("pattern")
            .and_then(|v| v.as_str())
            .ok_or_else(|| Error::InvalidInput("Missing 'pattern' parameter".to_string()))?
            .to_string();
        let root = self
            .workspace
            .resolve(input.get("path").and_then(|v| v.as_str()).unwrap_or(""));

        if !root.is_dir() {
            let message = if root.exists() {
                format!("Error: Path is not a directory: {}", root.display())
            } else {
                format!("Error: Directory not found: {}", root.display())
            };
            return Ok(ToolResult::failure(message, elapsed()));
        }

        if let Err(e) = ::glob::Pattern::new(&pattern) {
            return Ok(ToolResult::failure(
                format!("Error: Invalid glob pattern '{pattern}': {e}"),
                elapsed(),
            ));
        }

        debug!(pattern = %pattern, root = %root.display(), "Globbing");

        let search_root = root.clone();
        let glob_pattern = pattern.clone();
        let mut matches: Vec<(PathBuf, SystemTime)> = tokio::task::spawn_blocking(move || {
            walk_files(&search_root, &glob_pattern)
                .into_iter()
                .map(|p| {
                    let modified = p
                        .metadata()
                        .and_then(|m| m.modified())
                        .unwrap_or(SystemTime::UNIX_EPOCH);
                    (p, modified)
                })
                .collect()
        })
        .await
        .map_err(|e| Error::Execution(e.to_string()))?;

        if matches.is_empty() {
            return Ok(ToolResult::success(
                format!("No files found matching pattern: {pattern}"),
                elapsed(),
            ));
        }

        matches.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        let lines: Vec<String> = matches
            .iter()
            .map(|(p, _)| relative_display(&root, p))
            .collect();

        Ok(ToolResult::success(
            format!(
                "Found {} file(s) matching '{pattern}':\n{}",
                lines.len(),
                lines.join("\n")
            ),
            elapsed(),
        ))
    }
}
