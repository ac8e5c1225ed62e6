use super::security::Workspace;
use crate::error::{Error, Result};
use crate::registry::{Tool, ToolDefinition, ToolKind, ToolResult};
use std::time::Instant;
use tracing::debug;

/// Tool for listing directory contents
pub struct FileListTool {
    definition: ToolDefinition,
    workspace: Workspace,
}

impl FileListTool {
    /// Create a new directory listing tool
    #[must_use]
    pub fn new(workspace: Workspace) -> Self {
        let definition = ToolDefinition::new(
            ToolKind::Ls,
            "List files and directories in a directory. Directories are listed first with a \
             trailing '/'. Prefer glob or grep when you know what you are looking for.",
        )
        .with_parameters(serde_json::json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Directory to list (relative to the working directory, \".\" for the root)"
                },
                "ignore": {
                    "type": "array",
                    "items": {"type": "string"},
                    "description": "Glob patterns for entry names to skip (e.g. [\"*.log\", \"target\"])"
                }
            },
            "required": ["path"]
        }));

        Self {
            definition,
            workspace,
        }
    }
}

#[async_trait::async_trait]
impl Tool for FileListTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, input: serde_json::Value) -> Result<ToolResult> {
        let start = Instant::now();
        let elapsed = || u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        let raw = input
            .get("path")
            .and_then(|v| v.as_str())
            .ok_or_else(|| Error::InvalidInput("Missing 'path' parameter".to_string()))?;

        let ignore: Vec<glob::Pattern> = input
            .get("ignore")
            .and_then(|v| v.as_array())
            .map(|arr| {
                arr.iter()
                    .filter_map(|v| v.as_str())
                    .filter_map(|p| glob::Pattern::new(p).ok())
                    .collect()
            })
            .unwrap_or_default();

        let path = self.workspace.resolve(raw);
        let shown = path.display();

        match tokio::fs::metadata(&path).await {
            Ok(meta) if !meta.is_dir() => {
                return Ok(ToolResult::failure(
                    format!("Error: Path is not a directory: {shown}"),
                    elapsed(),
                ))
            }
            Ok(_) => {}
            Err(_) => {
                return Ok(ToolResult::failure(
                    format!("Error: Path does not exist: {shown}"),
                    elapsed(),
                ))
            }
        }

        debug!(path = %shown, ignore = ignore.len(), "Listing directory");

        let mut dirs = Vec::new();
        let mut files = Vec::new();

        let mut reader = match tokio::fs::read_dir(&path).await {
            Ok(reader) => reader,
            Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
                return Ok(ToolResult::failure(
                    format!("Error: Permission denied to read directory: {shown}"),
                    elapsed(),
                ))
            }
            Err(e) => return Err(Error::Io(e)),
        };

        while let Some(entry) = reader.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            if ignore.iter().any(|p| p.matches(&name)) {
                continue;
            }

            // file_type() does not follow symlinks; metadata() does
            let file_type = entry.file_type().await?;
            let follows_to_dir = tokio::fs::metadata(entry.path())
                .await
                .map(|m| m.is_dir())
                .unwrap_or(false);

            if follows_to_dir {
                dirs.push(format!("{name}/"));
            } else if file_type.is_symlink() {
                files.push(format!("{name}@"));
            } else {
                files.push(name);
            }
        }

        if dirs.is_empty() && files.is_empty() {
            return Ok(ToolResult::success(
                format!("Directory is empty: {shown}"),
                elapsed(),
            ));
        }

        dirs.sort();
        files.sort();

        let listing: Vec<&str> = dirs.iter().chain(files.iter()).map(String::as_str).collect();
        Ok(ToolResult::success(
            format!(
                "Contents of {shown}:\n{}\n\nTotal: {} directories, {} files",
                listing.join("\n"),
                dirs.len(),
                files.len()
            ),
            elapsed(),
        ))
    }
}
