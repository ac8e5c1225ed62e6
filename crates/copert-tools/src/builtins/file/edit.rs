use super::security::{self, TextFile, Workspace};
use crate::edit::{self, EditError, EditOperation};
use crate::error::{Error, Result};
use crate::registry::{Tool, ToolDefinition, ToolKind, ToolResult};
use std::time::Instant;
use tracing::debug;

/// Tool for a single exact-string replacement
///
/// Runs through the same engine as `multiedit` with a one-element sequence.
pub struct FileEditTool {
    definition: ToolDefinition,
    workspace: Workspace,
}

impl FileEditTool {
    /// Create a new file edit tool
    #[must_use]
    pub fn new(workspace: Workspace) -> Self {
        let definition = ToolDefinition::new(
            ToolKind::EditFile,
            "Perform an exact string replacement in a file. Read the file first and preserve \
             indentation exactly as it appears after the line number prefix. Fails if old_string \
             is missing or appears more than once unless replace_all is set.",
        )
        .with_parameters(serde_json::json!({
            "type": "object",
            "properties": {
                "file_path": {
                    "type": "string",
                    "description": "Path to the file to modify (relative to the working directory)"
                },
                "old_string": {
                    "type": "string",
                    "description": "The text to replace (must match exactly, including whitespace)"
                },
                "new_string": {
                    "type": "string",
                    "description": "The text to replace it with (must differ from old_string)"
                },
                "replace_all": {
                    "type": "boolean",
                    "description": "Replace all occurrences of old_string (default false)"
                }
            },
            "required": ["file_path", "old_string", "new_string"]
        }));

        Self {
            definition,
            workspace,
        }
    }
}

#[async_trait::async_trait]
impl Tool for FileEditTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, input: serde_json::Value) -> Result<ToolResult> {
        let start = Instant::now();

        let raw = input
            .get("file_path")
            .and_then(|v| v.as_str())
            .ok_or_else(|| Error::InvalidInput("Missing 'file_path' parameter".to_string()))?;
        let operation: EditOperation = serde_json::from_value(input.clone())
            .map_err(|e| Error::InvalidInput(e.to_string()))?;

        let path = self.workspace.resolve_for_write(raw)?;
        let shown = path.display();
        let elapsed = || u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        let original = match security::read_text(&path).await? {
            TextFile::Text(content) => content,
            TextFile::Missing => {
                return Ok(ToolResult::failure(format!("Error: File not found: {shown}"), elapsed()))
            }
            TextFile::NotAFile => {
                return Ok(ToolResult::failure(
                    format!("Error: Path is not a file: {shown}"),
                    elapsed(),
                ))
            }
            TextFile::Binary => {
                return Ok(ToolResult::failure(
                    format!("Error: Unable to decode file (possibly binary): {shown}"),
                    elapsed(),
                ))
            }
        };

        let occurrences = original.matches(operation.old_string.as_str()).count();
        let updated = match edit::apply_edits(&original, std::slice::from_ref(&operation)) {
            Ok(updated) => updated,
            Err(e) => {
                let message = match e {
                    EditError::Identical { .. } => {
                        "Error: old_string and new_string must be different".to_string()
                    }
                    EditError::NotFound { .. } | EditError::EmptyMatch { .. } => {
                        format!("Error: old_string not found in file: {shown}")
                    }
                    EditError::Ambiguous { count, .. } => format!(
                        "Error: old_string appears {count} times in the file. Either provide a \
                         larger string with more surrounding context to make it unique, or use \
                         replace_all=true to change every instance."
                    ),
                    EditError::Empty => format!("Error: {e}"),
                };
                return Ok(ToolResult::failure(message, elapsed()));
            }
        };

        if let Err(e) = edit::persist(&path, &original, &updated).await {
            return Ok(ToolResult::failure(
                format!("Error: Unable to write file {shown}: {e}"),
                elapsed(),
            ));
        }

        let replacements = if operation.replace_all { occurrences } else { 1 };
        debug!(path = %shown, replacements, "File edited");

        Ok(ToolResult::success(
            format!("Successfully replaced {replacements} occurrence(s) in {shown}"),
            elapsed(),
        ))
    }
}
