use super::security::{self, line_count, TextFile, Workspace};
use crate::edit::{self, EditOperation};
use crate::error::{Error, Result};
use crate::registry::{Tool, ToolDefinition, ToolKind, ToolResult};
use std::time::Instant;
use tracing::{debug, info};

/// Tool applying an ordered list of edits to one file, all or nothing
pub struct MultiEditTool {
    definition: ToolDefinition,
    workspace: Workspace,
}

impl MultiEditTool {
    /// Create a new multi-edit tool
    #[must_use]
    pub fn new(workspace: Workspace) -> Self {
        let definition = ToolDefinition::new(
            ToolKind::MultiEdit,
            "Make multiple exact-string edits to a single file in one atomic operation. Edits are \
             applied in order and each one sees the result of the previous. If any edit fails, \
             none are applied. Prefer this over edit_file for several changes to the same file.",
        )
        .with_parameters(serde_json::json!({
            "type": "object",
            "properties": {
                "file_path": {
                    "type": "string",
                    "description": "Path to the file to modify (relative to the working directory)"
                },
                "edits": {
                    "type": "array",
                    "description": "Edit operations to perform sequentially",
                    "items": {
                        "type": "object",
                        "properties": {
                            "old_string": {"type": "string", "description": "The text to replace"},
                            "new_string": {"type": "string", "description": "The text to replace it with"},
                            "replace_all": {"type": "boolean", "description": "Replace all occurrences (default false)"}
                        },
                        "required": ["old_string", "new_string"]
                    }
                }
            },
            "required": ["file_path", "edits"]
        }));

        Self {
            definition,
            workspace,
        }
    }
}

/// Parse the `edits` array, naming the first malformed entry
pub(crate) fn parse_edits(value: &serde_json::Value) -> std::result::Result<Vec<EditOperation>, String> {
    let items = value
        .as_array()
        .ok_or_else(|| "Error: 'edits' must be an array".to_string())?;

    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let index = i + 1;
            for field in ["old_string", "new_string"] {
                if item.get(field).and_then(|v| v.as_str()).is_none() {
                    return Err(format!("Error: Edit {index} missing required field '{field}'"));
                }
            }
            serde_json::from_value(item.clone())
                .map_err(|e| format!("Error parsing edit {index}: {e}"))
        })
        .collect()
}

#[async_trait::async_trait]
impl Tool for MultiEditTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, input: serde_json::Value) -> Result<ToolResult> {
        let start = Instant::now();
        let elapsed = || u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        let raw = input
            .get("file_path")
            .and_then(|v| v.as_str())
            .ok_or_else(|| Error::InvalidInput("Missing 'file_path' parameter".to_string()))?;
        let edits = input
            .get("edits")
            .ok_or_else(|| Error::InvalidInput("Missing 'edits' parameter".to_string()))?;

        let operations = match parse_edits(edits) {
            Ok(ops) => ops,
            Err(message) => return Ok(ToolResult::failure(message, elapsed())),
        };

        let path = self.workspace.resolve_for_write(raw)?;
        let shown = path.display();

        let original = match security::read_text(&path).await? {
            TextFile::Text(content) => content,
            TextFile::Missing => {
                return Ok(ToolResult::failure(
                    format!("Error: File does not exist: {shown}"),
                    elapsed(),
                ))
            }
            TextFile::NotAFile => {
                return Ok(ToolResult::failure(
                    format!("Error: Path is not a file: {shown}"),
                    elapsed(),
                ))
            }
            TextFile::Binary => {
                return Ok(ToolResult::failure(
                    format!("Error: File is not a valid UTF-8 text file: {shown}"),
                    elapsed(),
                ))
            }
        };

        let updated = match edit::apply_edits(&original, &operations) {
            Ok(updated) => updated,
            Err(e) => {
                debug!(path = %shown, index = ?e.index(), "Edit sequence rejected");
                return Ok(ToolResult::failure(format!("Error: {e}"), elapsed()));
            }
        };

        if let Err(e) = edit::persist(&path, &original, &updated).await {
            return Ok(ToolResult::failure(
                format!("Error writing file: {e}"),
                elapsed(),
            ));
        }

        info!(path = %shown, edits = operations.len(), "Applied edits");

        Ok(ToolResult::success(
            format!(
                "Successfully applied {} edits to {shown} ({} lines total)",
                operations.len(),
                line_count(&updated)
            ),
            elapsed(),
        ))
    }
}
