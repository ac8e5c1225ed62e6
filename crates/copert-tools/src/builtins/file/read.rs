use super::security::{self, TextFile, Workspace};
use crate::error::{Error, Result};
use crate::registry::{Tool, ToolDefinition, ToolKind, ToolResult};
use std::fmt::Write as _;
use std::time::Instant;
use tracing::debug;

/// Lines returned when no limit is given
const DEFAULT_LINE_LIMIT: usize = 2000;

/// Longest line returned verbatim
const MAX_LINE_CHARS: usize = 2000;

/// Tool for reading file contents with line numbers
pub struct FileReadTool {
    definition: ToolDefinition,
    workspace: Workspace,
}

impl FileReadTool {
    /// Create a new file read tool
    #[must_use]
    pub fn new(workspace: Workspace) -> Self {
        let definition = ToolDefinition::new(
            ToolKind::ReadFile,
            "Read a file from the local filesystem. Returns the contents with line numbers \
             (cat -n format), up to 2000 lines by default. Use relative paths for project files.",
        )
        .with_parameters(serde_json::json!({
            "type": "object",
            "properties": {
                "file_path": {
                    "type": "string",
                    "description": "Path to the file to read (relative to the working directory, e.g. \"src/main.rs\")"
                },
                "offset": {
                    "type": "integer",
                    "description": "The 1-based line number to start reading from"
                },
                "limit": {
                    "type": "integer",
                    "description": "The number of lines to read (default 2000)"
                }
            },
            "required": ["file_path"]
        }));

        Self {
            definition,
            workspace,
        }
    }
}

/// Render `content` in `cat -n` style with the read header
pub(crate) fn render_numbered(content: &str, offset: Option<usize>, limit: Option<usize>) -> String {
    let lines: Vec<&str> = content.lines().collect();
    let start = offset.map_or(0, |o| o.saturating_sub(1));
    let limit = limit.unwrap_or(DEFAULT_LINE_LIMIT);
    let selected: Vec<&str> = lines.iter().skip(start).take(limit).copied().collect();

    let mut header = format!("[Read {} of {} total lines", selected.len(), lines.len());
    if let Some(offset) = offset {
        let _ = write!(header, ", starting from line {offset}");
    }
    header.push(']');

    if selected.is_empty() {
        return format!("{header}\n\n[File is empty]");
    }

    let body = number_lines(&selected, start + 1);
    format!("{header}\n\n{body}")
}

/// Number `lines` in `cat -n` style starting at `first`, cutting overlong lines
pub(crate) fn number_lines(lines: &[&str], first: usize) -> String {
    let mut body = String::new();
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            body.push('\n');
        }
        let number = first + i;
        if line.chars().count() > MAX_LINE_CHARS {
            let cut = copert_llm::util::truncate_chars(line, MAX_LINE_CHARS);
            let _ = write!(body, "{number:6}\t{cut}... [truncated]");
        } else {
            let _ = write!(body, "{number:6}\t{}", line.trim_end());
        }
    }
    body
}

#[async_trait::async_trait]
impl Tool for FileReadTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, input: serde_json::Value) -> Result<ToolResult> {
        let start = Instant::now();

        let raw = input
            .get("file_path")
            .and_then(|v| v.as_str())
            .ok_or_else(|| Error::InvalidInput("Missing 'file_path' parameter".to_string()))?;
        let offset = input
            .get("offset")
            .and_then(serde_json::Value::as_u64)
            .and_then(|v| usize::try_from(v).ok())
            .filter(|v| *v > 0);
        let limit = input
            .get("limit")
            .and_then(serde_json::Value::as_u64)
            .and_then(|v| usize::try_from(v).ok());

        let path = self.workspace.resolve(raw);
        debug!(path = %path.display(), ?offset, ?limit, "Reading file");

        let elapsed = || u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        let shown = path.display();

        Ok(match security::read_text(&path).await? {
            TextFile::Text(content) => {
                ToolResult::success(render_numbered(&content, offset, limit), elapsed())
            }
            TextFile::Missing => ToolResult::failure(format!("Error: File not found: {shown}"), elapsed()),
            TextFile::NotAFile => {
                ToolResult::failure(format!("Error: Path is not a file: {shown}"), elapsed())
            }
            TextFile::Binary => ToolResult::failure(
                format!("Error: Unable to decode file (possibly binary): {shown}"),
                elapsed(),
            ),
        })
    }
}
