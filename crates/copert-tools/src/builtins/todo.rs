//! Session todo list
//!
//! The model sends the whole list on every call; the tool validates it and
//! renders it back. Nothing is stored between calls.

use crate::error::{Error, Result};
use crate::registry::{Tool, ToolDefinition, ToolKind, ToolResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt::Write as _;
use std::time::Instant;

/// Todo item state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TodoStatus {
    /// Not started
    Pending,
    /// Being worked on
    InProgress,
    /// Finished
    Completed,
}

impl TodoStatus {
    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "pending" => Some(Self::Pending),
            "in_progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }

    fn marker(self) -> &'static str {
        match self {
            Self::Pending => "⏳",
            Self::InProgress => "🔄",
            Self::Completed => "✅",
        }
    }
}

/// One validated todo
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoItem {
    /// Unique id within the list
    pub id: String,
    /// Task description
    pub content: String,
    /// Current state
    pub status: TodoStatus,
}

/// Validate the raw list, reporting the first problem with a 1-based index
pub(crate) fn parse_todos(raw: &serde_json::Value) -> std::result::Result<Vec<TodoItem>, String> {
    let entries = raw.as_array().map(Vec::as_slice).unwrap_or_default();
    if entries.is_empty() {
        return Err("Error: No todos provided. Must provide at least one todo item.".to_string());
    }

    let mut seen = HashSet::new();
    let mut items = Vec::with_capacity(entries.len());
    for (i, entry) in entries.iter().enumerate() {
        let n = i + 1;
        for field in ["content", "status", "id"] {
            if entry.get(field).is_none() {
                return Err(format!("Error: Todo {n} missing required field '{field}'"));
            }
        }

        let content = entry["content"].as_str().unwrap_or_default();
        if content.trim().is_empty() {
            return Err(format!("Error: Todo {n} has empty content"));
        }

        let status_raw = match &entry["status"] {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        let Some(status) = TodoStatus::parse(&status_raw) else {
            return Err(format!(
                "Error: Todo {n} has invalid status '{status_raw}'. Must be one of: pending, in_progress, completed"
            ));
        };

        let id = match &entry["id"] {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        if !seen.insert(id.clone()) {
            return Err(format!("Error: Duplicate todo ID '{id}' found"));
        }

        items.push(TodoItem {
            id,
            content: content.to_string(),
            status,
        });
    }
    Ok(items)
}

/// Render the list with progress and the single-in-progress advisory
pub(crate) fn render_todos(items: &[TodoItem]) -> String {
    let mut output = String::from("📝 Todo List (execute in order):\n\n");
    for (i, item) in items.iter().enumerate() {
        let _ = writeln!(output, "{}. {} {}", i + 1, item.status.marker(), item.content);
    }

    let completed = items.iter().filter(|t| t.status == TodoStatus::Completed).count();
    let _ = write!(output, "\nProgress: {completed}/{} completed", items.len());

    let in_progress = items.iter().filter(|t| t.status == TodoStatus::InProgress).count();
    if in_progress > 1 {
        let _ = write!(
            output,
            "\n⚠️  Warning: {in_progress} tasks are marked as in_progress. Ideally only ONE task should be in_progress at a time."
        );
    }
    output
}

/// Tool that validates and renders the session's task list
pub struct TodoWriteTool {
    definition: ToolDefinition,
}

impl TodoWriteTool {
    /// Create a new todowrite tool
    #[must_use]
    pub fn new() -> Self {
        let definition = ToolDefinition::new(
            ToolKind::TodoWrite,
            "Create and update a structured task list for the current session. Send the \
             complete list every time. Use it for tasks with three or more steps. Mark a task \
             in_progress before starting it and completed right after finishing it; keep only \
             one task in_progress at a time.",
        )
        .with_parameters(serde_json::json!({
            "type": "object",
            "properties": {
                "todos": {
                    "type": "array",
                    "description": "The updated todo list",
                    "items": {
                        "type": "object",
                        "properties": {
                            "id": {"type": "string", "description": "Unique identifier"},
                            "content": {"type": "string", "description": "Task description"},
                            "status": {
                                "type": "string",
                                "enum": ["pending", "in_progress", "completed"]
                            }
                        },
                        "required": ["id", "content", "status"]
                    }
                }
            },
            "required": ["todos"]
        }));

        Self { definition }
    }
}

impl Default for TodoWriteTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Tool for TodoWriteTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    // Item problems are reported with their 1-based position, so the schema
    // walk is skipped in favour of `parse_todos`.
    fn validate_input(&self, input: &serde_json::Value) -> Result<()> {
        if input.get("todos").is_some_and(serde_json::Value::is_array) {
            Ok(())
        } else {
            Err(Error::InvalidInput("Missing 'todos' array".to_string()))
        }
    }

    async fn execute(&self, input: serde_json::Value) -> Result<ToolResult> {
        let start = Instant::now();
        let elapsed = || u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        let todos = input
            .get("todos")
            .ok_or_else(|| Error::InvalidInput("Missing 'todos' parameter".to_string()))?;

        Ok(match parse_todos(todos) {
            Ok(items) => ToolResult::success(render_todos(&items), elapsed()),
            Err(message) => ToolResult::failure(message, elapsed()),
        })
    }
}
