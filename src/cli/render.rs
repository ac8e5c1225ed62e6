//! Text rendering for the REPL

use copert_core::{ConversationState, SubAgentClass, TurnEvent, TurnOutcome, TurnStatus};
use copert_llm::{util::truncate_chars, MessageRole};
use serde_json::Value;
use std::fmt::Write as _;

/// Argument values longer than this are cut in tool echoes
const ARG_PREVIEW_CHARS: usize = 100;
/// Assistant lines in `/history` are cut at this many characters
const HISTORY_PREVIEW_CHARS: usize = 500;

pub const HELP: &str = "\
Available commands:
  /help                  Show this help
  /clear                 Start a new conversation
  /history               Show the conversation so far
  /list-agents           List sub-agent types
  /stats                 Show approval statistics
  /init                  Generate COPERT.md for this project
  /auto-approve on|off   Toggle approval of destructive tools
  /exit, /quit           Leave Copert

Press Ctrl+C during a turn to interrupt it.";

/// Banner shown when the REPL starts
pub fn welcome(model: &str, has_context: bool) -> String {
    let mut out = format!(
        "\n🤖 Copert v{}\nModel: {model}\n",
        env!("CARGO_PKG_VERSION")
    );
    if has_context {
        out.push_str("📄 Loaded project context from COPERT.md\n");
    }
    out.push_str("Type /help for commands.\n");
    out
}

/// Lines to print for one event, if any
pub fn event(event: &TurnEvent) -> Option<String> {
    match event {
        TurnEvent::ToolStarted {
            tool_name, input, ..
        } => tool_started(tool_name, input),
        TurnEvent::ToolCompleted {
            tool_name, success, ..
        } => Some(tool_completed(tool_name, *success)),
        TurnEvent::DelegationStarted {
            subagent_type,
            description,
        } => Some(format!(
            "\n🤖 Delegating to {subagent_type} sub-agent: {description}"
        )),
        _ => None,
    }
}

fn tool_started(name: &str, input: &Value) -> Option<String> {
    match name {
        // announced by DelegationStarted
        "task" => None,
        "todowrite" => Some(todo_list(input).unwrap_or_else(|| generic_tool(name, input))),
        _ => Some(generic_tool(name, input)),
    }
}

fn generic_tool(name: &str, input: &Value) -> String {
    let mut out = format!("\n🔧 Using tool: {name}");
    if let Some(args) = input.as_object() {
        for (key, value) in args {
            let text = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            let preview = truncate_chars(&text, ARG_PREVIEW_CHARS);
            let ellipsis = if preview.len() < text.len() { "..." } else { "" };
            let _ = write!(out, "\n   {key}: {preview}{ellipsis}");
        }
    }
    out
}

fn todo_list(input: &Value) -> Option<String> {
    let todos = input.get("todos")?.as_array()?;
    let mut out = String::from("\n📋 Task List:\n");
    for (i, todo) in todos.iter().enumerate() {
        let content = todo.get("content").and_then(Value::as_str).unwrap_or("");
        let marker = match todo.get("status").and_then(Value::as_str) {
            Some("in_progress") => "🔄",
            Some("completed") => "✅",
            _ => "⏳",
        };
        let _ = write!(out, "\n   {marker} {}. {content}", i + 1);
    }
    Some(out)
}

fn tool_completed(name: &str, success: bool) -> String {
    if success {
        format!("   ✓ {name} completed")
    } else {
        format!("   ✗ {name} failed")
    }
}

/// Final text of a turn
pub fn reply(outcome: &TurnOutcome) -> String {
    match (outcome.status, outcome.reply.as_deref()) {
        (TurnStatus::Cancelled, _) => "\n⚠️  Interrupted. The conversation is kept.".to_string(),
        (TurnStatus::Completed, Some(text)) if !text.trim().is_empty() => {
            format!("\nCopert: {text}\n")
        }
        (TurnStatus::Completed, _) => "\nCopert: (no response)\n".to_string(),
    }
}

/// `/history` listing of user and assistant messages
pub fn history(conversation: &ConversationState) -> String {
    let mut out = String::new();
    for (i, message) in conversation
        .messages()
        .iter()
        .filter(|m| m.role != MessageRole::System)
        .enumerate()
    {
        let n = i + 1;
        match message.role {
            MessageRole::User => {
                let _ = writeln!(out, "{n}. You: {}", message.content);
            }
            MessageRole::Assistant if message.content.is_empty() => {
                let _ = writeln!(out, "{n}. Copert: [Tool calls only]");
            }
            MessageRole::Assistant => {
                let preview = truncate_chars(&message.content, HISTORY_PREVIEW_CHARS);
                let ellipsis = if preview.len() < message.content.len() {
                    "..."
                } else {
                    ""
                };
                let _ = writeln!(out, "{n}. Copert: {preview}{ellipsis}");
            }
            _ => {}
        }
    }
    if out.is_empty() {
        out.push_str("No messages yet.\n");
    }
    out
}

/// `/list-agents` output
pub fn agents() -> String {
    let mut out = String::from("Available sub-agents:\n");
    for class in SubAgentClass::ALL {
        let tools = class
            .tools()
            .iter()
            .map(|kind| kind.name())
            .collect::<Vec<_>>()
            .join(", ");
        let _ = write!(out, "\n  {class}\n    {}\n    Tools: {tools}\n", class.summary());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use copert_llm::{Message, ToolCall};
    use serde_json::json;
    use uuid::Uuid;

    fn started(name: &str, input: Value) -> TurnEvent {
        TurnEvent::ToolStarted {
            turn_id: Uuid::new_v4(),
            tool_call_id: "c1".to_string(),
            tool_name: name.to_string(),
            input,
        }
    }

    #[test]
    fn test_generic_tool_echo() {
        let long = "x".repeat(150);
        let text = event(&started(
            "write_file",
            json!({"file_path": "a.txt", "content": long}),
        ))
        .unwrap();

        assert!(text.starts_with("\n🔧 Using tool: write_file"));
        assert!(text.contains("\n   file_path: a.txt"));
        assert!(text.contains(&format!("\n   content: {}...", "x".repeat(100))));
    }

    #[test]
    fn test_todo_list_echo() {
        let text = event(&started(
            "todowrite",
            json!({"todos": [
                {"id": "1", "content": "Read code", "status": "completed"},
                {"id": "2", "content": "Fix bug", "status": "in_progress"},
                {"id": "3", "content": "Run tests", "status": "pending"}
            ]}),
        ))
        .unwrap();

        assert_eq!(
            text,
            "\n📋 Task List:\n\n   ✅ 1. Read code\n   🔄 2. Fix bug\n   ⏳ 3. Run tests"
        );
    }

    #[test]
    fn test_delegation_replaces_task_echo() {
        assert!(event(&started("task", json!({"description": "x"}))).is_none());

        let text = event(&TurnEvent::DelegationStarted {
            subagent_type: "code-writer".to_string(),
            description: "Add tests".to_string(),
        })
        .unwrap();
        assert_eq!(text, "\n🤖 Delegating to code-writer sub-agent: Add tests");
    }

    #[test]
    fn test_completion_marks() {
        let done = |success| TurnEvent::ToolCompleted {
            turn_id: Uuid::new_v4(),
            tool_call_id: "c1".to_string(),
            tool_name: "ls".to_string(),
            success,
            duration_ms: 3,
        };
        assert_eq!(event(&done(true)).unwrap(), "   ✓ ls completed");
        assert_eq!(event(&done(false)).unwrap(), "   ✗ ls failed");
    }

    #[test]
    fn test_history_listing() {
        let mut conversation = ConversationState::new();
        conversation.ensure_system("system");
        conversation.push(Message::user("hi"));
        conversation.push(Message::assistant_with_tool_calls(
            "",
            vec![ToolCall::new("c1", "ls", "{}")],
        ));
        conversation.push(Message::tool_response("c1", "ls", "a.txt"));
        conversation.push(Message::assistant("y".repeat(600)));

        let text = history(&conversation);
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(lines[0], "1. You: hi");
        assert_eq!(lines[1], "2. Copert: [Tool calls only]");
        assert_eq!(lines[2], format!("4. Copert: {}...", "y".repeat(500)));
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_empty_history() {
        assert_eq!(history(&ConversationState::new()), "No messages yet.\n");
    }

    #[test]
    fn test_agents_listing() {
        let text = agents();
        assert!(text.contains("general-purpose"));
        assert!(text.contains("code-writer"));
        assert!(text.contains("project-init"));
        assert!(text
            .lines()
            .filter(|l| l.trim_start().starts_with("Tools:"))
            .all(|l| !l.contains("task") && !l.contains(" init")));
    }
}
