use chrono::{DateTime, Utc};
use copert_tools::ToolKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::Write as _;

/// Lines of new file content shown before asking
const WRITE_PREVIEW_LINES: usize = 20;

/// Characters of each multi-edit fragment shown before asking
const MULTIEDIT_FRAGMENT_CHARS: usize = 200;

/// One recorded accept/reject decision
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalDecision {
    /// Tool the decision was about
    pub tool: ToolKind,
    /// Arguments as the model sent them
    pub args: serde_json::Value,
    /// Whether the call was allowed to run
    pub approved: bool,
    /// When the user answered
    pub decided_at: DateTime<Utc>,
}

impl ApprovalDecision {
    /// Record a decision made now
    #[must_use]
    pub fn new(tool: ToolKind, args: serde_json::Value, approved: bool) -> Self {
        Self {
            tool,
            args,
            approved,
            decided_at: Utc::now(),
        }
    }
}

/// Aggregate counts over the decision history
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ApprovalStats {
    /// Calls the user allowed
    pub approved: usize,
    /// Calls the user refused
    pub rejected: usize,
    /// All recorded decisions
    pub total: usize,
}

impl ApprovalStats {
    /// Count `history`
    #[must_use]
    pub fn from_history(history: &[ApprovalDecision]) -> Self {
        let approved = history.iter().filter(|d| d.approved).count();
        Self {
            approved,
            rejected: history.len() - approved,
            total: history.len(),
        }
    }
}

impl fmt::Display for ApprovalStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Approved: {}, Rejected: {}, Total: {}",
            self.approved, self.rejected, self.total
        )
    }
}

/// What the user sees before deciding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApprovalPreview {
    /// Tool being approved
    pub tool: ToolKind,
    /// Headline, e.g. "Write File Operation"
    pub title: String,
    /// Target file, when the tool has one
    pub file_path: Option<String>,
    /// Short description of the action
    pub action: String,
    /// Content or diff fragment
    pub body: String,
    /// The yes/no question
    pub question: String,
}

fn str_arg<'a>(args: &'a serde_json::Value, key: &str) -> &'a str {
    args.get(key).and_then(|v| v.as_str()).unwrap_or_default()
}

fn diff_block(out: &mut String, old: &str, new: &str) {
    for line in old.lines() {
        let _ = writeln!(out, "- {line}");
    }
    for line in new.lines() {
        let _ = writeln!(out, "+ {line}");
    }
}

fn clip(text: &str) -> String {
    let cut = copert_llm::util::truncate_chars(text, MULTIEDIT_FRAGMENT_CHARS);
    if cut.len() < text.len() {
        format!("{cut}\n...")
    } else {
        cut.to_string()
    }
}

impl ApprovalPreview {
    /// Build the preview for a call of `tool` with `args`
    #[must_use]
    pub fn for_call(tool: ToolKind, args: &serde_json::Value) -> Self {
        let file_path = args
            .get("file_path")
            .and_then(|v| v.as_str())
            .map(str::to_string);

        match tool {
            ToolKind::WriteFile => {
                let content = str_arg(args, "content");
                let lines: Vec<&str> = content.split('\n').collect();
                let mut body = String::from("Content Preview:\n");
                for (i, line) in lines.iter().take(WRITE_PREVIEW_LINES).enumerate() {
                    let _ = writeln!(body, "{:4} | {line}", i + 1);
                }
                if lines.len() > WRITE_PREVIEW_LINES {
                    let _ = writeln!(body, "... ({} more lines)", lines.len() - WRITE_PREVIEW_LINES);
                }
                Self {
                    tool,
                    title: "Write File Operation".to_string(),
                    file_path,
                    action: format!(
                        "Create/Overwrite ({} characters, {} lines)",
                        content.chars().count(),
                        lines.len()
                    ),
                    body,
                    question: "📝 Allow this file write?".to_string(),
                }
            }
            ToolKind::EditFile => {
                let replace_all = args
                    .get("replace_all")
                    .and_then(serde_json::Value::as_bool)
                    .unwrap_or(false);
                let mut body = String::from("Changes:\n");
                diff_block(&mut body, str_arg(args, "old_string"), str_arg(args, "new_string"));
                Self {
                    tool,
                    title: "Edit File Operation".to_string(),
                    file_path,
                    action: if replace_all { "Replace All" } else { "Replace Once" }.to_string(),
                    body,
                    question: "✏️  Allow this file edit?".to_string(),
                }
            }
            ToolKind::MultiEdit => {
                let edits = args
                    .get("edits")
                    .and_then(|v| v.as_array())
                    .map(Vec::as_slice)
                    .unwrap_or_default();
                let mut body = String::from("Edits to Apply:\n");
                for (i, edit) in edits.iter().enumerate() {
                    let _ = writeln!(body, "\nEdit {}:", i + 1);
                    diff_block(
                        &mut body,
                        &clip(str_arg(edit, "old_string")),
                        &clip(str_arg(edit, "new_string")),
                    );
                }
                Self {
                    tool,
                    title: "Multiple Edit Operation".to_string(),
                    file_path,
                    action: format!("Apply {} edits", edits.len()),
                    body,
                    question: format!("✏️  Apply all {} edits?", edits.len()),
                }
            }
            other => Self {
                tool,
                title: format!("{other} Operation"),
                file_path,
                action: "Run".to_string(),
                body: serde_json::to_string_pretty(args).unwrap_or_default(),
                question: format!("Allow {other}?"),
            },
        }
    }
}

impl fmt::Display for ApprovalPreview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "⚠️  {}", self.title)?;
        if let Some(path) = &self.file_path {
            writeln!(f, "File: {path}")?;
        }
        writeln!(f, "Action: {}", self.action)?;
        writeln!(f)?;
        write!(f, "{}", self.body.trim_end())
    }
}
