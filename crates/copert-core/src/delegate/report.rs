//! Outcome of one sub-agent run

use copert_tools::ToolResult;

/// What a sub-agent run handed back
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubAgentReport {
    /// The sub-agent finished; its final text
    Completed(String),
    /// The run did not produce a report; the text says why
    Failed(String),
}

impl SubAgentReport {
    /// Whether the sub-agent finished
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    /// The report or failure text
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Completed(text) | Self::Failed(text) => text,
        }
    }

    /// Tool result carrying the report back to the calling agent
    #[must_use]
    pub fn into_tool_result(self, duration_ms: u64) -> ToolResult {
        match self {
            Self::Completed(text) => ToolResult::success(text, duration_ms),
            Self::Failed(text) => ToolResult::failure(text, duration_ms),
        }
    }
}

impl std::fmt::Display for SubAgentReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.text())
    }
}
