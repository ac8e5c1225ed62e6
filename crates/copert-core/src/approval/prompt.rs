use super::types::ApprovalPreview;

/// What the user answered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptAnswer {
    /// Go ahead
    Yes,
    /// Do not run the call
    No,
    /// The prompt was interrupted (Ctrl+C, closed input)
    Interrupted,
}

/// Asks the user to accept or reject one destructive call
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ApprovalPrompt: Send + Sync {
    /// Show `preview` and wait for an answer
    async fn confirm(&self, preview: &ApprovalPreview) -> PromptAnswer;
}
