//! LLM Provider trait definition

use crate::completion::{ToolCompletionRequest, ToolCompletionResponse};
use crate::error::Result;

/// Trait for LLM providers
///
/// The agent loop treats a provider as a black box: one request with the
/// conversation and the tool schemas in, one assistant response out. Retries,
/// if any, belong to the implementation.
#[async_trait::async_trait]
pub trait LlmProvider: Send + Sync {
    /// Get the provider name
    fn name(&self) -> &str;

    /// Get the default model
    fn default_model(&self) -> &str;

    /// Complete a conversation with tools
    async fn complete_with_tools(
        &self,
        request: ToolCompletionRequest,
    ) -> Result<ToolCompletionResponse>;
}
