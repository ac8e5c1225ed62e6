//! Mock LLM Provider for testing
//!
//! Returns scripted responses in FIFO order and records every request it
//! receives so tests can assert on call counts and offered tools.

use crate::completion::{ToolCompletionRequest, ToolCompletionResponse};
use crate::error::{Error, Result};
use crate::provider::LlmProvider;

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// A mock LLM provider that returns queued responses
///
/// Once the queue drains, the repeating response (if set) is returned forever;
/// otherwise a plain `"mock response"` text reply ends the turn.
#[derive(Default)]
pub struct MockProvider {
    responses: Arc<Mutex<VecDeque<Result<ToolCompletionResponse>>>>,
    repeating: Option<ToolCompletionResponse>,
    requests: Arc<Mutex<Vec<ToolCompletionRequest>>>,
}

impl MockProvider {
    /// Create a new mock provider
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a provider that answers every request with `response`
    #[must_use]
    pub fn repeating(response: ToolCompletionResponse) -> Self {
        Self {
            repeating: Some(response),
            ..Self::default()
        }
    }

    /// Add a response to the queue
    pub fn add_tool_response(&self, response: ToolCompletionResponse) {
        self.responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(Ok(response));
    }

    /// Queue an error (e.g. to simulate the endpoint being down)
    pub fn add_error(&self, error: Error) {
        self.responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(Err(error));
    }

    /// Number of completion requests received so far
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Snapshot of every request received so far
    #[must_use]
    pub fn requests(&self) -> Vec<ToolCompletionRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait::async_trait]
impl LlmProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn default_model(&self) -> &str {
        "mock-model"
    }

    async fn complete_with_tools(
        &self,
        request: ToolCompletionRequest,
    ) -> Result<ToolCompletionResponse> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request);

        let queued = self
            .responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();

        match (queued, &self.repeating) {
            (Some(resp), _) => resp,
            (None, Some(repeat)) => Ok(repeat.clone()),
            (None, None) => Ok(ToolCompletionResponse::text("mock response")),
        }
    }
}
