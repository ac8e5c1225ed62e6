use super::types::{
    ChatError, ChatFunction, ChatFunctionCall, ChatMessage, ChatRequest, ChatResponse, ChatTool,
    ChatToolCall, OpenAiConfig,
};
use crate::completion::{TokenUsage, ToolCompletionRequest, ToolCompletionResponse};
use crate::error::{Error, Result};
use crate::message::{Message, MessageRole};
use crate::provider::LlmProvider;
use crate::tools::{ToolCall, ToolChoice, ToolDefinition};
use crate::util::sanitize_api_error;
use reqwest::{Client, StatusCode};
use tracing::{debug, instrument, warn};

// ============================================================================
// Provider Implementation
// ============================================================================

/// Provider for OpenAI-compatible chat completion endpoints
pub struct OpenAiCompatibleProvider {
    client: Client,
    config: OpenAiConfig,
}

impl std::fmt::Debug for OpenAiCompatibleProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiCompatibleProvider")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl OpenAiCompatibleProvider {
    /// Create a new provider
    ///
    /// # Errors
    /// Returns an error if the key is empty or the HTTP client cannot be created.
    pub fn new(config: OpenAiConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(Error::NotConfigured("API key is empty".to_string()));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Network(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    /// Provider configuration
    #[must_use]
    pub fn config(&self) -> &OpenAiConfig {
        &self.config
    }

    /// Convert our message to the wire format
    pub(crate) fn convert_message(msg: &Message) -> ChatMessage {
        let tool_calls = if msg.tool_calls.is_empty() {
            None
        } else {
            Some(msg.tool_calls.iter().map(Self::convert_tool_call).collect())
        };

        // Assistant turns that only call tools are sent with `content: null`
        let content = if tool_calls.is_some() && msg.content.is_empty() {
            None
        } else {
            Some(msg.content.clone())
        };

        ChatMessage {
            role: msg.role.as_str().to_string(),
            content,
            tool_call_id: msg.tool_call_id.clone(),
            name: if msg.role == MessageRole::Tool {
                msg.name.clone()
            } else {
                None
            },
            tool_calls,
        }
    }

    fn convert_tool_call(call: &ToolCall) -> ChatToolCall {
        ChatToolCall {
            id: call.id.clone(),
            r#type: "function".to_string(),
            function: ChatFunctionCall {
                name: call.name.clone(),
                arguments: call.arguments.clone(),
            },
        }
    }

    /// Convert tool definition to the wire format
    pub(crate) fn convert_tool(tool: &ToolDefinition) -> ChatTool {
        ChatTool {
            r#type: "function".to_string(),
            function: ChatFunction {
                name: tool.name.clone(),
                description: tool.description.clone(),
                parameters: tool.parameters.clone(),
            },
        }
    }

    fn convert_tool_choice(choice: &ToolChoice) -> String {
        match choice {
            ToolChoice::Auto => "auto",
            ToolChoice::None => "none",
            ToolChoice::Required => "required",
        }
        .to_string()
    }

    /// Build the request body
    pub(crate) fn build_request(&self, request: &ToolCompletionRequest) -> ChatRequest {
        let model = if request.request.model.is_empty() {
            self.config.default_model.clone()
        } else {
            request.request.model.clone()
        };

        let tools: Vec<ChatTool> = request.tools.iter().map(Self::convert_tool).collect();
        let tool_choice = if tools.is_empty() {
            None
        } else {
            Some(Self::convert_tool_choice(&request.tool_choice))
        };

        ChatRequest {
            model,
            messages: request
                .request
                .messages
                .iter()
                .map(Self::convert_message)
                .collect(),
            max_tokens: request.request.max_tokens,
            temperature: request.request.temperature,
            tools,
            tool_choice,
        }
    }

    /// Convert the wire response into ours
    pub(crate) fn parse_response(response: ChatResponse) -> Result<ToolCompletionResponse> {
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| Error::InvalidResponse("No choices in response".to_string()))?;

        let tool_calls: Vec<ToolCall> = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|tc| ToolCall::new(tc.id, tc.function.name, tc.function.arguments))
            .collect();

        let usage = response.usage.map(|u| TokenUsage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        });

        Ok(ToolCompletionResponse {
            content: choice.message.content.filter(|c| !c.is_empty()),
            tool_calls,
            usage,
            finish_reason: choice.finish_reason,
            model: response.model,
        })
    }

    /// Make API request
    async fn request(&self, body: &ChatRequest) -> Result<ChatResponse> {
        let url = format!("{}/chat/completions", self.config.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| self.transport_error(e))?;

        if status == StatusCode::TOO_MANY_REQUESTS {
            warn!(status = status.as_u16(), "Chat completion rate limited");
            return Err(Error::RateLimit);
        }

        if !status.is_success() {
            let message = serde_json::from_str::<ChatError>(&text)
                .map(|e| e.error.message)
                .unwrap_or(text);
            return Err(Error::Api {
                status: status.as_u16(),
                message: sanitize_api_error(&message),
            });
        }

        serde_json::from_str(&text).map_err(|e| Error::InvalidResponse(e.to_string()))
    }

    fn transport_error(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::Timeout(u64::try_from(self.config.timeout.as_millis()).unwrap_or(u64::MAX))
        } else {
            Error::Network(err.to_string())
        }
    }
}

#[async_trait::async_trait]
impl LlmProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        "openai"
    }

    fn default_model(&self) -> &str {
        &self.config.default_model
    }

    #[instrument(skip(self, request), fields(model = %request.request.model, tools = request.tools.len()))]
    async fn complete_with_tools(
        &self,
        request: ToolCompletionRequest,
    ) -> Result<ToolCompletionResponse> {
        let body = self.build_request(&request);

        debug!(messages = body.messages.len(), "Sending chat completion request");

        let response = self.request(&body).await?;
        Self::parse_response(response)
    }
}
