//! Copert LLM - LLM Provider Abstraction
//!
//! This crate provides the model capability used by the Copert agent loop:
//! - Message: conversation message types (system, user, assistant, tool)
//! - Tools: tool definitions and tool calls for function calling
//! - Provider: the `LlmProvider` trait
//! - OpenAI: OpenAI-compatible chat completions provider
//! - Mock: scripted provider for tests

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod completion;
pub mod error;
pub mod message;
pub mod mock;
pub mod openai;
pub mod provider;
pub mod tools;
pub mod util;

pub use completion::{CompletionRequest, TokenUsage, ToolCompletionRequest, ToolCompletionResponse};
pub use error::{Error, Result};
pub use message::{Message, MessageRole};
pub use mock::MockProvider;
pub use openai::{OpenAiCompatibleProvider, OpenAiConfig};
pub use provider::LlmProvider;
pub use tools::{ToolCall, ToolChoice, ToolDefinition};
