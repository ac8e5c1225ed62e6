//! Error types for copert-core
//!
//! This module provides error types and user-friendly error formatting.

use thiserror::Error;

/// Core error type
#[derive(Debug, Error)]
pub enum Error {
    /// A turn used every model round-trip it was allowed
    #[error("iteration ceiling of {limit} model round-trips exceeded")]
    CeilingExceeded {
        /// The configured ceiling
        limit: usize,
    },

    /// LLM provider error
    #[error("llm error: {0}")]
    Llm(#[from] copert_llm::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Trait for user-friendly error messages
pub trait UserFriendlyError {
    /// Get a user-friendly error message
    fn user_message(&self) -> String;

    /// Get a suggestion for how to fix the error
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for Error {
    fn user_message(&self) -> String {
        match self {
            Error::CeilingExceeded { limit } => {
                format!("🔁 Stopped after {limit} model round-trips without finishing.")
            }
            Error::Llm(copert_llm::Error::NotConfigured(msg)) => {
                format!("🔑 Model provider is not configured: {msg}")
            }
            Error::Llm(e) => format!("🤖 Model error: {e}"),
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            Error::CeilingExceeded { .. } => Some(
                "💡 Ask for a narrower task, or raise agent.max_iterations (--max-iterations)."
                    .to_string(),
            ),
            Error::Llm(copert_llm::Error::NotConfigured(_)) => Some(
                "💡 Set OPENAI_API_KEY (or the variable named by llm.api_key_env) in .env."
                    .to_string(),
            ),
            Error::Llm(copert_llm::Error::RateLimit) => {
                Some("💡 Wait a moment before retrying, or switch models with --model.".to_string())
            }
            Error::Llm(copert_llm::Error::Network(_) | copert_llm::Error::Timeout(_)) => {
                Some("💡 Check your connection and llm.base_url.".to_string())
            }
            _ => None,
        }
    }
}

/// Format an error for display in the CLI
pub fn format_error_for_cli(error: &Error) -> String {
    let mut output = error.user_message();
    if let Some(suggestion) = error.suggestion() {
        output.push_str("\n\n");
        output.push_str(&suggestion);
    }
    output
}
