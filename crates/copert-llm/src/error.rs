//! Error types for copert-llm

use thiserror::Error;

/// LLM error type
#[derive(Debug, Error)]
pub enum Error {
    /// Provider not configured (missing API key, bad base URL)
    #[error("provider not configured: {0}")]
    NotConfigured(String),

    /// The endpoint answered with a non-success status
    #[error("api error ({status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Sanitized error message
        message: String,
    },

    /// Rate limit exceeded
    #[error("rate limit exceeded")]
    RateLimit,

    /// The endpoint answered with something we could not interpret
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Network error
    #[error("network error: {0}")]
    Network(String),

    /// Timeout
    #[error("timeout after {0}ms")]
    Timeout(u64),

    /// JSON encoding/decoding failure
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Whether the failure means the model is unreachable, as opposed to a bad request
    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            Self::Network(_) | Self::Timeout(_) | Self::RateLimit | Self::NotConfigured(_)
        ) || matches!(self, Self::Api { status, .. } if *status >= 500)
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
