//! OpenAI-compatible chat completions provider
//!
//! Talks to any endpoint that implements `/chat/completions` with function
//! calling (OpenAI, and most gateways that mirror its API).

/// Provider implementation
pub mod provider;
/// Configuration and wire types
pub mod types;


pub use provider::OpenAiCompatibleProvider;
pub use types::{OpenAiConfig, DEFAULT_BASE_URL, DEFAULT_MODEL};
