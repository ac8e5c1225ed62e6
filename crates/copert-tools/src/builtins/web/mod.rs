//! Web tools: page fetching with a cached answer, and web search

pub mod cache;
pub mod fetch;
pub mod html;
pub mod search;

use std::time::Duration;

/// Upper bound the runner puts on one web tool call
pub const WEB_TOOL_TIMEOUT: Duration = Duration::from_secs(60);

#[cfg(test)]
mod tests;

pub use cache::TtlCache;
pub use fetch::{Summarizer, WebFetchTool, DEFAULT_CACHE_TTL};
pub use search::WebSearchTool;
