use super::cache::TtlCache;
use super::html::html_to_text;
use crate::error::{Error, Result};
use crate::registry::{Tool, ToolDefinition, ToolKind, ToolResult};
use copert_llm::{CompletionRequest, LlmProvider, Message, ToolCompletionRequest};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use url::Url;

/// HTTP request timeout in seconds
const FETCH_TIMEOUT_SECS: u64 = 30;

/// Page text beyond this many characters is cut before summarizing
const MAX_CONTENT_CHARS: usize = 50_000;

/// Default cache lifetime (15 minutes)
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(15 * 60);

const USER_AGENT: &str = "Mozilla/5.0 (compatible; CopertBot/1.0; +https://github.com/copert/copert-cli)";

const SUMMARY_SYSTEM_PROMPT: &str =
    "You are a helpful assistant that extracts and summarizes information from web content.";

/// Model used to answer the prompt against the page
#[derive(Clone)]
pub struct Summarizer {
    /// Provider to call
    pub provider: Arc<dyn LlmProvider>,
    /// Model name, empty for the provider default
    pub model: String,
}

impl std::fmt::Debug for Summarizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Summarizer")
            .field("provider", &self.provider.name())
            .field("model", &self.model)
            .finish()
    }
}

/// What a fetch produced
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Fetched {
    /// Page text, possibly truncated
    Text(String),
    /// The request ended on another host; carries the message for the model
    Redirect(String),
}

/// Message returned when a fetch ends on a different host
pub(crate) fn redirect_message(from: &Url, to: &Url) -> Option<String> {
    let (from_host, to_host) = (from.host_str()?, to.host_str()?);
    if from_host == to_host {
        return None;
    }
    Some(format!(
        "Redirect detected: URL redirected from {from_host} to {to_host}. New URL: {to}\n\n\
         Please make a new WebFetch request with the redirect URL to fetch the content."
    ))
}

/// Cut page text that would overflow the summarizer
pub(crate) fn truncate_content(text: String) -> String {
    if text.chars().count() <= MAX_CONTENT_CHARS {
        return text;
    }
    format!(
        "{}\n\n[Content truncated due to length...]",
        copert_llm::util::truncate_chars(&text, MAX_CONTENT_CHARS)
    )
}

/// Fetch a page, reduce it to text and answer a prompt about it
pub struct WebFetchTool {
    definition: ToolDefinition,
    client: reqwest::Client,
    cache: TtlCache,
    summarizer: Option<Summarizer>,
}

/// Validate and normalize a fetch URL, upgrading `http` to `https`
pub(crate) fn normalize_url(raw: &str) -> std::result::Result<Url, String> {
    let invalid = || {
        format!("Error: Invalid URL format. URL must start with http:// or https://. Got: {raw}")
    };
    let mut url = Url::parse(raw.trim()).map_err(|_| invalid())?;
    match url.scheme() {
        "https" => {}
        "http" => url.set_scheme("https").map_err(|()| invalid())?,
        _ => return Err(invalid()),
    }
    if url.host_str().is_none() {
        return Err(invalid());
    }
    Ok(url)
}

impl WebFetchTool {
    /// Create a new fetch tool
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(cache_ttl: Duration, summarizer: Option<Summarizer>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| Error::Network(format!("Failed to create HTTP client: {e}")))?;

        let definition = ToolDefinition::new(
            ToolKind::WebFetch,
            "Fetch content from a URL and answer a prompt about it. HTML is converted to text \
             and processed with a small model. HTTP URLs are upgraded to HTTPS. When a URL \
             redirects to a different host, the redirect URL is returned instead; fetch it \
             with a new request. Results are cached for 15 minutes.",
        )
        .with_parameters(serde_json::json!({
            "type": "object",
            "properties": {
                "url": {
                    "type": "string",
                    "description": "The URL to fetch content from"
                },
                "prompt": {
                    "type": "string",
                    "description": "What information to extract from the page"
                }
            },
            "required": ["url", "prompt"]
        }))
        .with_timeout(super::WEB_TOOL_TIMEOUT);

        Ok(Self {
            definition,
            client,
            cache: TtlCache::new(cache_ttl),
            summarizer,
        })
    }

    /// The answer cache
    #[must_use]
    pub fn cache(&self) -> &TtlCache {
        &self.cache
    }

    /// Fetch `url` and reduce it to text, or explain why not
    async fn fetch_text(&self, url: &Url) -> std::result::Result<Fetched, String> {
        let response = self.client.get(url.clone()).send().await.map_err(|e| {
            if e.is_timeout() {
                format!("Error: Request timed out after {FETCH_TIMEOUT_SECS} seconds for URL: {url}")
            } else if e.is_connect() {
                format!("Error: Failed to connect to URL: {url}")
            } else {
                format!("Error fetching URL: {e}")
            }
        })?;

        if let Some(message) = redirect_message(url, response.url()) {
            info!(from = %url, to = %response.url(), "Cross-host redirect");
            return Ok(Fetched::Redirect(message));
        }

        let status = response.status();
        if !status.is_success() {
            return Err(format!("Error: HTTP error {} for URL: {url}", status.as_u16()));
        }

        let is_html = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_none_or(|ct| ct.contains("html"));
        let body = response
            .text()
            .await
            .map_err(|e| format!("Error fetching URL: {e}"))?;

        let text = if is_html { html_to_text(&body) } else { body };
        Ok(Fetched::Text(truncate_content(text)))
    }

    /// Answer `prompt` against `content`, or return the content as-is
    async fn answer(
        &self,
        url: &Url,
        content: &str,
        prompt: &str,
    ) -> std::result::Result<String, String> {
        let Some(summarizer) = &self.summarizer else {
            return Ok(format!("Content from {url}:\n\n{content}"));
        };

        let request = ToolCompletionRequest::new(
            CompletionRequest::new(summarizer.model.clone())
                .with_messages(vec![
                    Message::system(SUMMARY_SYSTEM_PROMPT),
                    Message::user(format!(
                        "Here is the content from {url}:\n\n{content}\n\nTask: {prompt}"
                    )),
                ])
                .with_temperature(0.1),
            Vec::new(),
        );

        let response = summarizer
            .provider
            .complete_with_tools(request)
            .await
            .map_err(|e| format!("Error processing content with LLM: {e}"))?;
        Ok(response.content.unwrap_or_default())
    }
}

#[async_trait::async_trait]
impl Tool for WebFetchTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, input: serde_json::Value) -> Result<ToolResult> {
        let start = Instant::now();
        let elapsed = || u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        let raw_url = input
            .get("url")
            .and_then(|v| v.as_str())
            .ok_or_else(|| Error::InvalidInput("Missing 'url' parameter".to_string()))?;
        let prompt = input
            .get("prompt")
            .and_then(|v| v.as_str())
            .ok_or_else(|| Error::InvalidInput("Missing 'prompt' parameter".to_string()))?;

        let url = match normalize_url(raw_url) {
            Ok(url) => url,
            Err(message) => return Ok(ToolResult::failure(message, elapsed())),
        };

        let key = TtlCache::key(url.as_str(), prompt);
        if let Some(cached) = self.cache.get(&key) {
            debug!(url = %url, "Serving cached answer");
            return Ok(ToolResult::success(format!("[Cached] {cached}"), elapsed()));
        }

        debug!(url = %url, "Fetching");
        let content = match self.fetch_text(&url).await {
            Ok(Fetched::Text(content)) => content,
            Ok(Fetched::Redirect(message)) => return Ok(ToolResult::success(message, elapsed())),
            Err(message) => {
                warn!(url = %url, error = %message, "Fetch failed");
                return Ok(ToolResult::failure(message, elapsed()));
            }
        };

        match self.answer(&url, &content, prompt).await {
            Ok(answer) => {
                self.cache.insert(key, answer.clone());
                Ok(ToolResult::success(answer, elapsed()))
            }
            Err(message) => Ok(ToolResult::failure(message, elapsed())),
        }
    }
}
