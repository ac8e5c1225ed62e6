use crate::error::{Error, Result};
use crate::registry::{Tool, ToolDefinition, ToolKind, ToolResult};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Exa search endpoint
pub const EXA_SEARCH_URL: &str = "https://api.exa.ai/search";

const NUM_RESULTS: u32 = 10;
const SNIPPET_CHARS: u32 = 500;
const SNIPPET_DISPLAY_CHARS: usize = 300;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchRequest<'a> {
    query: &'a str,
    num_results: u32,
    use_autoprompt: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    include_domains: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    exclude_domains: Vec<String>,
    contents: SearchContents,
}

#[derive(Debug, Serialize)]
struct SearchContents {
    text: SnippetOptions,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SnippetOptions {
    max_characters: u32,
}

/// Exa search response
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SearchResponse {
    #[serde(default)]
    pub results: Vec<SearchHit>,
    #[serde(default)]
    pub autoprompt_string: Option<String>,
}

/// One search hit
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SearchHit {
    #[serde(default)]
    pub title: Option<String>,
    pub url: String,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub published_date: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
}

/// Render search hits the way the model sees them
pub(crate) fn format_results(query: &str, response: &SearchResponse) -> String {
    if response.results.is_empty() {
        return format!("No results found for query: {query}");
    }

    let mut output = format!("Search Results for: {query}\n{}\n\n", "=".repeat(80));
    for (i, hit) in response.results.iter().enumerate() {
        output.push_str(&format!(
            "{}. {}\n   URL: {}\n",
            i + 1,
            hit.title.as_deref().unwrap_or("Untitled"),
            hit.url
        ));

        if let Some(text) = hit.text.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            let snippet = copert_llm::util::truncate_chars(text, SNIPPET_DISPLAY_CHARS);
            let ellipsis = if snippet.len() < text.len() { "..." } else { "" };
            output.push_str(&format!("   {snippet}{ellipsis}\n"));
        }
        if let Some(date) = hit.published_date.as_deref().filter(|d| !d.is_empty()) {
            output.push_str(&format!("   Published: {date}\n"));
        }
        if let Some(author) = hit.author.as_deref().filter(|a| !a.is_empty()) {
            output.push_str(&format!("   Author: {author}\n"));
        }
        output.push('\n');
    }

    output.push_str(&format!("\nTotal results: {}", response.results.len()));
    if let Some(autoprompt) = response.autoprompt_string.as_deref().filter(|a| !a.is_empty()) {
        output.push_str(&format!("\n\nOptimized query used: {autoprompt}"));
    }
    output
}

fn string_list(input: &serde_json::Value, field: &str) -> Vec<String> {
    input
        .get(field)
        .and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Web search backed by the Exa API
pub struct WebSearchTool {
    definition: ToolDefinition,
    client: reqwest::Client,
    api_key: Option<String>,
    endpoint: String,
}

impl WebSearchTool {
    /// Create a new search tool; without a key every search reports a setup error
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(api_key: Option<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| Error::Network(format!("Failed to create HTTP client: {e}")))?;

        let definition = ToolDefinition::new(
            ToolKind::WebSearch,
            "Search the web and return titles, URLs and snippets. Use it for current events \
             and information beyond your training data. Results can be restricted to, or \
             exclude, specific domains.",
        )
        .with_parameters(serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query (minimum 2 characters)"
                },
                "allowed_domains": {
                    "type": "array",
                    "items": {"type": "string"},
                    "description": "Only include results from these domains"
                },
                "blocked_domains": {
                    "type": "array",
                    "items": {"type": "string"},
                    "description": "Never include results from these domains"
                }
            },
            "required": ["query"]
        }))
        .with_timeout(super::WEB_TOOL_TIMEOUT);

        Ok(Self {
            definition,
            client,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            endpoint: EXA_SEARCH_URL.to_string(),
        })
    }

    /// Point the tool at a different endpoint
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    async fn search(&self, api_key: &str, body: &SearchRequest<'_>) -> std::result::Result<SearchResponse, String> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(format!(
                "HTTP {}: {}",
                status.as_u16(),
                copert_llm::util::sanitize_api_error(&text)
            ));
        }

        response
            .json::<SearchResponse>()
            .await
            .map_err(|e| format!("invalid response: {e}"))
    }
}

#[async_trait::async_trait]
impl Tool for WebSearchTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, input: serde_json::Value) -> Result<ToolResult> {
        let start = Instant::now();
        let elapsed = || u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        let query = input
            .get("query")
            .and_then(|v| v.as_str())
            .ok_or_else(|| Error::InvalidInput("Missing 'query' parameter".to_string()))?;

        if query.chars().count() < 2 {
            return Ok(ToolResult::failure(
                "Error: Query must be at least 2 characters long",
                elapsed(),
            ));
        }

        let Some(api_key) = self.api_key.as_deref() else {
            return Ok(ToolResult::failure(
                "Error: Web search is not configured. Make sure EXA_API_KEY is set in .env",
                elapsed(),
            ));
        };

        let body = SearchRequest {
            query,
            num_results: NUM_RESULTS,
            use_autoprompt: true,
            include_domains: string_list(&input, "allowed_domains"),
            exclude_domains: string_list(&input, "blocked_domains"),
            contents: SearchContents {
                text: SnippetOptions {
                    max_characters: SNIPPET_CHARS,
                },
            },
        };

        debug!(query = %query, "Searching the web");
        match self.search(api_key, &body).await {
            Ok(response) => Ok(ToolResult::success(format_results(query, &response), elapsed())),
            Err(e) => {
                warn!(query = %query, error = %e, "Web search failed");
                Ok(ToolResult::failure(format!("Error performing search: {e}"), elapsed()))
            }
        }
    }
}
