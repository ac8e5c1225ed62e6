use super::fetch::{normalize_url, redirect_message, truncate_content};
use super::search::{format_results, SearchHit, SearchResponse};
use super::*;
use crate::registry::{Tool, ToolKind};
use serde_json::json;
use std::time::Duration;
use url::Url;

#[test]
fn test_fetch_definition() {
    let tool = WebFetchTool::new(DEFAULT_CACHE_TTL, None).unwrap();
    let def = tool.definition();

    assert_eq!(def.kind, ToolKind::WebFetch);
    assert!(!def.destructive);
    assert_eq!(def.timeout, Some(Duration::from_secs(60)));
    assert!(tool.cache().is_empty());
}

#[test]
fn test_normalize_url() {
    assert_eq!(
        normalize_url("http://example.com/docs").unwrap().as_str(),
        "https://example.com/docs"
    );
    assert_eq!(
        normalize_url("https://example.com").unwrap().as_str(),
        "https://example.com/"
    );

    let err = normalize_url("ftp://example.com").unwrap_err();
    assert_eq!(
        err,
        "Error: Invalid URL format. URL must start with http:// or https://. Got: ftp://example.com"
    );
    assert!(normalize_url("example.com").is_err());
}

#[test]
fn test_redirect_message_only_across_hosts() {
    let from = Url::parse("https://example.com/a").unwrap();
    let same = Url::parse("https://example.com/b").unwrap();
    let other = Url::parse("https://www.example.org/a").unwrap();

    assert!(redirect_message(&from, &same).is_none());

    let message = redirect_message(&from, &other).unwrap();
    assert!(message.starts_with(
        "Redirect detected: URL redirected from example.com to www.example.org. New URL: https://www.example.org/a"
    ));
    assert!(message.ends_with("to fetch the content."));
}

#[test]
fn test_truncate_content() {
    assert_eq!(truncate_content("short".to_string()), "short");

    let long = truncate_content("x".repeat(60_000));
    assert!(long.ends_with("\n\n[Content truncated due to length...]"));
    assert_eq!(long.chars().filter(|c| *c == 'x').count(), 50_000);
}

#[tokio::test]
async fn test_fetch_rejects_bad_url_before_network() {
    let tool = WebFetchTool::new(DEFAULT_CACHE_TTL, None).unwrap();
    let result = tool
        .execute(json!({"url": "file:///etc/passwd", "prompt": "read it"}))
        .await
        .unwrap();

    assert!(!result.success);
    assert!(result.output.starts_with("Error: Invalid URL format."));
}

#[tokio::test]
async fn test_fetch_serves_cached_answer() {
    let tool = WebFetchTool::new(DEFAULT_CACHE_TTL, None).unwrap();
    tool.cache().insert(
        TtlCache::key("https://example.com/", "summarize"),
        "A short page".to_string(),
    );

    // http is upgraded before the cache lookup
    let result = tool
        .execute(json!({"url": "http://example.com/", "prompt": "summarize"}))
        .await
        .unwrap();

    assert!(result.success);
    assert_eq!(result.output, "[Cached] A short page");
}

#[tokio::test(start_paused = true)]
async fn test_cache_entries_expire() {
    let cache = TtlCache::new(Duration::from_secs(900));
    cache.insert("k".to_string(), "v".to_string());

    tokio::time::advance(Duration::from_secs(899)).await;
    assert_eq!(cache.get("k").as_deref(), Some("v"));

    tokio::time::advance(Duration::from_secs(2)).await;
    assert!(cache.get("k").is_none());
    assert!(cache.is_empty());
}

#[test]
fn test_search_definition() {
    let tool = WebSearchTool::new(None).unwrap();
    let def = tool.definition();

    assert_eq!(def.kind, ToolKind::WebSearch);
    assert_eq!(def.parameters["required"], json!(["query"]));
    assert_eq!(def.timeout, Some(WEB_TOOL_TIMEOUT));
}

#[tokio::test]
async fn test_search_short_query() {
    let tool = WebSearchTool::new(Some("key".to_string())).unwrap();
    let result = tool.execute(json!({"query": "a"})).await.unwrap();

    assert!(!result.success);
    assert_eq!(result.output, "Error: Query must be at least 2 characters long");
}

#[tokio::test]
async fn test_search_without_key() {
    let tool = WebSearchTool::new(Some("  ".to_string())).unwrap();
    let result = tool.execute(json!({"query": "rust async"})).await.unwrap();

    assert!(!result.success);
    assert!(result.output.contains("EXA_API_KEY"));
}

#[test]
fn test_format_results() {
    let response: SearchResponse = serde_json::from_value(json!({
        "results": [
            {
                "title": "Tokio tutorial",
                "url": "https://tokio.rs/tokio/tutorial",
                "text": format!("  {}  ", "t".repeat(320)),
                "publishedDate": "2024-01-02",
                "author": "Tokio team"
            },
            {"title": null, "url": "https://example.com"}
        ],
        "autopromptString": "tokio async runtime tutorial"
    }))
    .unwrap();

    let output = format_results("tokio", &response);
    let expected_head = format!("Search Results for: tokio\n{}\n\n1. Tokio tutorial\n", "=".repeat(80));
    assert!(output.starts_with(&expected_head));
    assert!(output.contains("   URL: https://tokio.rs/tokio/tutorial\n"));
    assert!(output.contains(&format!("   {}...\n", "t".repeat(300))));
    assert!(output.contains("   Published: 2024-01-02\n   Author: Tokio team\n\n"));
    assert!(output.contains("2. Untitled\n   URL: https://example.com\n\n"));
    assert!(output.ends_with("\nTotal results: 2\n\nOptimized query used: tokio async runtime tutorial"));
}

#[test]
fn test_format_no_results() {
    let response = SearchResponse::default();
    assert_eq!(format_results("nothing", &response), "No results found for query: nothing");

    let single = SearchResponse {
        results: vec![SearchHit {
            url: "https://a.dev".to_string(),
            ..SearchHit::default()
        }],
        autoprompt_string: None,
    };
    assert!(format_results("a.dev", &single).ends_with("\nTotal results: 1"));
}
