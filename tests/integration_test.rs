//! Integration tests for Copert
//!
//! These tests verify the integration between the crates:
//! - copert-llm: provider configuration and the request the model sees
//! - copert-tools: builtin registry and project context loading
//! - copert-core: main agent wiring and system prompt assembly

use copert_core::{prompts, AgentFactory, ApprovalGate, ConversationState, OrchestratorConfig};
use copert_llm::{
    LlmProvider, MockProvider, OpenAiCompatibleProvider, OpenAiConfig, ToolCompletionResponse,
};
use copert_tools::{load_context_file, register_builtins, BuiltinsConfig, ToolKind, ToolRegistry};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio_test::assert_ok;
use tokio_util::sync::CancellationToken;

fn factory(provider: Arc<MockProvider>, dir: &Path) -> Arc<AgentFactory> {
    let mut registry = ToolRegistry::new();
    register_builtins(&mut registry, &BuiltinsConfig::new(dir)).unwrap();
    Arc::new(AgentFactory::new(
        provider,
        Arc::new(registry),
        Arc::new(ApprovalGate::headless()),
        OrchestratorConfig::new().with_model("gpt-4o-mini"),
        dir,
    ))
}

// ============================================================================
// LLM Provider Integration Tests
// ============================================================================

#[test]
fn test_openai_provider_configuration() {
    let config = OpenAiConfig::new("sk-test-1234567890")
        .with_base_url("http://localhost:8080/v1")
        .with_model("local-model")
        .with_timeout(Duration::from_secs(5));
    let provider = OpenAiCompatibleProvider::new(config).unwrap();

    assert_eq!(provider.default_model(), "local-model");
    assert!(!format!("{provider:?}").contains("sk-test-1234567890"));
}

#[test]
fn test_missing_key_is_not_configured() {
    let err = OpenAiConfig::from_env("COPERT_INTEGRATION_UNSET_KEY").unwrap_err();
    assert!(matches!(err, copert_llm::Error::NotConfigured(_)));
}

// ============================================================================
// Main Agent Wiring Tests
// ============================================================================

#[tokio::test]
async fn test_model_sees_every_tool_once() {
    let dir = tempfile::tempdir().unwrap();
    let provider = Arc::new(MockProvider::new());
    provider.add_tool_response(ToolCompletionResponse::text("Hello!"));
    let agent = factory(provider.clone(), dir.path()).main_agent("system");

    assert_ok!(
        agent
            .run_turn(&mut ConversationState::new(), "hi", &CancellationToken::new())
            .await
    );

    let request = &provider.requests()[0];
    let mut offered = request.tool_names();
    offered.sort_unstable();
    let mut expected: Vec<_> = ToolKind::ALL.iter().map(|kind| kind.name()).collect();
    expected.sort_unstable();
    assert_eq!(offered, expected);
    assert_eq!(request.request.model, "gpt-4o-mini");
    for tool in &request.tools {
        assert_eq!(tool.parameters["type"], "object", "{}", tool.name);
    }
}

#[tokio::test]
async fn test_project_context_reaches_system_prompt() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("COPERT.md"), "Always run `make check`.\n").unwrap();

    let context = load_context_file(dir.path()).await;
    let system = prompts::main_system_prompt(context.as_deref());

    let provider = Arc::new(MockProvider::new());
    provider.add_tool_response(ToolCompletionResponse::text("Noted."));
    let agent = factory(provider.clone(), dir.path()).main_agent(system);
    assert_ok!(
        agent
            .run_turn(&mut ConversationState::new(), "hi", &CancellationToken::new())
            .await
    );

    let first = &provider.requests()[0].request.messages[0];
    assert!(first.content.contains("# Project Context (from COPERT.md)"));
    assert!(first.content.contains("Always run `make check`."));
}

#[tokio::test]
async fn test_empty_context_file_is_ignored() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("COPERT.md"), "  \n").unwrap();

    assert!(load_context_file(dir.path()).await.is_none());
    assert_eq!(
        prompts::main_system_prompt(None),
        prompts::MAIN_SYSTEM_PROMPT
    );
}
