use super::*;
use crate::conversation::ConversationState;
use crate::error::Error;
use copert_llm::{MessageRole, MockProvider, ToolCall, ToolCompletionResponse};
use copert_tools::{Tool, ToolDefinition, ToolKind, ToolRegistry, ToolResult};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

struct ListTool {
    definition: ToolDefinition,
}

#[async_trait::async_trait]
impl Tool for ListTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, _input: serde_json::Value) -> copert_tools::Result<ToolResult> {
        Ok(ToolResult::success("Cargo.toml\nsrc/", 0))
    }
}

fn registry() -> Arc<ToolRegistry> {
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(ListTool {
        definition: ToolDefinition::new(ToolKind::Ls, "list"),
    }));
    Arc::new(registry)
}

fn ls_call(id: &str) -> ToolCompletionResponse {
    ToolCompletionResponse::tool_calls(vec![ToolCall::new(id, "ls", "{}")])
}

#[tokio::test]
async fn test_text_reply_ends_turn() {
    let provider = Arc::new(MockProvider::new());
    provider.add_tool_response(ToolCompletionResponse::text("Hello!"));
    let orchestrator = Orchestrator::new(provider.clone(), registry(), OrchestratorConfig::new())
        .with_system_prompt("You are Copert.");

    let mut conversation = ConversationState::new();
    let outcome = orchestrator
        .run_turn(&mut conversation, "hi", &CancellationToken::new())
        .await
        .unwrap();

    assert!(outcome.is_completed());
    assert_eq!(outcome.reply.as_deref(), Some("Hello!"));
    assert_eq!(outcome.round_trips, 1);
    let roles: Vec<_> = conversation.messages().iter().map(|m| m.role).collect();
    assert_eq!(
        roles,
        [MessageRole::System, MessageRole::User, MessageRole::Assistant]
    );
}

#[tokio::test]
async fn test_tool_round_trip() {
    let provider = Arc::new(MockProvider::new());
    provider.add_tool_response(ls_call("c1"));
    provider.add_tool_response(ToolCompletionResponse::text("Two entries."));
    let orchestrator = Orchestrator::new(provider.clone(), registry(), OrchestratorConfig::new());

    let mut conversation = ConversationState::new();
    let outcome = orchestrator
        .run_turn(&mut conversation, "what is here?", &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(outcome.round_trips, 2);
    assert_eq!(outcome.tool_calls.len(), 1);
    assert!(outcome.tool_calls[0].success);

    let second = &provider.requests()[1];
    let tool_message = second.request.messages.last().unwrap();
    assert_eq!(tool_message.role, MessageRole::Tool);
    assert_eq!(tool_message.tool_call_id.as_deref(), Some("c1"));
    assert_eq!(second.tool_names(), ["ls"]);
}

#[tokio::test]
async fn test_ceiling_is_exact() {
    let provider = Arc::new(MockProvider::repeating(ls_call("loop")));
    let orchestrator = Orchestrator::new(
        provider.clone(),
        registry(),
        OrchestratorConfig::new().with_max_iterations(3),
    );

    let mut conversation = ConversationState::new();
    let err = orchestrator
        .run_turn(&mut conversation, "go", &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::CeilingExceeded { limit: 3 }));
    assert_eq!(provider.call_count(), 3);
    assert!(conversation.pending_tool_calls().is_empty());
}

#[tokio::test]
async fn test_provider_error_propagates_and_keeps_history() {
    let provider = Arc::new(MockProvider::new());
    provider.add_error(copert_llm::Error::Network("connection refused".to_string()));
    let orchestrator = Orchestrator::new(provider, registry(), OrchestratorConfig::new());

    let mut conversation = ConversationState::new();
    let err = orchestrator
        .run_turn(&mut conversation, "hi", &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Llm(_)));
    assert_eq!(conversation.len(), 1);
}

#[tokio::test]
async fn test_cancelled_before_model_call() {
    let provider = Arc::new(MockProvider::new());
    let orchestrator = Orchestrator::new(provider.clone(), registry(), OrchestratorConfig::new());
    let cancel = CancellationToken::new();
    cancel.cancel();

    let mut conversation = ConversationState::new();
    let outcome = orchestrator
        .run_turn(&mut conversation, "hi", &cancel)
        .await
        .unwrap();

    assert_eq!(outcome.status, TurnStatus::Cancelled);
    assert!(outcome.reply.is_none());
    assert_eq!(provider.call_count(), 0);
    assert_eq!(conversation.len(), 1);
}

#[tokio::test]
async fn test_system_prompt_inserted_once_across_turns() {
    let provider = Arc::new(MockProvider::new());
    let orchestrator = Orchestrator::new(provider.clone(), registry(), OrchestratorConfig::new())
        .with_system_prompt("system");

    let mut conversation = ConversationState::new();
    for text in ["one", "two"] {
        orchestrator
            .run_turn(&mut conversation, text, &CancellationToken::new())
            .await
            .unwrap();
    }

    let systems = conversation
        .messages()
        .iter()
        .filter(|m| m.role == MessageRole::System)
        .count();
    assert_eq!(systems, 1);
    assert_eq!(conversation.len(), 5);
}

#[tokio::test]
async fn test_request_uses_config() {
    let provider = Arc::new(MockProvider::new());
    let config = OrchestratorConfig::new()
        .with_model("gpt-4o")
        .with_temperature(0.1)
        .with_max_tokens(4096);
    let orchestrator = Orchestrator::new(provider.clone(), registry(), config);

    orchestrator
        .run_turn(&mut ConversationState::new(), "hi", &CancellationToken::new())
        .await
        .unwrap();

    let request = &provider.requests()[0].request;
    assert_eq!(request.model, "gpt-4o");
    assert_eq!(request.temperature, Some(0.1));
    assert_eq!(request.max_tokens, Some(4096));
}

#[test]
fn test_config_defaults() {
    let config = OrchestratorConfig::default();
    assert_eq!(config.max_iterations, DEFAULT_MAX_ITERATIONS);
    assert!(config.model.is_empty());
}
