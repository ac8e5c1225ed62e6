//! Session wiring: provider, tools, approval gate and agents

use super::approval::InquirePrompt;
use crate::settings::Settings;
use anyhow::{Context, Result};
use copert_core::{
    format_error_for_cli, prompts, AgentFactory, ApprovalGate, Error, EventBus, Orchestrator,
    SharedApprovalGate,
};
use copert_llm::{LlmProvider, OpenAiCompatibleProvider, OpenAiConfig};
use copert_tools::builtins::Summarizer;
use copert_tools::{load_context_file, register_builtins, BuiltinsConfig, ToolRegistry};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Everything one CLI invocation talks to
pub struct Session {
    pub agent: Orchestrator,
    pub factory: Arc<AgentFactory>,
    pub approval: SharedApprovalGate,
    pub events: Arc<EventBus>,
    pub has_context: bool,
}

impl Session {
    /// Build a session rooted at the current directory
    pub async fn build(settings: &Settings) -> Result<Self> {
        let working_dir = std::env::current_dir().context("Failed to read current directory")?;
        let provider = build_provider(settings)?;

        let builtins = BuiltinsConfig {
            working_dir: working_dir.clone(),
            exec: settings.tools.exec(),
            grep: settings.tools.grep(),
            webfetch_cache_ttl: settings.tools.webfetch_cache_ttl(),
            summarizer: Some(Summarizer {
                provider: Arc::clone(&provider),
                model: settings.llm.model.clone(),
            }),
            search_api_key: std::env::var(&settings.tools.search_api_key_env).ok(),
        };
        let mut registry = ToolRegistry::new();
        register_builtins(&mut registry, &builtins).context("Failed to register tools")?;
        debug!(tools = ?registry.names(), "Registered builtin tools");

        let approval: SharedApprovalGate = Arc::new(
            ApprovalGate::new(Arc::new(InquirePrompt))
                .with_auto_approve(settings.agent.auto_approve),
        );
        let events = Arc::new(EventBus::default());
        let factory = Arc::new(
            AgentFactory::new(
                provider,
                Arc::new(registry),
                Arc::clone(&approval),
                settings.orchestrator(),
                working_dir.clone(),
            )
            .with_event_bus(Arc::clone(&events)),
        );

        let context = load_context_file(&working_dir).await;
        if context.is_some() {
            info!(dir = %working_dir.display(), "Using COPERT.md as project context");
        }
        let agent = factory.main_agent(prompts::main_system_prompt(context.as_deref()));

        Ok(Self {
            agent,
            factory,
            approval,
            events,
            has_context: context.is_some(),
        })
    }
}

fn build_provider(settings: &Settings) -> Result<Arc<dyn LlmProvider>> {
    let config = OpenAiConfig::from_env(&settings.llm.api_key_env)
        .map_err(|e| anyhow::anyhow!(format_error_for_cli(&Error::from(e))))?
        .with_base_url(settings.llm.base_url.clone())
        .with_model(settings.llm.model.clone())
        .with_timeout(Duration::from_secs(settings.llm.timeout_secs));
    let provider =
        OpenAiCompatibleProvider::new(config).context("Failed to create the model provider")?;
    Ok(Arc::new(provider))
}
