//! Orchestrator core structure
//!
//! Contains the main `Orchestrator` struct and its builder methods.

use crate::approval::{ApprovalGate, SharedApprovalGate};
use crate::dispatcher::Dispatcher;
use crate::events::{EventBus, TurnEvent};
use copert_llm::LlmProvider;
use copert_tools::{ToolRegistry, ToolRunner};
use std::sync::Arc;

use super::config::OrchestratorConfig;

/// Runs turns of one agent against a provider and a tool registry
pub struct Orchestrator {
    pub(crate) provider: Arc<dyn LlmProvider>,
    pub(crate) runner: ToolRunner,
    pub(crate) approval: SharedApprovalGate,
    pub(crate) system_prompt: Option<String>,
    pub(crate) event_bus: Option<Arc<EventBus>>,
    pub(crate) config: OrchestratorConfig,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("provider", &self.provider.name())
            .field("tools", &self.runner.registry().names())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Orchestrator {
    /// Create a new orchestrator
    ///
    /// Until [`with_approval`](Self::with_approval) is called, destructive
    /// calls are refused.
    #[must_use]
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        tools: Arc<ToolRegistry>,
        config: OrchestratorConfig,
    ) -> Self {
        let runner = ToolRunner::new(tools, config.runner_config.clone());
        Self {
            provider,
            runner,
            approval: Arc::new(ApprovalGate::headless()),
            system_prompt: None,
            event_bus: None,
            config,
        }
    }

    /// Set the system prompt placed at the front of every conversation
    #[must_use]
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Set the approval gate for destructive tool calls
    #[must_use]
    pub fn with_approval(mut self, gate: SharedApprovalGate) -> Self {
        self.approval = gate;
        self
    }

    /// Replace the configuration
    #[must_use]
    pub fn with_config(mut self, config: OrchestratorConfig) -> Self {
        self.runner = ToolRunner::new(
            Arc::new(self.runner.registry().clone()),
            config.runner_config.clone(),
        );
        self.config = config;
        self
    }

    /// Set the event bus for turn and tool activity
    #[must_use]
    pub fn with_event_bus(mut self, bus: Arc<EventBus>) -> Self {
        self.event_bus = Some(bus);
        self
    }

    /// Get the configuration
    #[must_use]
    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Get the approval gate
    #[must_use]
    pub fn approval(&self) -> &SharedApprovalGate {
        &self.approval
    }

    /// Get the tool registry this agent sees
    #[must_use]
    pub fn registry(&self) -> &ToolRegistry {
        self.runner.registry()
    }

    /// Get the system prompt
    #[must_use]
    pub fn system_prompt(&self) -> Option<&str> {
        self.system_prompt.as_deref()
    }

    pub(crate) fn dispatcher(&self) -> Dispatcher {
        let dispatcher = Dispatcher::new(self.runner.clone(), Arc::clone(&self.approval));
        match &self.event_bus {
            Some(bus) => dispatcher.with_event_bus(Arc::clone(bus)),
            None => dispatcher,
        }
    }

    pub(crate) fn emit(&self, event: TurnEvent) {
        if let Some(bus) = &self.event_bus {
            bus.publish(event);
        }
    }
}
