//! Builds the main agent and its sub-agents from one set of tools

use crate::approval::SharedApprovalGate;
use crate::conversation::ConversationState;
use crate::error::Error;
use crate::events::EventBus;
use crate::orchestrator::{Orchestrator, OrchestratorConfig};
use crate::prompts::INIT_INSTRUCTION;
use copert_llm::LlmProvider;
use copert_tools::{ToolRegistry, COPERT_MD};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use super::class::SubAgentClass;
use super::init::InitTool;
use super::report::SubAgentReport;
use super::task::TaskTool;

/// Characters of the sub-agent's last message quoted when init fails
const INIT_REPLY_PREVIEW_CHARS: usize = 500;

fn ceiling_diagnostic(limit: usize) -> String {
    format!(
        "Error: Sub-agent exceeded maximum iterations ({limit} steps).\n\n\
         The task was probably too broad, or the sub-agent kept calling tools without finishing.\n\n\
         Try:\n\
         - Splitting the task into smaller, specific sub-tasks\n\
         - Naming the files or directories to search\n\
         - Limiting the scope (e.g. 'only in src/' instead of 'the whole codebase')\n\
         - Running targeted grep/glob calls yourself\n\n\
         For example:\n  \
         'Use grep to find files defining ToolRegistry, then read the top 3 results'\n\
         instead of:\n  \
         'Scan the codebase and analyze everything'"
    )
}

/// Shared ingredients of every agent in a session
///
/// The base registry holds the builtin tools; `task` and `init` are added
/// only to the main agent.
pub struct AgentFactory {
    provider: Arc<dyn LlmProvider>,
    tools: Arc<ToolRegistry>,
    approval: SharedApprovalGate,
    config: OrchestratorConfig,
    working_dir: PathBuf,
    event_bus: Option<Arc<EventBus>>,
}

impl std::fmt::Debug for AgentFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentFactory")
            .field("provider", &self.provider.name())
            .field("tools", &self.tools.names())
            .field("working_dir", &self.working_dir)
            .finish_non_exhaustive()
    }
}

impl AgentFactory {
    /// Create a factory over the builtin `tools`
    #[must_use]
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        tools: Arc<ToolRegistry>,
        approval: SharedApprovalGate,
        config: OrchestratorConfig,
        working_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            provider,
            tools,
            approval,
            config,
            working_dir: working_dir.into(),
            event_bus: None,
        }
    }

    /// Publish main-agent activity on `bus`
    #[must_use]
    pub fn with_event_bus(mut self, bus: Arc<EventBus>) -> Self {
        self.event_bus = Some(bus);
        self
    }

    /// The event bus, if any
    #[must_use]
    pub fn event_bus(&self) -> Option<&Arc<EventBus>> {
        self.event_bus.as_ref()
    }

    /// Directory `COPERT.md` lives in
    #[must_use]
    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// The approval gate shared by every agent
    #[must_use]
    pub fn approval(&self) -> &SharedApprovalGate {
        &self.approval
    }

    /// The main agent: every builtin plus `task` and `init`
    #[must_use]
    pub fn main_agent(self: &Arc<Self>, system_prompt: impl Into<String>) -> Orchestrator {
        let mut registry = (*self.tools).clone();
        registry.register(Arc::new(TaskTool::new(Arc::clone(self))));
        registry.register(Arc::new(InitTool::new(Arc::clone(self))));

        let orchestrator = Orchestrator::new(
            Arc::clone(&self.provider),
            Arc::new(registry),
            self.config.clone(),
        )
        .with_system_prompt(system_prompt)
        .with_approval(Arc::clone(&self.approval));

        match &self.event_bus {
            Some(bus) => orchestrator.with_event_bus(Arc::clone(bus)),
            None => orchestrator,
        }
    }

    /// A sub-agent restricted to the tools of `class`
    #[must_use]
    pub fn sub_agent(&self, class: SubAgentClass) -> Orchestrator {
        let registry = self.tools.subset(class.tools());
        Orchestrator::new(
            Arc::clone(&self.provider),
            Arc::new(registry),
            self.config.clone(),
        )
        .with_system_prompt(class.prompt())
        .with_approval(Arc::clone(&self.approval))
    }

    /// Run `prompt` in a fresh sub-agent of `class` and return its report
    ///
    /// Never fails outright: every problem comes back as a
    /// [`SubAgentReport::Failed`] with `Error:` text. An interrupt of the
    /// parent turn drops this future, so the nested turn never sees a
    /// cancelled token of its own.
    #[instrument(skip(self, prompt), fields(class = %class))]
    pub async fn delegate(&self, class: SubAgentClass, prompt: &str) -> SubAgentReport {
        let agent = self.sub_agent(class);
        let mut conversation = ConversationState::new();

        info!(tools = ?agent.registry().names(), "Delegating to sub-agent");
        match agent
            .run_turn(&mut conversation, prompt, &CancellationToken::new())
            .await
        {
            Ok(outcome) => match outcome
                .reply
                .or_else(|| conversation.last_assistant_text().map(str::to_string))
            {
                Some(report) => SubAgentReport::Completed(report),
                None => SubAgentReport::Failed(
                    "Error: Sub-agent did not return a final report".to_string(),
                ),
            },
            Err(Error::CeilingExceeded { limit }) => {
                warn!(limit, "Sub-agent hit the iteration ceiling");
                SubAgentReport::Failed(ceiling_diagnostic(limit))
            }
            Err(e) => {
                warn!(error = %e, "Sub-agent failed");
                SubAgentReport::Failed(format!("Error executing sub-agent: {e}"))
            }
        }
    }

    /// Run the project-init sub-agent and check that `COPERT.md` was written
    ///
    /// A run that finishes without writing the file still completes; its text
    /// carries the warning.
    #[instrument(skip(self))]
    pub async fn init_project(&self) -> SubAgentReport {
        let agent = self.sub_agent(SubAgentClass::ProjectInit);
        let mut conversation = ConversationState::new();

        if let Err(e) = agent
            .run_turn(&mut conversation, INIT_INSTRUCTION, &CancellationToken::new())
            .await
        {
            warn!(error = %e, "Project initialization failed");
            return SubAgentReport::Failed(format!("Error during project initialization: {e}"));
        }

        let path = self.working_dir.join(COPERT_MD);
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            info!(path = %path.display(), "COPERT.md created");
            return SubAgentReport::Completed(
                "✅ Successfully created COPERT.md\n\n\
                 This file will be automatically loaded as context in all future Copert \
                 sessions to provide better, project-aware assistance."
                    .to_string(),
            );
        }

        warn!(path = %path.display(), "Init finished without writing COPERT.md");
        SubAgentReport::Completed(match conversation.last_assistant_text() {
            Some(text) => format!(
                "⚠️  Init completed but COPERT.md was not found.\n\n\
                 The sub-agent may not have called write_copert_md. Please try running /init again.\n\n\
                 Sub-agent's final message:\n{}...",
                copert_llm::util::truncate_chars(text, INIT_REPLY_PREVIEW_CHARS)
            ),
            None => "⚠️  Sub-agent completed but did not return a response. \
                     Please try running /init again."
                .to_string(),
        })
    }
}
