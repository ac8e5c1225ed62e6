use super::prompt::{ApprovalPrompt, PromptAnswer};
use super::types::{ApprovalDecision, ApprovalPreview, ApprovalStats};
use copert_tools::ToolKind;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

/// Gate that every destructive tool call passes before it runs
///
/// Without a prompt (headless runs) and with auto-approve off, destructive
/// calls are refused.
pub struct ApprovalGate {
    auto_approve: AtomicBool,
    prompt: Option<Arc<dyn ApprovalPrompt>>,
    history: Mutex<Vec<ApprovalDecision>>,
}

impl std::fmt::Debug for ApprovalGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApprovalGate")
            .field("auto_approve", &self.is_auto_approve())
            .field("interactive", &self.prompt.is_some())
            .field("decisions", &self.stats().total)
            .finish()
    }
}

impl ApprovalGate {
    /// Gate that asks through `prompt`
    #[must_use]
    pub fn new(prompt: Arc<dyn ApprovalPrompt>) -> Self {
        Self {
            auto_approve: AtomicBool::new(false),
            prompt: Some(prompt),
            history: Mutex::new(Vec::new()),
        }
    }

    /// Gate that approves everything without asking
    #[must_use]
    pub fn auto() -> Self {
        Self {
            auto_approve: AtomicBool::new(true),
            prompt: None,
            history: Mutex::new(Vec::new()),
        }
    }

    /// Gate with no way to ask; destructive calls are refused unless auto-approve is turned on
    #[must_use]
    pub fn headless() -> Self {
        Self {
            auto_approve: AtomicBool::new(false),
            prompt: None,
            history: Mutex::new(Vec::new()),
        }
    }

    /// Start with auto-approve set to `enabled`
    #[must_use]
    pub fn with_auto_approve(self, enabled: bool) -> Self {
        self.set_auto_approve(enabled);
        self
    }

    /// Turn auto-approve on or off
    pub fn set_auto_approve(&self, enabled: bool) {
        self.auto_approve.store(enabled, Ordering::SeqCst);
        info!(enabled, "Auto-approve changed");
    }

    /// Whether destructive calls currently run without asking
    #[must_use]
    pub fn is_auto_approve(&self) -> bool {
        self.auto_approve.load(Ordering::SeqCst)
    }

    /// Decide whether a call of `tool` with `args` may run
    ///
    /// Non-destructive tools and auto-approve mode pass without a record.
    /// Every prompted answer is recorded; an interrupted prompt counts as a
    /// rejection.
    pub async fn request_approval(&self, tool: ToolKind, args: &serde_json::Value) -> bool {
        if !tool.is_destructive() || self.is_auto_approve() {
            return true;
        }

        let approved = match &self.prompt {
            Some(prompt) => {
                let preview = ApprovalPreview::for_call(tool, args);
                match prompt.confirm(&preview).await {
                    PromptAnswer::Yes => true,
                    PromptAnswer::No => false,
                    PromptAnswer::Interrupted => {
                        info!(tool = %tool, "Approval prompt interrupted, treating as rejection");
                        false
                    }
                }
            }
            None => {
                warn!(tool = %tool, "No approval prompt available, refusing destructive call");
                false
            }
        };

        self.history
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(ApprovalDecision::new(tool, args.clone(), approved));
        info!(tool = %tool, approved, "Approval decision recorded");
        approved
    }

    /// Snapshot of every recorded decision, oldest first
    #[must_use]
    pub fn history(&self) -> Vec<ApprovalDecision> {
        self.history
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Approved, rejected and total counts
    #[must_use]
    pub fn stats(&self) -> ApprovalStats {
        ApprovalStats::from_history(&self.history.lock().unwrap_or_else(|e| e.into_inner()))
    }
}
