//! Approval - User approval for destructive tool calls
//!
//! Every destructive call passes through the [`ApprovalGate`] before it runs.
//! The gate renders a preview, asks through an [`ApprovalPrompt`] and keeps an
//! append-only history that only feeds statistics.

use std::sync::Arc;

pub mod gate;
pub mod prompt;
pub mod types;

pub use gate::ApprovalGate;
pub use prompt::{ApprovalPrompt, PromptAnswer};
pub use types::{ApprovalDecision, ApprovalPreview, ApprovalStats};

/// Shared approval gate type
pub type SharedApprovalGate = Arc<ApprovalGate>;
