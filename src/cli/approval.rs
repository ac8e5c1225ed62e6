//! Terminal approval prompt

use super::prompts;
use copert_core::{ApprovalPreview, ApprovalPrompt, PromptAnswer};
use tracing::warn;

/// Shows the preview and asks on the terminal
#[derive(Debug, Default)]
pub struct InquirePrompt;

#[async_trait::async_trait]
impl ApprovalPrompt for InquirePrompt {
    async fn confirm(&self, preview: &ApprovalPreview) -> PromptAnswer {
        let rendered = preview.to_string();
        let question = preview.question.clone();

        // inquire blocks on the terminal
        let answer = tokio::task::spawn_blocking(move || {
            println!("\n{rendered}\n");
            prompts::confirm(&question)
        })
        .await;

        match answer {
            Ok(answer) => {
                if answer == PromptAnswer::Interrupted {
                    println!("\n⚠️  Operation interrupted");
                }
                answer
            }
            Err(e) => {
                warn!(error = %e, "Approval prompt task failed");
                PromptAnswer::No
            }
        }
    }
}
