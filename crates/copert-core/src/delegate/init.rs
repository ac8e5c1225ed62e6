//! The `init` tool: writes `COPERT.md` through the project-init sub-agent

use copert_tools::{Tool, ToolDefinition, ToolKind, ToolResult};
use std::sync::Arc;
use std::time::Instant;

use super::factory::AgentFactory;

/// Tool that generates the project context file
pub struct InitTool {
    definition: ToolDefinition,
    factory: Arc<AgentFactory>,
}

impl InitTool {
    /// Create a new init tool backed by `factory`
    #[must_use]
    pub fn new(factory: Arc<AgentFactory>) -> Self {
        let definition = ToolDefinition::new(
            ToolKind::Init,
            "Analyze the codebase and create or improve COPERT.md in the project root. \
             COPERT.md holds build/test commands and the high-level architecture and is \
             loaded as context in future sessions. Use it when setting Copert up in a new \
             project or after major architectural changes. Takes no parameters.",
        )
        .with_parameters(serde_json::json!({
            "type": "object",
            "properties": {}
        }));

        Self {
            definition,
            factory,
        }
    }
}

#[async_trait::async_trait]
impl Tool for InitTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, _input: serde_json::Value) -> copert_tools::Result<ToolResult> {
        let start = Instant::now();
        let report = self.factory.init_project().await;
        let elapsed = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        Ok(report.into_tool_result(elapsed))
    }
}
