//! Runner - Tool execution engine
//!
//! Wraps a single tool execution with the tool's timeout and turns every
//! fault into failure content, so callers always get a [`ToolResult`].

use crate::error::Result;
use crate::registry::{Tool, ToolRegistry, ToolResult};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::{debug, instrument, warn};

/// Configuration for the tool runner
#[derive(Debug, Clone, Default)]
pub struct RunnerConfig {
    /// Timeout for tools whose definition does not set one
    pub default_timeout: Option<Duration>,
}

impl RunnerConfig {
    /// Set the default timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = Some(timeout);
        self
    }
}

/// Tool runner bound to one registry
#[derive(Debug, Clone)]
pub struct ToolRunner {
    registry: Arc<ToolRegistry>,
    config: RunnerConfig,
}

impl ToolRunner {
    /// Create a new tool runner
    #[must_use]
    pub fn new(registry: Arc<ToolRegistry>, config: RunnerConfig) -> Self {
        Self { registry, config }
    }

    /// Create with default configuration
    #[must_use]
    pub fn with_defaults(registry: Arc<ToolRegistry>) -> Self {
        Self::new(registry, RunnerConfig::default())
    }

    /// Get the registry
    #[must_use]
    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Resolve a tool by name
    pub fn resolve(&self, name: &str) -> Result<Arc<dyn Tool>> {
        self.registry.resolve(name)
    }

    /// Execute an already resolved and validated tool
    #[instrument(skip(self, tool, input), fields(tool = %tool.definition().name))]
    pub async fn run(&self, tool: &dyn Tool, input: serde_json::Value) -> ToolResult {
        let definition = tool.definition();
        let start = Instant::now();
        let elapsed = || u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        let outcome = match definition.timeout.or(self.config.default_timeout) {
            Some(limit) => match timeout(limit, tool.execute(input)).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    warn!(timeout_secs = limit.as_secs(), "Tool execution timed out");
                    return ToolResult::failure(
                        format!(
                            "Error: {} timed out after {} seconds",
                            definition.name,
                            limit.as_secs()
                        ),
                        elapsed(),
                    );
                }
            },
            None => tool.execute(input).await,
        };

        let result = match outcome {
            Ok(result) => result,
            Err(e) => {
                warn!(error = %e, "Tool execution failed");
                ToolResult::failure(format!("Error executing {}: {e}", definition.name), elapsed())
            }
        };

        debug!(
            success = result.success,
            duration_ms = result.duration_ms,
            "Tool execution completed"
        );
        result
    }

    /// Resolve, validate and execute a tool by name
    pub async fn execute(&self, name: &str, input: serde_json::Value) -> Result<ToolResult> {
        let tool = self.resolve(name)?;
        tool.validate_input(&input)?;
        Ok(self.run(tool.as_ref(), input).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::registry::{ToolDefinition, ToolKind};

    struct SlowTool {
        definition: ToolDefinition,
    }

    #[async_trait::async_trait]
    impl Tool for SlowTool {
        fn definition(&self) -> &ToolDefinition {
            &self.definition
        }

        async fn execute(&self, _input: serde_json::Value) -> Result<ToolResult> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(ToolResult::success("late", 0))
        }
    }

    struct FailingTool {
        definition: ToolDefinition,
    }

    #[async_trait::async_trait]
    impl Tool for FailingTool {
        fn definition(&self) -> &ToolDefinition {
            &self.definition
        }

        async fn execute(&self, _input: serde_json::Value) -> Result<ToolResult> {
            Err(Error::Execution("disk on fire".to_string()))
        }
    }

    fn runner(tool: Arc<dyn Tool>) -> ToolRunner {
        let mut registry = ToolRegistry::new();
        registry.register(tool);
        ToolRunner::with_defaults(Arc::new(registry))
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_becomes_failure() {
        let tool = SlowTool {
            definition: ToolDefinition::new(ToolKind::Grep, "slow")
                .with_timeout(Duration::from_secs(30)),
        };
        let result = runner(Arc::new(tool))
            .execute("grep", serde_json::json!({}))
            .await
            .unwrap();

        assert!(!result.success);
        assert_eq!(result.output, "Error: grep timed out after 30 seconds");
    }

    #[tokio::test]
    async fn test_error_becomes_failure() {
        let tool = FailingTool {
            definition: ToolDefinition::new(ToolKind::Bash, "fails"),
        };
        let result = runner(Arc::new(tool))
            .execute("bash", serde_json::json!({}))
            .await
            .unwrap();

        assert!(!result.success);
        assert!(result.output.starts_with("Error executing bash:"));
        assert!(result.output.contains("disk on fire"));
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let runner = ToolRunner::with_defaults(Arc::new(ToolRegistry::new()));
        let err = runner
            .execute("delete_everything", serde_json::json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}
