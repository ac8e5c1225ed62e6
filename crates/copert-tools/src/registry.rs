//! Registry - Tool registration and lookup
//!
//! The set of tools is closed: every tool is one [`ToolKind`], and a name the
//! model sends resolves to a kind once, at lookup. A [`ToolRegistry`] maps
//! kinds to executors; sub-agents receive a [`ToolRegistry::subset`] so tools
//! outside their allowance simply do not exist for them.

use crate::error::{Error, Result};
use crate::schema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Every tool the assistant knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    /// Read a file with line numbers
    ReadFile,
    /// Create or overwrite a file
    WriteFile,
    /// Single exact-string replacement
    EditFile,
    /// Atomic sequence of replacements in one file
    MultiEdit,
    /// List a directory
    Ls,
    /// Regex content search
    Grep,
    /// Filename pattern search
    Glob,
    /// Shell command
    Bash,
    /// Task list tracking
    TodoWrite,
    /// Fetch and summarize a web page
    WebFetch,
    /// Web search
    WebSearch,
    /// Delegate to a sub-agent
    Task,
    /// Generate the project context file
    Init,
    /// Read the project context file
    ReadCopertMd,
    /// Write the project context file
    WriteCopertMd,
}

impl ToolKind {
    /// All kinds, in registry order
    pub const ALL: [ToolKind; 15] = [
        Self::ReadFile,
        Self::WriteFile,
        Self::EditFile,
        Self::MultiEdit,
        Self::Ls,
        Self::Grep,
        Self::Glob,
        Self::Bash,
        Self::TodoWrite,
        Self::WebFetch,
        Self::WebSearch,
        Self::Task,
        Self::Init,
        Self::ReadCopertMd,
        Self::WriteCopertMd,
    ];

    /// Name the model uses to call the tool
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::ReadFile => "read_file",
            Self::WriteFile => "write_file",
            Self::EditFile => "edit_file",
            Self::MultiEdit => "multiedit",
            Self::Ls => "ls",
            Self::Grep => "grep",
            Self::Glob => "glob",
            Self::Bash => "bash",
            Self::TodoWrite => "todowrite",
            Self::WebFetch => "webfetch",
            Self::WebSearch => "websearch",
            Self::Task => "task",
            Self::Init => "init",
            Self::ReadCopertMd => "read_copert_md",
            Self::WriteCopertMd => "write_copert_md",
        }
    }

    /// Resolve a tool name
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Whether invoking the tool mutates user files and therefore needs approval
    #[must_use]
    pub fn is_destructive(&self) -> bool {
        matches!(self, Self::WriteFile | Self::EditFile | Self::MultiEdit)
    }
}

impl std::fmt::Display for ToolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Tool metadata and schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Which tool this describes
    pub kind: ToolKind,
    /// Unique tool name
    pub name: String,
    /// Description shown to the model
    pub description: String,
    /// JSON schema for parameters
    pub parameters: serde_json::Value,
    /// Whether the tool needs approval before running
    pub destructive: bool,
    /// Upper bound on a single execution, if the runner should enforce one
    #[serde(skip)]
    pub timeout: Option<Duration>,
}

impl ToolDefinition {
    /// Create a new tool definition
    #[must_use]
    pub fn new(kind: ToolKind, description: impl Into<String>) -> Self {
        Self {
            kind,
            name: kind.name().to_string(),
            description: description.into(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {},
                "required": []
            }),
            destructive: kind.is_destructive(),
            timeout: None,
        }
    }

    /// Set the parameters schema
    #[must_use]
    pub fn with_parameters(mut self, parameters: serde_json::Value) -> Self {
        self.parameters = parameters;
        self
    }

    /// Set the execution timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Convert to the schema offered to the model
    #[must_use]
    pub fn to_llm(&self) -> copert_llm::ToolDefinition {
        copert_llm::ToolDefinition::new(&self.name, &self.description, self.parameters.clone())
    }
}

/// Result of a tool execution
///
/// Failure content always starts with `Error:` so the model (and the REPL)
/// can tell outcomes apart from the text alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    /// Whether execution succeeded
    pub success: bool,
    /// Text returned to the model
    pub output: String,
    /// Execution duration in milliseconds
    pub duration_ms: u64,
}

impl ToolResult {
    /// Create a successful result
    #[must_use]
    pub fn success(output: impl Into<String>, duration_ms: u64) -> Self {
        Self {
            success: true,
            output: output.into(),
            duration_ms,
        }
    }

    /// Create a failed result, adding the `Error:` prefix when missing
    #[must_use]
    pub fn failure(error: impl Into<String>, duration_ms: u64) -> Self {
        let error = error.into();
        let output = if error.starts_with("Error") {
            error
        } else {
            format!("Error: {error}")
        };
        Self {
            success: false,
            output,
            duration_ms,
        }
    }
}

/// Trait for tool implementations
#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    /// Get the tool definition
    fn definition(&self) -> &ToolDefinition;

    /// Execute the tool with given input
    async fn execute(&self, input: serde_json::Value) -> Result<ToolResult>;

    /// Validate input before execution
    ///
    /// The default checks the input against the parameters schema.
    fn validate_input(&self, input: &serde_json::Value) -> Result<()> {
        schema::validate(&self.definition().parameters, input)
    }
}

/// Registry for managing tools
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: BTreeMap<ToolKind, Arc<dyn Tool>>,
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.names())
            .finish()
    }
}

impl ToolRegistry {
    /// Create a new empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool, replacing any previous tool of the same kind
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let kind = tool.definition().kind;
        debug!(tool = %kind, "Registering tool");
        self.tools.insert(kind, tool);
    }

    /// Get a tool by kind
    #[must_use]
    pub fn get(&self, kind: ToolKind) -> Option<Arc<dyn Tool>> {
        self.tools.get(&kind).cloned()
    }

    /// Resolve a tool by the name the model used
    pub fn resolve(&self, name: &str) -> Result<Arc<dyn Tool>> {
        ToolKind::from_name(name)
            .and_then(|kind| self.get(kind))
            .ok_or_else(|| Error::NotFound(name.to_string()))
    }

    /// Check if a tool exists
    #[must_use]
    pub fn has(&self, kind: ToolKind) -> bool {
        self.tools.contains_key(&kind)
    }

    /// Registered tool names, in registry order
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.tools.keys().map(ToolKind::name).collect()
    }

    /// All tool definitions
    #[must_use]
    pub fn definitions(&self) -> Vec<&ToolDefinition> {
        self.tools.values().map(|t| t.definition()).collect()
    }

    /// A new registry holding only the listed kinds that are registered here
    #[must_use]
    pub fn subset(&self, kinds: &[ToolKind]) -> Self {
        let tools = self
            .tools
            .iter()
            .filter(|(kind, _)| kinds.contains(kind))
            .map(|(kind, tool)| (*kind, Arc::clone(tool)))
            .collect();
        Self { tools }
    }

    /// Get tool count
    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if registry is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Convert definitions to LLM tool format
    #[must_use]
    pub fn to_llm_tools(&self) -> Vec<copert_llm::ToolDefinition> {
        self.tools.values().map(|t| t.definition().to_llm()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoTool {
        definition: ToolDefinition,
    }

    impl EchoTool {
        fn new(kind: ToolKind) -> Self {
            Self {
                definition: ToolDefinition::new(kind, "echo"),
            }
        }
    }

    #[async_trait::async_trait]
    impl Tool for EchoTool {
        fn definition(&self) -> &ToolDefinition {
            &self.definition
        }

        async fn execute(&self, input: serde_json::Value) -> Result<ToolResult> {
            Ok(ToolResult::success(input.to_string(), 0))
        }
    }

    #[test]
    fn test_kind_names_round_trip() {
        for kind in ToolKind::ALL {
            assert_eq!(ToolKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(ToolKind::from_name("delete_everything"), None);
    }

    #[test]
    fn test_destructive_classification() {
        let destructive: Vec<_> = ToolKind::ALL
            .into_iter()
            .filter(ToolKind::is_destructive)
            .collect();
        assert_eq!(
            destructive,
            vec![ToolKind::WriteFile, ToolKind::EditFile, ToolKind::MultiEdit]
        );
        assert!(ToolDefinition::new(ToolKind::MultiEdit, "x").destructive);
        assert!(!ToolDefinition::new(ToolKind::Grep, "x").destructive);
    }

    #[test]
    fn test_tool_result() {
        let success = ToolResult::success("done", 100);
        assert!(success.success);

        let failure = ToolResult::failure("boom", 50);
        assert!(!failure.success);
        assert_eq!(failure.output, "Error: boom");

        let prefixed = ToolResult::failure("Error: File not found: x", 0);
        assert_eq!(prefixed.output, "Error: File not found: x");
        assert!(!prefixed.success);
    }

    #[test]
    fn test_registry_resolve() {
        let mut registry = ToolRegistry::new();
        assert!(registry.is_empty());
        registry.register(Arc::new(EchoTool::new(ToolKind::Ls)));

        assert!(registry.resolve("ls").is_ok());
        assert!(matches!(
            registry.resolve("grep"),
            Err(Error::NotFound(name)) if name == "grep"
        ));
        assert!(matches!(
            registry.resolve("delete_everything"),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_subset_keeps_listed_kinds() {
        let mut registry = ToolRegistry::new();
        for kind in [ToolKind::ReadFile, ToolKind::Ls, ToolKind::Task] {
            registry.register(Arc::new(EchoTool::new(kind)));
        }

        let subset = registry.subset(&[ToolKind::ReadFile, ToolKind::Grep]);
        assert_eq!(subset.names(), vec!["read_file"]);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_to_llm_tools_in_registry_order() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(EchoTool::new(ToolKind::Glob)));
        registry.register(Arc::new(EchoTool::new(ToolKind::ReadFile)));

        let names: Vec<String> = registry.to_llm_tools().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["read_file", "glob"]);
    }
}
