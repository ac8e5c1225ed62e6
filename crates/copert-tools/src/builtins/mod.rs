//! Builtins - Built-in tools for Copert
//!
//! This module provides the tools the agent works with:
//! - File tools: read_file, write_file, edit_file, multiedit, ls
//! - Search tools: grep, glob
//! - Exec tool: bash
//! - Web tools: webfetch, websearch
//! - Utility tools: todowrite, read_copert_md, write_copert_md
//!
//! `task` and `init` need an agent to delegate to and are registered by
//! `copert-core`.

pub mod context;
pub mod exec;
pub mod file;
pub mod search;
pub mod todo;
pub mod web;

pub use context::{load_context_file, ReadCopertMdTool, WriteCopertMdTool, COPERT_MD};
pub use exec::{BashTool, ExecConfig};
pub use file::{
    FileEditTool, FileListTool, FileReadTool, FileWriteTool, MultiEditTool, Workspace,
};
pub use search::{GlobTool, GrepConfig, GrepTool};
pub use todo::TodoWriteTool;
pub use web::{Summarizer, WebFetchTool, WebSearchTool, DEFAULT_CACHE_TTL};

use crate::error::Result;
use crate::registry::ToolRegistry;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Configuration for built-in tools
#[derive(Debug, Clone)]
pub struct BuiltinsConfig {
    /// Directory relative paths resolve against
    pub working_dir: PathBuf,
    /// Bash tool configuration
    pub exec: ExecConfig,
    /// Grep tool configuration
    pub grep: GrepConfig,
    /// Lifetime of cached webfetch answers
    pub webfetch_cache_ttl: Duration,
    /// Model that answers webfetch prompts (raw page text is returned without one)
    pub summarizer: Option<Summarizer>,
    /// Exa API key for websearch
    pub search_api_key: Option<String>,
}

impl Default for BuiltinsConfig {
    fn default() -> Self {
        Self {
            working_dir: PathBuf::from("."),
            exec: ExecConfig::default(),
            grep: GrepConfig::default(),
            webfetch_cache_ttl: DEFAULT_CACHE_TTL,
            summarizer: None,
            search_api_key: None,
        }
    }
}

impl BuiltinsConfig {
    /// Config rooted at `working_dir` with defaults elsewhere
    #[must_use]
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
            ..Self::default()
        }
    }
}

/// Register all built-in tools with the registry
///
/// # Errors
/// Returns an error if an HTTP client for the web tools cannot be created.
pub fn register_builtins(registry: &mut ToolRegistry, config: &BuiltinsConfig) -> Result<()> {
    let workspace = Workspace::new(config.working_dir.clone());

    // File tools
    registry.register(Arc::new(FileReadTool::new(workspace.clone())));
    registry.register(Arc::new(FileWriteTool::new(workspace.clone())));
    registry.register(Arc::new(FileEditTool::new(workspace.clone())));
    registry.register(Arc::new(MultiEditTool::new(workspace.clone())));
    registry.register(Arc::new(FileListTool::new(workspace.clone())));

    // Search tools
    registry.register(Arc::new(GrepTool::new(workspace.clone(), config.grep.clone())));
    registry.register(Arc::new(GlobTool::new(workspace.clone())));

    // Shell
    registry.register(Arc::new(BashTool::new(workspace.clone(), config.exec.clone())));

    // Web tools
    registry.register(Arc::new(WebFetchTool::new(
        config.webfetch_cache_ttl,
        config.summarizer.clone(),
    )?));
    registry.register(Arc::new(WebSearchTool::new(config.search_api_key.clone())?));

    // Utility tools
    registry.register(Arc::new(TodoWriteTool::new()));
    registry.register(Arc::new(ReadCopertMdTool::new(workspace.clone())));
    registry.register(Arc::new(WriteCopertMdTool::new(workspace)));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ToolKind;

    #[test]
    fn test_register_builtins() {
        let mut registry = ToolRegistry::new();
        register_builtins(&mut registry, &BuiltinsConfig::default()).unwrap();

        for kind in ToolKind::ALL {
            let expected = !matches!(kind, ToolKind::Task | ToolKind::Init);
            assert_eq!(registry.has(kind), expected, "{kind}");
        }
        assert_eq!(registry.len(), 13);
    }

    #[test]
    fn test_destructive_builtins() {
        let mut registry = ToolRegistry::new();
        register_builtins(&mut registry, &BuiltinsConfig::new("/tmp")).unwrap();

        let destructive: Vec<&str> = registry
            .definitions()
            .into_iter()
            .filter(|d| d.destructive)
            .map(|d| d.name.as_str())
            .collect();
        assert_eq!(destructive, vec!["write_file", "edit_file", "multiedit"]);
    }
}
