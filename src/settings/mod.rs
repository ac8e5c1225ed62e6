//! Settings
//!
//! Typed view of `config/default.toml` and its overrides.

mod loader;

pub use loader::load_settings;
#[cfg(test)]
pub(crate) use loader::defaults;

use copert_core::OrchestratorConfig;
use copert_tools::builtins::{ExecConfig, GrepConfig};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Effective settings of a session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub llm: LlmSettings,
    pub agent: AgentSettings,
    #[serde(default)]
    pub tools: ToolSettings,
}

/// Model endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    pub model: String,
    pub base_url: String,
    /// Name of the environment variable holding the API key
    pub api_key_env: String,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
}

fn default_llm_timeout() -> u64 {
    120
}

/// Agent loop behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSettings {
    pub max_iterations: usize,
    #[serde(default)]
    pub auto_approve: bool,
    #[serde(default)]
    pub verbose: bool,
}

/// Builtin tool limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSettings {
    pub bash_default_timeout_secs: u64,
    pub bash_max_timeout_secs: u64,
    pub output_limit: usize,
    pub grep_timeout_secs: u64,
    pub webfetch_cache_ttl_secs: u64,
    /// Name of the environment variable holding the Exa key
    pub search_api_key_env: String,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            bash_default_timeout_secs: 120,
            bash_max_timeout_secs: 600,
            output_limit: 30_000,
            grep_timeout_secs: 30,
            webfetch_cache_ttl_secs: 900,
            search_api_key_env: "EXA_API_KEY".to_string(),
        }
    }
}

impl Settings {
    /// Orchestrator limits and request options
    pub fn orchestrator(&self) -> OrchestratorConfig {
        let mut config = OrchestratorConfig::new()
            .with_max_iterations(self.agent.max_iterations)
            .with_model(self.llm.model.clone());
        if let Some(temperature) = self.llm.temperature {
            config = config.with_temperature(temperature);
        }
        if let Some(max_tokens) = self.llm.max_tokens {
            config = config.with_max_tokens(max_tokens);
        }
        config
    }
}

impl ToolSettings {
    /// Bash limits
    pub fn exec(&self) -> ExecConfig {
        ExecConfig {
            default_timeout_ms: self.bash_default_timeout_secs * 1000,
            max_timeout_ms: self.bash_max_timeout_secs * 1000,
            output_limit: self.output_limit,
            ..ExecConfig::default()
        }
    }

    /// Grep limits
    pub fn grep(&self) -> GrepConfig {
        GrepConfig {
            timeout: Duration::from_secs(self.grep_timeout_secs),
            output_limit: self.output_limit,
        }
    }

    /// Webfetch cache lifetime
    pub fn webfetch_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.webfetch_cache_ttl_secs)
    }
}
