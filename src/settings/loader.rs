//! Settings loading
//!
//! Handles loading settings from embedded defaults, files, and environment.

use super::Settings;
use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};

/// Embedded default configuration (compiled into binary)
pub const DEFAULT_CONFIG: &str = include_str!("../../config/default.toml");

/// Project-level override file in the working directory
const PROJECT_CONFIG: &str = ".copert.toml";

/// Load settings from files and environment
pub fn load_settings() -> Result<Settings> {
    build(environment())
}

// prefix_separator("_") makes COPERT_AGENT__MAX_ITERATIONS map to agent.max_iterations
fn environment() -> Environment {
    Environment::with_prefix("COPERT")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

fn build(env: Environment) -> Result<Settings> {
    let config = Config::builder()
        // 1. Embedded defaults (always available)
        .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
        // 2. External overrides (optional)
        .add_source(File::with_name("config/local").required(false))
        .add_source(File::new(PROJECT_CONFIG, FileFormat::Toml).required(false))
        // 3. Environment variables (highest priority)
        .add_source(env)
        .build()
        .context("Failed to build configuration")?;

    config
        .try_deserialize()
        .context("Failed to deserialize configuration")
}

/// Embedded defaults only, ignoring the process environment
#[cfg(test)]
pub(crate) fn defaults() -> Settings {
    build(environment().source(Some(Default::default()))).unwrap()
}
