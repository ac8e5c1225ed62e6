//! Orchestrator - the per-turn agent loop
//!
//! Drives one user turn through `AwaitingModel`, `AwaitingToolResults` and
//! `Terminal`, bounded by a ceiling on model round-trips. The same type runs
//! the main agent and every sub-agent; only the registry subset and the
//! system prompt differ.
//!
//! # Module Structure
//!
//! - `types`: turn state, status and outcome
//! - `config`: `OrchestratorConfig`
//! - `core`: `Orchestrator` struct and builder methods
//! - `process`: the turn loop

mod config;
mod core;
mod process;
mod types;

#[cfg(test)]
mod tests;

pub use config::{OrchestratorConfig, DEFAULT_MAX_ITERATIONS};
pub use core::Orchestrator;
pub use types::{TurnOutcome, TurnState, TurnStatus};
