//! Delegate - sub-agents with restricted tool sets
//!
//! A sub-agent is the same [`Orchestrator`](crate::Orchestrator) type run
//! with a subset of the builtin tools, its own system prompt and a fresh
//! conversation seeded with one user message. It shares the approval gate
//! and the iteration ceiling with the main agent. `task` and `init` exist
//! only in the main agent's registry, so sub-agents cannot delegate further.

pub mod class;
pub mod factory;
pub mod init;
pub mod report;
pub mod task;

pub use class::SubAgentClass;
pub use factory::AgentFactory;
pub use init::InitTool;
pub use report::SubAgentReport;
pub use task::TaskTool;
