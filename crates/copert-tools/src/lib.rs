//! Copert Tools - Tool Registry and Execution Engine
//!
//! This crate provides the tool system for Copert:
//! - Registry: the closed set of tool kinds and their definitions
//! - Schema: input checks against a tool's parameter schema
//! - Edit: the sequential, all-or-nothing string edit engine
//! - Runner: timeout-bounded tool execution
//! - Builtins: file, search, shell, web and utility tools

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod builtins;
pub mod edit;
pub mod error;
pub mod registry;
pub mod runner;
pub mod schema;

pub use builtins::{load_context_file, register_builtins, BuiltinsConfig, Workspace, COPERT_MD};
pub use edit::{apply_edits, EditError, EditOperation};
pub use error::{Error, Result};
pub use registry::{Tool, ToolDefinition, ToolKind, ToolRegistry, ToolResult};
pub use runner::{RunnerConfig, ToolRunner};
