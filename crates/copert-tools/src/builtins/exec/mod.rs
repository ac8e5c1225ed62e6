//! Exec tool - Shell command execution

pub mod config;
pub mod runner;
pub mod tool;

#[cfg(test)]
mod tests;

pub use config::ExecConfig;
pub use tool::BashTool;
