use super::config::ExecConfig;
use crate::error::{Error, Result};
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Raw outcome of one command
#[derive(Debug)]
pub struct CommandOutput {
    /// Captured standard output
    pub stdout: String,
    /// Captured standard error
    pub stderr: String,
    /// Exit code, `-1` when killed by a signal
    pub exit_code: i32,
}

/// Run `command` through the configured shell in `cwd`
///
/// The child is killed if the timeout elapses (`kill_on_drop`).
pub async fn run_command(
    config: &ExecConfig,
    command: &str,
    cwd: &Path,
    timeout_ms: u64,
) -> Result<CommandOutput> {
    let mut cmd = Command::new(&config.shell);
    cmd.arg("-c")
        .arg(command)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let child = cmd.spawn().map_err(|e| Error::Execution(e.to_string()))?;

    let output = tokio::time::timeout(Duration::from_millis(timeout_ms), child.wait_with_output())
        .await
        .map_err(|_| Error::Timeout(timeout_ms))?
        .map_err(|e| Error::Execution(e.to_string()))?;

    Ok(CommandOutput {
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        exit_code: output.status.code().unwrap_or(-1),
    })
}

/// Combine streams, append the exit status and truncate, as shown to the model
#[must_use]
pub fn format_output(output: &CommandOutput, limit: usize) -> String {
    let mut text = output.stdout.clone();
    if !output.stderr.is_empty() {
        if !text.is_empty() {
            text.push('\n');
        }
        text.push_str(&output.stderr);
    }

    if output.exit_code != 0 {
        let status = format!("\n[Command exited with code {}]", output.exit_code);
        text.push_str(&status);
    }

    if text.chars().count() > limit {
        text = format!(
            "{}\n\n[Output truncated - exceeded {limit} characters]",
            copert_llm::util::truncate_chars(&text, limit)
        );
    }

    if text.is_empty() {
        "[Command completed with no output]".to_string()
    } else {
        text
    }
}
