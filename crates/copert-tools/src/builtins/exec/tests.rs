use super::runner::{format_output, CommandOutput};
use super::*;
use crate::builtins::file::Workspace;
use crate::registry::{Tool, ToolKind};
use serde_json::json;

fn output(stdout: &str, stderr: &str, exit_code: i32) -> CommandOutput {
    CommandOutput {
        stdout: stdout.to_string(),
        stderr: stderr.to_string(),
        exit_code,
    }
}

#[test]
fn test_bash_definition() {
    let tool = BashTool::new(Workspace::new("."), ExecConfig::default());
    let def = tool.definition();

    assert_eq!(def.kind, ToolKind::Bash);
    assert!(!def.destructive);
    assert!(def.parameters["properties"]["timeout"]["description"]
        .as_str()
        .unwrap()
        .contains("600000"));
}

#[test]
fn test_effective_timeout() {
    let config = ExecConfig::default();
    assert_eq!(config.effective_timeout_ms(None), 120_000);
    assert_eq!(config.effective_timeout_ms(Some(5_000)), 5_000);
    assert_eq!(config.effective_timeout_ms(Some(9_000_000)), 600_000);
    assert_eq!(config.effective_timeout_ms(Some(0)), 120_000);
}

#[test]
fn test_format_output() {
    assert_eq!(format_output(&output("", "", 0), 100), "[Command completed with no output]");
    assert_eq!(format_output(&output("out", "err", 0), 100), "out\nerr");
    assert_eq!(
        format_output(&output("", "boom", 2), 100),
        "boom\n[Command exited with code 2]"
    );
    assert_eq!(
        format_output(&output("", "", 1), 100),
        "\n[Command exited with code 1]"
    );

    let long = format_output(&output(&"y".repeat(50), "", 0), 10);
    assert_eq!(long, "yyyyyyyyyy\n\n[Output truncated - exceeded 10 characters]");
}

#[cfg(unix)]
#[tokio::test]
async fn test_runs_in_workspace() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("marker.txt"), "hi").unwrap();
    let tool = BashTool::new(Workspace::new(dir.path()), ExecConfig::default());

    let result = tool
        .execute(json!({"command": "ls && echo oops >&2 && exit 3"}))
        .await
        .unwrap();

    assert!(result.success);
    assert!(result.output.contains("marker.txt"));
    assert!(result.output.contains("oops"));
    assert!(result.output.ends_with("[Command exited with code 3]"));
}

#[cfg(unix)]
#[tokio::test]
async fn test_timeout() {
    let dir = tempfile::tempdir().unwrap();
    let tool = BashTool::new(Workspace::new(dir.path()), ExecConfig::default());

    let result = tool
        .execute(json!({"command": "sleep 5", "timeout": 100}))
        .await
        .unwrap();

    assert!(!result.success);
    assert_eq!(result.output, "Error: Command timed out after 0.0 minutes");
}

#[tokio::test]
async fn test_missing_command() {
    let tool = BashTool::new(Workspace::new("."), ExecConfig::default());
    assert!(tool.execute(json!({"command": "  "})).await.is_err());
}
