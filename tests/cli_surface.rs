//! Command-line surface of the `copert` binary
//!
//! Every run happens in a scratch directory with the API key variable
//! pointed at a name that is never set, so nothing reaches the network.

use std::path::Path;
use std::process::{Command, Output};

const MISSING_KEY: &str = "COPERT_TEST_MISSING_KEY";

fn run_with_env(dir: &Path, args: &[&str], envs: &[(&str, &str)]) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_copert"));
    cmd.args(args)
        .current_dir(dir)
        .env_remove(MISSING_KEY)
        .env_remove("RUST_LOG")
        .env("COPERT_LLM__API_KEY_ENV", MISSING_KEY);
    for (key, value) in envs {
        cmd.env(key, value);
    }
    cmd.output().expect("run copert")
}

fn run(dir: &Path, args: &[&str]) -> Output {
    run_with_env(dir, args, &[])
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

fn assert_ok(output: &Output) {
    assert!(
        output.status.success(),
        "stdout:\n{}\nstderr:\n{}",
        stdout(output),
        stderr(output)
    );
}

fn settings_json(output: &Output) -> serde_json::Value {
    assert_ok(output);
    serde_json::from_str(&stdout(output)).expect("config prints JSON")
}

#[test]
fn test_version_flag() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(dir.path(), &["--version"]);

    assert_ok(&output);
    assert!(stdout(&output).contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_config_prints_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let settings = settings_json(&run(dir.path(), &["config"]));

    assert_eq!(settings["llm"]["model"], "gpt-4o");
    assert_eq!(settings["llm"]["api_key_env"], MISSING_KEY);
    assert_eq!(settings["agent"]["max_iterations"], 25);
    assert_eq!(settings["agent"]["auto_approve"], false);
    assert_eq!(settings["tools"]["output_limit"], 30000);
}

#[test]
fn test_config_layers() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join(".copert.toml"),
        "[agent]\nmax_iterations = 4\n\n[tools]\ngrep_timeout_secs = 5\n",
    )
    .unwrap();

    // project file over defaults
    let settings = settings_json(&run(dir.path(), &["config"]));
    assert_eq!(settings["agent"]["max_iterations"], 4);
    assert_eq!(settings["tools"]["grep_timeout_secs"], 5);

    // environment over project file
    let settings = settings_json(&run_with_env(
        dir.path(),
        &["config"],
        &[("COPERT_AGENT__MAX_ITERATIONS", "9")],
    ));
    assert_eq!(settings["agent"]["max_iterations"], 9);

    // flags over everything
    let settings = settings_json(&run_with_env(
        dir.path(),
        &["--max-iterations", "2", "--model", "gpt-4o-mini", "--auto-approve", "config"],
        &[("COPERT_AGENT__MAX_ITERATIONS", "9")],
    ));
    assert_eq!(settings["agent"]["max_iterations"], 2);
    assert_eq!(settings["llm"]["model"], "gpt-4o-mini");
    assert_eq!(settings["agent"]["auto_approve"], true);
}

#[test]
fn test_chat_without_key_explains() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(dir.path(), &["chat", "hello"]);

    assert!(!output.status.success());
    let err = stderr(&output);
    assert!(err.contains("not configured"), "stderr:\n{err}");
    assert!(err.contains(MISSING_KEY), "stderr:\n{err}");
}

#[test]
fn test_chat_requires_message() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(dir.path(), &["chat"]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("required"));
}
