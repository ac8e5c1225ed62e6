use super::*;
use crate::builtins::file::Workspace;
use crate::registry::Tool;
use serde_json::json;
use std::time::Duration;
use tempfile::TempDir;

fn fixture() -> (TempDir, Workspace) {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    std::fs::create_dir_all(root.join("src/nested")).unwrap();
    std::fs::create_dir_all(root.join("target/debug")).unwrap();
    std::fs::create_dir_all(root.join(".git")).unwrap();
    std::fs::write(root.join("src/main.rs"), "fn main() {\n    run();\n}\n").unwrap();
    std::fs::write(
        root.join("src/nested/lib.rs"),
        "pub fn run() {}\npub fn Run_twice() {}\n// run\n",
    )
    .unwrap();
    std::fs::write(root.join("README.md"), "# demo\nrun the thing\n").unwrap();
    std::fs::write(root.join("target/debug/out.rs"), "fn run() {}\n").unwrap();
    std::fs::write(root.join(".git/config"), "run\n").unwrap();
    let workspace = Workspace::new(root);
    (dir, workspace)
}

fn grep(ws: Workspace) -> GrepTool {
    GrepTool::new(ws, GrepConfig::default())
}

#[tokio::test]
async fn test_files_with_matches_default() {
    let (_dir, ws) = fixture();
    let result = grep(ws).execute(json!({"pattern": "fn run"})).await.unwrap();

    assert!(result.success);
    assert_eq!(result.output, "src/nested/lib.rs");
}

#[tokio::test]
async fn test_glob_filter_and_case() {
    let (_dir, ws) = fixture();
    let tool = grep(ws);

    let result = tool
        .execute(json!({"pattern": "run", "glob": "*.md"}))
        .await
        .unwrap();
    assert_eq!(result.output, "README.md");

    let insensitive = tool
        .execute(json!({
            "pattern": "fn run_twice", "case_insensitive": true, "output_mode": "count"
        }))
        .await
        .unwrap();
    assert_eq!(insensitive.output, "src/nested/lib.rs:1");
}

#[tokio::test]
async fn test_content_with_context() {
    let (_dir, ws) = fixture();
    let result = grep(ws)
        .execute(json!({
            "pattern": "run\\(\\);",
            "path": "src/main.rs",
            "output_mode": "content",
            "show_line_numbers": true,
            "context_before": 1
        }))
        .await
        .unwrap();

    assert_eq!(
        result.output,
        "src/main.rs-1-fn main() {\nsrc/main.rs:2:    run();"
    );
}

#[tokio::test]
async fn test_multiline() {
    let (_dir, ws) = fixture();
    let result = grep(ws)
        .execute(json!({
            "pattern": "main\\(\\) \\{.*run",
            "multiline": true,
            "output_mode": "count"
        }))
        .await
        .unwrap();
    assert_eq!(result.output, "src/main.rs:1");
}

#[tokio::test]
async fn test_no_matches_and_bad_regex() {
    let (_dir, ws) = fixture();
    let tool = grep(ws);

    let none = tool.execute(json!({"pattern": "zebra"})).await.unwrap();
    assert!(none.success);
    assert_eq!(none.output, "No matches found");

    let bad = tool.execute(json!({"pattern": "("})).await.unwrap();
    assert!(!bad.success);
    assert!(bad.output.starts_with("Error: Invalid regex pattern"));
}

#[test]
fn test_definition_timeout_covers_search() {
    let (_dir, ws) = fixture();
    let tool = GrepTool::new(
        ws,
        GrepConfig {
            timeout: Duration::from_secs(30),
            output_limit: 100,
        },
    );
    assert_eq!(tool.definition().timeout, Some(Duration::from_secs(31)));
}

#[tokio::test]
async fn test_glob_recursive_skips_build_dirs() {
    let (_dir, ws) = fixture();
    let result = GlobTool::new(ws)
        .execute(json!({"pattern": "**/*.rs"}))
        .await
        .unwrap();

    assert!(result.output.starts_with("Found 2 file(s) matching '**/*.rs':\n"));
    assert!(result.output.contains("src/main.rs"));
    assert!(result.output.contains("src/nested/lib.rs"));
    assert!(!result.output.contains("target"));
}

#[tokio::test]
async fn test_glob_newest_first() {
    let (dir, ws) = fixture();
    std::fs::write(dir.path().join("src/util.rs"), "pub fn util() {}\n").unwrap();
    let older = std::fs::File::options()
        .write(true)
        .open(dir.path().join("src/main.rs"))
        .unwrap();
    older
        .set_modified(std::time::SystemTime::UNIX_EPOCH + Duration::from_secs(1_000))
        .unwrap();

    let result = GlobTool::new(ws)
        .execute(json!({"pattern": "*.rs", "path": "src"}))
        .await
        .unwrap();
    assert_eq!(
        result.output,
        "Found 2 file(s) matching '*.rs':\nutil.rs\nmain.rs"
    );
}

#[tokio::test]
async fn test_glob_errors() {
    let (_dir, ws) = fixture();
    let tool = GlobTool::new(ws);

    let missing = tool
        .execute(json!({"pattern": "*.rs", "path": "nowhere"}))
        .await
        .unwrap();
    assert!(missing.output.starts_with("Error: Directory not found:"));

    let none = tool.execute(json!({"pattern": "*.py"})).await.unwrap();
    assert_eq!(none.output, "No files found matching pattern: *.py");
}
