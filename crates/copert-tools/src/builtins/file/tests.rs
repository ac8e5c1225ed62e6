use super::*;
use crate::registry::{Tool, ToolKind};
use serde_json::json;
use std::path::Path;
use tempfile::TempDir;

fn workspace() -> (TempDir, Workspace) {
    let dir = tempfile::tempdir().unwrap();
    let workspace = Workspace::new(dir.path());
    (dir, workspace)
}

fn write(dir: &Path, name: &str, content: &[u8]) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, content).unwrap();
}

#[test]
fn test_definitions() {
    let (_dir, ws) = workspace();
    assert_eq!(FileReadTool::new(ws.clone()).definition().kind, ToolKind::ReadFile);
    assert!(!FileReadTool::new(ws.clone()).definition().destructive);
    assert!(FileWriteTool::new(ws.clone()).definition().destructive);
    assert!(FileEditTool::new(ws.clone()).definition().destructive);
    assert!(MultiEditTool::new(ws.clone()).definition().destructive);
    assert_eq!(FileListTool::new(ws).definition().name, "ls");
}

#[test]
fn test_workspace_resolve() {
    let ws = Workspace::new("/home/dev/project");
    assert_eq!(ws.resolve("src/main.rs"), Path::new("/home/dev/project/src/main.rs"));
    assert_eq!(ws.resolve("./a/../b.txt"), Path::new("/home/dev/project/b.txt"));
    assert_eq!(ws.resolve("/tmp/x"), Path::new("/tmp/x"));
    assert_eq!(ws.resolve(""), Path::new("/home/dev/project"));
    assert!(ws.resolve_for_write("/etc/passwd").is_err());
    assert!(ws.resolve_for_write("notes.md").is_ok());
}

#[test]
fn test_line_count() {
    assert_eq!(line_count(""), 0);
    assert_eq!(line_count("one"), 1);
    assert_eq!(line_count("one\ntwo\n"), 3);
}

#[tokio::test]
async fn test_read_numbered() {
    let (dir, ws) = workspace();
    write(dir.path(), "a.txt", b"alpha\nbeta\ngamma\n");

    let result = FileReadTool::new(ws)
        .execute(json!({"file_path": "a.txt"}))
        .await
        .unwrap();

    assert!(result.success);
    assert!(result.output.starts_with("[Read 3 of 3 total lines]\n\n"));
    assert!(result.output.contains("     1\talpha"));
    assert!(result.output.contains("     3\tgamma"));
}

#[tokio::test]
async fn test_read_offset_and_limit() {
    let (dir, ws) = workspace();
    let content: String = (1..=10).map(|i| format!("line {i}\n")).collect();
    write(dir.path(), "ten.txt", content.as_bytes());

    let result = FileReadTool::new(ws)
        .execute(json!({"file_path": "ten.txt", "offset": 4, "limit": 2}))
        .await
        .unwrap();

    assert!(result
        .output
        .starts_with("[Read 2 of 10 total lines, starting from line 4]"));
    assert!(result.output.contains("     4\tline 4"));
    assert!(result.output.contains("     5\tline 5"));
    assert!(!result.output.contains("line 6"));
}

#[tokio::test]
async fn test_read_empty_long_and_binary() {
    let (dir, ws) = workspace();
    write(dir.path(), "empty.txt", b"");
    write(dir.path(), "long.txt", "x".repeat(2500).as_bytes());
    write(dir.path(), "blob.bin", &[0xff, 0xfe, 0x00, 0x80]);
    let tool = FileReadTool::new(ws);

    let empty = tool.execute(json!({"file_path": "empty.txt"})).await.unwrap();
    assert!(empty.output.ends_with("[File is empty]"));

    let long = tool.execute(json!({"file_path": "long.txt"})).await.unwrap();
    assert!(long.output.ends_with("... [truncated]"));

    let binary = tool.execute(json!({"file_path": "blob.bin"})).await.unwrap();
    assert!(!binary.success);
    assert!(binary.output.starts_with("Error: Unable to decode file (possibly binary):"));

    let missing = tool.execute(json!({"file_path": "nope.txt"})).await.unwrap();
    assert!(missing.output.starts_with("Error: File not found:"));
}

#[tokio::test]
async fn test_write_creates_parents() {
    let (dir, ws) = workspace();
    let result = FileWriteTool::new(ws)
        .execute(json!({"file_path": "nested/dir/out.txt", "content": "a\nb"}))
        .await
        .unwrap();

    assert!(result.success);
    assert!(result.output.ends_with("(2 lines, 3 characters)"));
    assert_eq!(
        std::fs::read_to_string(dir.path().join("nested/dir/out.txt")).unwrap(),
        "a\nb"
    );
}

#[tokio::test]
async fn test_edit_single_and_ambiguous() {
    let (dir, ws) = workspace();
    write(dir.path(), "f.txt", b"foo bar foo");
    let tool = FileEditTool::new(ws);

    let ambiguous = tool
        .execute(json!({"file_path": "f.txt", "old_string": "foo", "new_string": "baz"}))
        .await
        .unwrap();
    assert!(!ambiguous.success);
    assert!(ambiguous.output.contains("appears 2 times"));
    assert_eq!(std::fs::read_to_string(dir.path().join("f.txt")).unwrap(), "foo bar foo");

    let all = tool
        .execute(json!({
            "file_path": "f.txt", "old_string": "foo", "new_string": "baz", "replace_all": true
        }))
        .await
        .unwrap();
    assert!(all.success);
    assert!(all.output.starts_with("Successfully replaced 2 occurrence(s)"));
    assert_eq!(std::fs::read_to_string(dir.path().join("f.txt")).unwrap(), "baz bar baz");

    let same = tool
        .execute(json!({"file_path": "f.txt", "old_string": "bar", "new_string": "bar"}))
        .await
        .unwrap();
    assert_eq!(same.output, "Error: old_string and new_string must be different");
}

#[tokio::test]
async fn test_multiedit_is_atomic() {
    let (dir, ws) = workspace();
    let original = "fn alpha() {}\nfn beta() {}\n";
    write(dir.path(), "lib.rs", original.as_bytes());

    let result = MultiEditTool::new(ws)
        .execute(json!({
            "file_path": "lib.rs",
            "edits": [
                {"old_string": "alpha", "new_string": "first"},
                {"old_string": "gamma", "new_string": "third"}
            ]
        }))
        .await
        .unwrap();

    assert!(!result.success);
    assert!(result.output.starts_with("Error: Edit 2 failed"));
    let on_disk = std::fs::read(dir.path().join("lib.rs")).unwrap();
    assert_eq!(on_disk, original.as_bytes());
}

#[tokio::test]
async fn test_multiedit_sequential_success() {
    let (dir, ws) = workspace();
    write(dir.path(), "lib.rs", b"fn alpha() {}\n");

    let result = MultiEditTool::new(ws)
        .execute(json!({
            "file_path": "lib.rs",
            "edits": [
                {"old_string": "alpha", "new_string": "first"},
                {"old_string": "first()", "new_string": "first_call()"}
            ]
        }))
        .await
        .unwrap();

    assert!(result.success, "{}", result.output);
    assert!(result.output.starts_with("Successfully applied 2 edits to"));
    assert_eq!(
        std::fs::read_to_string(dir.path().join("lib.rs")).unwrap(),
        "fn first_call() {}\n"
    );
}

#[tokio::test]
async fn test_multiedit_malformed_edit() {
    let (dir, ws) = workspace();
    write(dir.path(), "a.txt", b"abc");

    let result = MultiEditTool::new(ws)
        .execute(json!({"file_path": "a.txt", "edits": [{"old_string": "a"}]}))
        .await
        .unwrap();
    assert_eq!(result.output, "Error: Edit 1 missing required field 'new_string'");
}

#[tokio::test]
async fn test_ls_orders_dirs_first() {
    let (dir, ws) = workspace();
    write(dir.path(), "b.txt", b"");
    write(dir.path(), "a.log", b"");
    write(dir.path(), "src/main.rs", b"");
    let tool = FileListTool::new(ws);

    let result = tool.execute(json!({"path": "."})).await.unwrap();
    let expected_tail = "src/\na.log\nb.txt\n\nTotal: 1 directories, 2 files";
    assert!(result.output.ends_with(expected_tail), "{}", result.output);

    let filtered = tool
        .execute(json!({"path": ".", "ignore": ["*.log"]}))
        .await
        .unwrap();
    assert!(!filtered.output.contains("a.log"));
}

#[tokio::test]
async fn test_ls_errors() {
    let (dir, ws) = workspace();
    write(dir.path(), "file.txt", b"x");
    std::fs::create_dir(dir.path().join("empty")).unwrap();
    let tool = FileListTool::new(ws);

    let missing = tool.execute(json!({"path": "missing"})).await.unwrap();
    assert!(missing.output.starts_with("Error: Path does not exist:"));

    let not_dir = tool.execute(json!({"path": "file.txt"})).await.unwrap();
    assert!(not_dir.output.starts_with("Error: Path is not a directory:"));

    let empty = tool.execute(json!({"path": "empty"})).await.unwrap();
    assert!(empty.output.starts_with("Directory is empty:"));
}
