//! Tests for the workspace file tools

use serde_json::json;
use std::fs;
use steward_agent::tools::{ListFilesTool, ReadFileTool, ToolError, ToolTrait, WriteFileTool};
use tempfile::TempDir;

#[tokio::test]
async fn test_list_files_empty_workspace() {
    let temp_dir = TempDir::new().unwrap();
    let tool = ListFilesTool::new(temp_dir.path().to_path_buf());

    let result = tool.execute(json!({})).await.unwrap();
    assert_eq!(result, "Workspace is empty.");
}

#[tokio::test]
async fn test_list_files_missing_workspace() {
    let temp_dir = TempDir::new().unwrap();
    let tool = ListFilesTool::new(temp_dir.path().join("not-created-yet"));

    let result = tool.execute(json!({})).await.unwrap();
    assert_eq!(result, "Workspace is empty.");
}

#[tokio::test]
async fn test_list_files_sorted_with_dirs_marked() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("b.txt"), "b").unwrap();
    fs::write(temp_dir.path().join("a.txt"), "a").unwrap();
    fs::create_dir(temp_dir.path().join("notes")).unwrap();

    let tool = ListFilesTool::new(temp_dir.path().to_path_buf());
    let result = tool.execute(json!({})).await.unwrap();

    assert_eq!(result, "Files in workspace: a.txt, b.txt, notes/");
}

#[tokio::test]
async fn test_list_files_ignores_arguments() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("a.txt"), "a").unwrap();

    let tool = ListFilesTool::new(temp_dir.path().to_path_buf());
    let result = tool.execute(json!({"path": "/etc"})).await.unwrap();

    assert_eq!(result, "Files in workspace: a.txt");
}

#[tokio::test]
async fn test_read_file() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("report.txt"), "quarterly numbers").unwrap();

    let tool = ReadFileTool::new(temp_dir.path().to_path_buf());
    let result = tool
        .execute(json!({"filename": "report.txt"}))
        .await
        .unwrap();

    assert_eq!(result, "quarterly numbers");
}

#[tokio::test]
async fn test_read_missing_file() {
    let temp_dir = TempDir::new().unwrap();
    let tool = ReadFileTool::new(temp_dir.path().to_path_buf());

    let err = tool
        .execute(json!({"filename": "ghost.txt"}))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        ToolError::Execution("file ghost.txt does not exist".to_string())
    );
}

#[tokio::test]
async fn test_read_file_missing_argument() {
    let temp_dir = TempDir::new().unwrap();
    let tool = ReadFileTool::new(temp_dir.path().to_path_buf());

    let err = tool.execute(json!({})).await.unwrap_err();
    assert!(matches!(err, ToolError::InvalidArguments(_)));
    assert!(err.to_string().contains("filename"));
}

#[tokio::test]
async fn test_read_file_outside_workspace() {
    let temp_dir = TempDir::new().unwrap();
    let workspace = temp_dir.path().join("ws");
    fs::create_dir(&workspace).unwrap();
    let secret = temp_dir.path().join("secret.txt");
    fs::write(&secret, "secret").unwrap();

    let tool = ReadFileTool::new(workspace);
    for filename in ["../secret.txt", secret.to_str().unwrap()] {
        let err = tool
            .execute(json!({ "filename": filename }))
            .await
            .unwrap_err();
        assert!(
            err.to_string().contains("outside workspace"),
            "Expected workspace error for {}, got: {}",
            filename,
            err
        );
    }
}

#[tokio::test]
async fn test_write_file_creates_parents() {
    let temp_dir = TempDir::new().unwrap();
    let tool = WriteFileTool::new(temp_dir.path().to_path_buf());

    let result = tool
        .execute(json!({"filename": "notes/today.md", "content": "buy milk"}))
        .await
        .unwrap();

    assert_eq!(result, "Wrote 8 bytes to notes/today.md");
    let written = fs::read_to_string(temp_dir.path().join("notes/today.md")).unwrap();
    assert_eq!(written, "buy milk");
}

#[tokio::test]
async fn test_write_file_overwrites() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("a.txt"), "old").unwrap();
    let tool = WriteFileTool::new(temp_dir.path().to_path_buf());

    tool.execute(json!({"filename": "a.txt", "content": "new"}))
        .await
        .unwrap();

    assert_eq!(
        fs::read_to_string(temp_dir.path().join("a.txt")).unwrap(),
        "new"
    );
}

#[tokio::test]
async fn test_write_file_outside_workspace() {
    let temp_dir = TempDir::new().unwrap();
    let workspace = temp_dir.path().join("ws");
    fs::create_dir(&workspace).unwrap();

    let tool = WriteFileTool::new(workspace);
    let err = tool
        .execute(json!({"filename": "../escape.txt", "content": "x"}))
        .await
        .unwrap_err();

    assert!(err.to_string().contains("outside workspace"));
    assert!(!temp_dir.path().join("escape.txt").exists());
}

#[tokio::test]
async fn test_write_then_read_then_list() {
    let temp_dir = TempDir::new().unwrap();
    let workspace = temp_dir.path().to_path_buf();

    WriteFileTool::new(workspace.clone())
        .execute(json!({"filename": "todo.txt", "content": "ship it"}))
        .await
        .unwrap();

    let content = ReadFileTool::new(workspace.clone())
        .execute(json!({"filename": "todo.txt"}))
        .await
        .unwrap();
    assert_eq!(content, "ship it");

    let listing = ListFilesTool::new(workspace)
        .execute(json!({}))
        .await
        .unwrap();
    assert_eq!(listing, "Files in workspace: todo.txt");
}
