//! Workspace file tools: list_files, read_file, write_file

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::PathBuf;

use tracing::debug;

use super::path_utils::resolve_in_workspace;
use super::{ToolError, ToolTrait};

/// Lists the workspace root
pub struct ListFilesTool {
    workspace: PathBuf,
}

impl ListFilesTool {
    pub fn new(workspace: PathBuf) -> Self {
        Self { workspace }
    }
}

#[async_trait]
impl ToolTrait for ListFilesTool {
    fn name(&self) -> &str {
        "list_files"
    }

    fn description(&self) -> &str {
        "List the files in the workspace directory."
    }

    fn parameters(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    async fn execute(&self, _args: Value) -> Result<String, ToolError> {
        debug!("listing workspace {:?}", self.workspace);
        if !self.workspace.exists() {
            return Ok("Workspace is empty.".to_string());
        }

        let mut entries = tokio::fs::read_dir(&self.workspace).await?;
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let mut name = entry.file_name().to_string_lossy().to_string();
            if entry.file_type().await?.is_dir() {
                name.push('/');
            }
            names.push(name);
        }
        names.sort();

        if names.is_empty() {
            Ok("Workspace is empty.".to_string())
        } else {
            Ok(format!("Files in workspace: {}", names.join(", ")))
        }
    }
}

/// Reads a UTF-8 file from the workspace
pub struct ReadFileTool {
    workspace: PathBuf,
}

impl ReadFileTool {
    pub fn new(workspace: PathBuf) -> Self {
        Self { workspace }
    }
}

#[derive(Deserialize)]
struct ReadFileArgs {
    filename: String,
}

#[async_trait]
impl ToolTrait for ReadFileTool {
    fn name(&self) -> &str {
        "read_file"
    }

    fn description(&self) -> &str {
        "Read the contents of a file in the workspace."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "filename": { "type": "string", "description": "File name relative to the workspace" }
            },
            "required": ["filename"]
        })
    }

    async fn execute(&self, args: Value) -> Result<String, ToolError> {
        let args: ReadFileArgs = serde_json::from_value(args)?;
        let path = resolve_in_workspace(&args.filename, &self.workspace).await?;

        debug!("reading {:?}", path);
        if !path.is_file() {
            return Err(ToolError::Execution(format!(
                "file {} does not exist",
                args.filename
            )));
        }

        tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| ToolError::Execution(format!("cannot read {}: {}", args.filename, e)))
    }
}

/// Creates or overwrites a file in the workspace
pub struct WriteFileTool {
    workspace: PathBuf,
}

impl WriteFileTool {
    pub fn new(workspace: PathBuf) -> Self {
        Self { workspace }
    }
}

#[derive(Deserialize)]
struct WriteFileArgs {
    filename: String,
    content: String,
}

#[async_trait]
impl ToolTrait for WriteFileTool {
    fn name(&self) -> &str {
        "write_file"
    }

    fn description(&self) -> &str {
        "Create or overwrite a file in the workspace."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "filename": { "type": "string", "description": "File name relative to the workspace" },
                "content": { "type": "string", "description": "Text to write" }
            },
            "required": ["filename", "content"]
        })
    }

    async fn execute(&self, args: Value) -> Result<String, ToolError> {
        let args: WriteFileArgs = serde_json::from_value(args)?;
        let path = resolve_in_workspace(&args.filename, &self.workspace).await?;

        debug!("writing {} bytes to {:?}", args.content.len(), path);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, &args.content)
            .await
            .map_err(|e| ToolError::Execution(format!("cannot write {}: {}", args.filename, e)))?;

        Ok(format!(
            "Wrote {} bytes to {}",
            args.content.len(),
            args.filename
        ))
    }
}
