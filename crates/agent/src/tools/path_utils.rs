//! Workspace sandboxing for file tools

use std::path::{Component, Path, PathBuf};

use super::ToolError;

/// Resolve `filename` to an absolute path that stays inside `workspace`.
///
/// Relative names are taken from the workspace root. `..` segments are
/// folded lexically, then the deepest existing ancestor is canonicalized so
/// symlinks pointing out of the workspace are caught as well.
pub async fn resolve_in_workspace(filename: &str, workspace: &Path) -> Result<PathBuf, ToolError> {
    let filename = filename.trim();
    if filename.is_empty() {
        return Err(ToolError::InvalidArguments(
            "filename must not be empty".to_string(),
        ));
    }

    let root = resolve_existing_prefix(&normalize(&absolute(workspace))).await;
    let requested = expand_tilde(filename);
    let joined = if requested.is_absolute() {
        requested
    } else {
        root.join(requested)
    };

    let normalized = normalize(&joined);
    let resolved = resolve_existing_prefix(&normalized).await;

    if !resolved.starts_with(&root) {
        return Err(ToolError::Execution(format!(
            "path {} is outside workspace",
            filename
        )));
    }

    Ok(resolved)
}

fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

/// Canonicalize the longest existing ancestor and re-append the rest
async fn resolve_existing_prefix(path: &Path) -> PathBuf {
    let mut existing = path.to_path_buf();
    let mut tail = Vec::new();

    loop {
        if let Ok(canonical) = tokio::fs::canonicalize(&existing).await {
            let mut out = canonical;
            for part in tail.iter().rev() {
                out.push(part);
            }
            return out;
        }
        match (existing.file_name(), existing.parent()) {
            (Some(name), Some(parent)) => {
                tail.push(name.to_os_string());
                existing = parent.to_path_buf();
            }
            _ => return path.to_path_buf(),
        }
    }
}

/// Fold `.` and `..` without touching the filesystem
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    } else if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}
