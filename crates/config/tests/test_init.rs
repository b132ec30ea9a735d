//! Tests for init_at

use steward_config::{init_at, Config};
use tempfile::TempDir;

/// Writes a config whose workspace lives inside the temp dir
async fn write_config_with_workspace(dir: &TempDir) -> std::path::PathBuf {
    let config_path = dir.path().join("config.json");
    let mut config = Config::default();
    config.agent.workspace = dir.path().join("workspace").display().to_string();
    config.save_to(&config_path).await.expect("Failed to save");
    config_path
}

#[tokio::test]
async fn test_init_keeps_existing_config() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = write_config_with_workspace(&temp_dir).await;

    let mut existing = Config::load_from(&config_path).await.unwrap();
    existing.agent.model = "existing-model".to_string();
    existing.save_to(&config_path).await.unwrap();

    let config = init_at(&config_path).await.expect("init failed");
    assert_eq!(config.agent.model, "existing-model");
}

#[tokio::test]
async fn test_init_creates_workspace() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = write_config_with_workspace(&temp_dir).await;

    let config = init_at(&config_path).await.expect("init failed");

    assert!(config.workspace_path().exists());
    assert!(config.workspace_path().is_dir());
}

#[tokio::test]
async fn test_init_is_idempotent() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = write_config_with_workspace(&temp_dir).await;

    let first = init_at(&config_path).await.unwrap();
    let second = init_at(&config_path).await.unwrap();

    assert_eq!(first.agent.workspace, second.agent.workspace);
    assert_eq!(first.agent.max_turns, second.agent.max_turns);
}
