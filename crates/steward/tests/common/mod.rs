//! Common test utilities for steward CLI tests
#![allow(dead_code)]

use assert_cmd::Command;
use std::path::PathBuf;
use tempfile::{tempdir, TempDir};

/// Isolated home directory with its own config file location
pub struct TestEnv {
    pub temp_dir: TempDir,
    pub config_path: PathBuf,
    pub workspace_dir: PathBuf,
}

impl TestEnv {
    pub fn new() -> anyhow::Result<Self> {
        let temp_dir = tempdir()?;
        let config_path = temp_dir.path().join(".steward").join("config.json");
        let workspace_dir = temp_dir.path().join("workspace");

        Ok(Self {
            temp_dir,
            config_path,
            workspace_dir,
        })
    }

    /// Command pointed at this environment, with no model keys in scope
    pub fn command(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_steward"));
        cmd.env("HOME", self.temp_dir.path())
            .env_remove("GROQ_API_KEY")
            .env_remove("OPENROUTER_API_KEY")
            .env_remove("OPENAI_API_KEY")
            .env_remove("BRAVE_API_KEY")
            .env_remove("RUST_LOG")
            .arg("--config")
            .arg(&self.config_path);
        cmd
    }

    /// Write a config using the local workspace
    pub fn create_config(&self, extra: serde_json::Value) -> anyhow::Result<()> {
        let mut config = serde_json::json!({
            "agent": { "workspace": self.workspace_dir.display().to_string() }
        });
        if let (Some(base), Some(extra)) = (config.as_object_mut(), extra.as_object()) {
            for (key, value) in extra {
                base.insert(key.clone(), value.clone());
            }
        }

        std::fs::create_dir_all(self.config_path.parent().unwrap())?;
        std::fs::write(&self.config_path, serde_json::to_string_pretty(&config)?)?;
        Ok(())
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new().expect("Failed to create test environment")
    }
}
