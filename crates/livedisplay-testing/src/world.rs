//! TestWorld pattern for declarative CLI test setup.
//!
//! Provides a fluent interface for:
//! - Creating an isolated data directory
//! - Seeding the display config and the persisted key-value store
//! - Executing CLI commands against that directory

use anyhow::Result;
use assert_cmd::Command;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Name of the persisted key-value store inside the data directory
pub const STORE_FILE: &str = "store.json";

/// Name of the display configuration inside the data directory
pub const CONFIG_FILE: &str = "livedisplay.toml";

/// Declarative test environment builder.
///
/// # Example
/// ```no_run
/// use livedisplay_testing::TestWorld;
///
/// let world = TestWorld::new().with_store_entry("timeout", "30");
///
/// let result = world.run(&["config", "show"]).unwrap();
/// assert!(result.success());
/// ```
pub struct TestWorld {
    temp_dir: TempDir,
    data_dir: PathBuf,
    env_vars: HashMap<String, String>,
}

impl Default for TestWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl TestWorld {
    /// Create a new isolated test environment.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let data_dir = temp_dir.path().join(".livedisplay");
        std::fs::create_dir_all(&data_dir).expect("Failed to create data dir");

        Self {
            temp_dir,
            data_dir,
            env_vars: HashMap::new(),
        }
    }

    /// Get the data directory path (.livedisplay).
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Get the temp directory root.
    pub fn temp_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn store_path(&self) -> PathBuf {
        self.data_dir.join(STORE_FILE)
    }

    pub fn config_path(&self) -> PathBuf {
        self.data_dir.join(CONFIG_FILE)
    }

    /// Set an environment variable for CLI execution.
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env_vars.insert(key.into(), value.into());
        self
    }

    /// Write the display configuration file.
    pub fn with_config(self, toml: &str) -> Self {
        std::fs::write(self.config_path(), toml).expect("Failed to write config");
        self
    }

    /// Add one key to the persisted store, creating it if needed.
    pub fn with_store_entry(self, key: &str, value: &str) -> Self {
        let mut entries = self.store_entries();
        entries.insert(key.to_string(), Value::String(value.to_string()));
        let json = serde_json::to_string_pretty(&entries).expect("Failed to encode store");
        std::fs::write(self.store_path(), json).expect("Failed to write store");
        self
    }

    /// Current contents of the persisted store; empty if it does not exist.
    pub fn store_entries(&self) -> Map<String, Value> {
        std::fs::read_to_string(self.store_path())
            .ok()
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default()
    }

    pub fn store_value(&self, key: &str) -> Option<String> {
        self.store_entries()
            .get(key)
            .and_then(Value::as_str)
            .map(String::from)
    }

    /// Configure a CLI command with this test environment's settings.
    pub fn configure_command<'a>(&self, cmd: &'a mut Command) -> &'a mut Command {
        cmd.arg("--data-dir").arg(self.data_dir());
        cmd.current_dir(self.temp_dir.path());
        cmd.env_remove("RUST_LOG");

        for (key, value) in &self.env_vars {
            cmd.env(key, value);
        }

        cmd
    }

    /// Execute a command using the project's binary and return the result.
    ///
    /// # Note
    /// This method uses `Command::cargo_bin()` which requires the binary to be
    /// built, which cargo test does automatically for the CLI crate.
    #[allow(deprecated)]
    pub fn run(&self, args: &[&str]) -> Result<CliResult> {
        let mut cmd = Command::cargo_bin("livedisplay")
            .map_err(|e| anyhow::anyhow!("Failed to find livedisplay binary: {}", e))?;

        self.configure_command(&mut cmd);
        cmd.args(args);

        let output = cmd.output()?;

        Ok(CliResult {
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

/// Result of a CLI command execution.
#[derive(Debug)]
pub struct CliResult {
    pub status: std::process::ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl CliResult {
    /// Check if the command succeeded.
    pub fn success(&self) -> bool {
        self.status.success()
    }

    /// Parse stdout as JSON.
    pub fn json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::from_str(&self.stdout)?)
    }

    pub fn stdout(&self) -> &str {
        &self.stdout
    }

    pub fn stderr(&self) -> &str {
        &self.stderr
    }
}
