//! Common test utilities and helpers
//!
//! This module provides shared utilities for integration tests.

use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

/// Test project context
///
/// Creates a temporary project directory and a separate temporary global
/// config directory, so tests never read the user's real settings.
pub struct TestProject {
    /// Temporary directory for the test project
    pub dir: TempDir,
    /// Temporary global config directory
    pub config_dir: TempDir,
}

impl TestProject {
    /// Create a new test project in a temporary directory
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
            config_dir: TempDir::new().expect("Failed to create config directory"),
        }
    }

    /// Get the path to the test project directory
    pub fn path(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    /// Create a file in the test project
    pub fn create_file(&self, name: &str, content: &str) {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(path, content).expect("Failed to write file");
    }

    /// Create a directory in the test project
    pub fn create_dir(&self, name: &str) {
        let path = self.dir.path().join(name);
        std::fs::create_dir_all(path).expect("Failed to create directory");
    }

    /// Check if a file exists in the test project
    pub fn file_exists(&self, name: &str) -> bool {
        self.dir.path().join(name).exists()
    }

    /// Write the project's packgate.toml
    pub fn write_settings(&self, content: &str) {
        self.create_file("packgate.toml", content);
    }

    /// Write the global packgate.toml
    pub fn write_global_settings(&self, content: &str) {
        std::fs::write(self.config_dir.path().join("packgate.toml"), content)
            .expect("Failed to write global settings");
    }

    /// Run packgate in the project directory
    pub fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_packgate"))
            .current_dir(self.path())
            .env("PACKGATE_CONFIG_DIR", self.config_dir.path())
            .env_remove("RUST_LOG")
            .args(args)
            .output()
            .expect("Failed to execute packgate")
    }

    /// Run packgate with `--json` and parse stdout
    pub fn run_json(&self, args: &[&str]) -> (Output, serde_json::Value) {
        let mut full_args = vec!["--json"];
        full_args.extend_from_slice(args);
        let output = self.run(&full_args);
        let stdout = String::from_utf8_lossy(&output.stdout);
        let json = serde_json::from_str(&stdout)
            .unwrap_or_else(|e| panic!("stdout is not JSON ({e}): {stdout}"));
        (output, json)
    }
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

/// Settings whose build and pack steps leave marker files behind
#[allow(dead_code)]
pub const MARKER_SETTINGS: &str = r#"
generate_on_build = false

[build]
command = ["sh", "-c", "echo built > built.txt"]

[pack]
command = ["sh", "-c", "echo packed > packed.txt"]
"#;

/// Settings whose build step fails
#[allow(dead_code)]
pub const FAILING_BUILD_SETTINGS: &str = r#"
[build]
command = ["sh", "-c", "exit 2"]

[pack]
command = ["sh", "-c", "echo packed > packed.txt"]
"#;

/// Settings naming a build program that does not exist
#[allow(dead_code)]
pub const MISSING_PROGRAM_SETTINGS: &str = r#"
[build]
command = ["packgate-no-such-program-7f3a"]
"#;
