//! Common test utilities

#![allow(dead_code)]

use rmk::error::ProcessResult;
use rmk::runner::{Executor, Invocation, Output};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use tempfile::TempDir;

/// Create a temporary directory with an rmk.yml file
pub fn create_test_config(content: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("rmk.yml");
    fs::write(&config_path, content).unwrap();
    (temp_dir, config_path)
}

/// Create a test config with an empty subdirectory next to it
pub fn create_test_config_in_subdir(content: &str) -> (TempDir, PathBuf, PathBuf) {
    let (temp_dir, config_path) = create_test_config(content);
    let sub_dir = temp_dir.path().join("subdir");
    fs::create_dir(&sub_dir).unwrap();
    (temp_dir, config_path, sub_dir)
}

/// Executor that records every command instead of running it.
///
/// Commands succeed unless given an exit code with [`RecordingExecutor::fail`];
/// captured output comes from [`RecordingExecutor::stdout`].
#[derive(Default)]
pub struct RecordingExecutor {
    codes: HashMap<String, i32>,
    outputs: HashMap<String, String>,
    commands: Mutex<Vec<String>>,
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail(mut self, command: &str, code: i32) -> Self {
        self.codes.insert(command.to_string(), code);
        self
    }

    pub fn stdout(mut self, command: &str, stdout: &str) -> Self {
        self.outputs.insert(command.to_string(), stdout.to_string());
        self
    }

    /// Commands executed so far, in order
    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().unwrap().clone()
    }
}

impl Executor for RecordingExecutor {
    fn execute(&self, invocation: &Invocation) -> ProcessResult<Output> {
        self.commands
            .lock()
            .unwrap()
            .push(invocation.command.clone());

        let code = self.codes.get(&invocation.command).copied().unwrap_or(0);
        let mut output = Output::exited(code);
        if let Some(stdout) = self.outputs.get(&invocation.command) {
            output.stdout = stdout.clone();
        }
        Ok(output)
    }
}
