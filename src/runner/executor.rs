//! Process execution
//!
//! Every external process the runner starts goes through [`Executor`], so
//! tests can substitute canned exit codes for real processes.

use crate::error::{ProcessError, ProcessResult};
use std::path::PathBuf;
use std::process::{Command as StdCommand, Stdio};

/// What to do with a process's output streams
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Pass stdout and stderr through to the runner's own streams
    Inherit,
    /// Capture stdout, pass stderr through
    Capture,
    /// Discard both streams
    Silent,
}

/// One command to run through the interpreter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Fully substituted command text
    pub command: String,
    /// Working directory
    pub dir: PathBuf,
    /// Extra environment for the process
    pub env: Vec<(String, String)>,
    pub output: OutputMode,
}

impl Invocation {
    pub fn new(command: impl Into<String>, dir: impl Into<PathBuf>, output: OutputMode) -> Self {
        Invocation {
            command: command.into(),
            dir: dir.into(),
            env: Vec::new(),
            output,
        }
    }

    /// Set environment variables for the process
    pub fn with_env<I, K, V>(mut self, env: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env = env.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        self
    }
}

/// Result of a finished process
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Output {
    /// Exit code, `None` when the process was killed by a signal
    pub code: Option<i32>,
    /// Captured stdout, empty unless [`OutputMode::Capture`] was requested
    pub stdout: String,
}

impl Output {
    /// A finished process with the given exit code and no captured output
    pub fn exited(code: i32) -> Self {
        Output {
            code: Some(code),
            stdout: String::new(),
        }
    }

    /// Whether the process exited with status 0
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Runs commands on behalf of the engine and the variable resolver
#[cfg_attr(test, mockall::automock)]
pub trait Executor {
    /// Run a command to completion.
    ///
    /// A non-zero exit is still `Ok`; `Err` means the process never ran.
    fn execute(&self, invocation: &Invocation) -> ProcessResult<Output>;
}

/// Executor that runs commands through a shell interpreter such as `sh -c`
#[derive(Debug, Clone)]
pub struct ShellExecutor {
    interpreter: Vec<String>,
}

impl ShellExecutor {
    pub fn new(interpreter: Vec<String>) -> Self {
        ShellExecutor { interpreter }
    }
}

impl Default for ShellExecutor {
    fn default() -> Self {
        ShellExecutor::new(default_interpreter())
    }
}

/// Interpreter used when the configuration names none
pub fn default_interpreter() -> Vec<String> {
    if cfg!(windows) {
        vec!["cmd".to_string(), "/C".to_string()]
    } else {
        vec!["sh".to_string(), "-c".to_string()]
    }
}

impl Executor for ShellExecutor {
    fn execute(&self, invocation: &Invocation) -> ProcessResult<Output> {
        let (program, interpreter_args) = self
            .interpreter
            .split_first()
            .ok_or(ProcessError::NoInterpreter)?;

        let mut command = StdCommand::new(program);
        command
            .args(interpreter_args)
            .arg(&invocation.command)
            .current_dir(&invocation.dir)
            .envs(invocation.env.iter().map(|(k, v)| (k, v)));

        let spawn_error = |source| ProcessError::Spawn {
            program: program.clone(),
            source,
        };

        tracing::trace!(command = %invocation.command, dir = %invocation.dir.display(), "spawning");

        match invocation.output {
            OutputMode::Inherit => {
                let status = command
                    .stdin(Stdio::inherit())
                    .stdout(Stdio::inherit())
                    .stderr(Stdio::inherit())
                    .status()
                    .map_err(spawn_error)?;
                Ok(Output {
                    code: status.code(),
                    stdout: String::new(),
                })
            }
            OutputMode::Capture => {
                let output = command
                    .stdin(Stdio::null())
                    .stderr(Stdio::inherit())
                    .output()
                    .map_err(spawn_error)?;
                Ok(Output {
                    code: output.status.code(),
                    stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                })
            }
            OutputMode::Silent => {
                let status = command
                    .stdin(Stdio::null())
                    .stdout(Stdio::null())
                    .stderr(Stdio::null())
                    .status()
                    .map_err(spawn_error)?;
                Ok(Output {
                    code: status.code(),
                    stdout: String::new(),
                })
            }
        }
    }
}
