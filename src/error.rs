//! Error types for rmk

use std::io;
use thiserror::Error;

/// Result type alias for rmk operations
pub type Result<T> = std::result::Result<T, RmkError>;

/// Main error type for rmk
#[derive(Error, Debug)]
pub enum RmkError {
    /// Configuration and registry errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Variable resolution errors
    #[error("Variable error: {0}")]
    Variable(#[from] VariableError),

    /// Target execution errors
    #[error("Execution error: {0}")]
    Execution(#[from] ExecutionError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// YAML parsing errors
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Configuration parsing, validation and planning errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to find config file (searched: {0})")]
    NotFound(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Target '{name}' is not defined{}", required_by(.referenced_by))]
    UnknownTarget {
        name: String,
        referenced_by: Option<String>,
    },

    #[error("Circular dependency detected: {0}")]
    CircularDependency(String),

    #[error("Target name '{0}' is reserved")]
    ReservedName(String),
}

fn required_by(referenced_by: &Option<String>) -> String {
    referenced_by
        .as_ref()
        .map(|r| format!(" (required by '{}')", r))
        .unwrap_or_default()
}

impl ConfigError {
    /// Unknown target requested directly rather than through a prerequisite
    pub fn unknown_target(name: impl Into<String>) -> Self {
        ConfigError::UnknownTarget {
            name: name.into(),
            referenced_by: None,
        }
    }
}

/// Variable resolution errors
#[derive(Error, Debug)]
pub enum VariableError {
    #[error("Command for variable '{key}' failed with exit code {code:?}")]
    Computation { key: String, code: Option<i32> },

    #[error("Command for variable '{key}' could not be started: {source}")]
    Process {
        key: String,
        #[source]
        source: ProcessError,
    },

    #[error(transparent)]
    Interpolation(#[from] InterpolationError),
}

/// Template substitution errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InterpolationError {
    #[error("Variable '{0}' is not defined")]
    UndefinedVariable(String),

    #[error("Recursive interpolation detected: {0}")]
    RecursiveInterpolation(String),
}

/// Failures to run an external process at all
#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("No interpreter configured")]
    NoInterpreter,

    #[error("Failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
}

/// Target execution errors
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Target '{target}': {error}")]
    Interpolation {
        target: String,
        error: InterpolationError,
    },

    #[error("Target '{target}': {source}")]
    Process {
        target: String,
        #[source]
        source: ProcessError,
    },

    #[error("Failed to write output: {0}")]
    Output(#[from] io::Error),
}

/// Specialized result type for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Specialized result type for variable resolution
pub type VariableResult<T> = std::result::Result<T, VariableError>;

/// Specialized result type for execution operations
pub type ExecutionResult<T> = std::result::Result<T, ExecutionError>;

/// Specialized result type for interpolation operations
pub type InterpolationResult<T> = std::result::Result<T, InterpolationError>;

/// Specialized result type for process execution
pub type ProcessResult<T> = std::result::Result<T, ProcessError>;
