//! Core configuration types
//!
//! This module defines the data structures that represent an rmk.yml configuration file.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Top-level configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Project name (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Target to run when none is given on the command line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,

    /// Global interpreter to use for commands (e.g., ["sh", "-c"])
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interpreter: Option<Vec<String>>,

    /// Variable definitions
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub vars: HashMap<String, Variable>,

    /// Targets defined in the configuration
    #[serde(default)]
    pub targets: HashMap<String, Target>,
}

/// A target definition
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Target {
    /// Description shown by the help target; undescribed targets are not listed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Prerequisite targets, in the order they should run
    #[serde(
        default,
        alias = "prerequisites",
        skip_serializing_if = "Vec::is_empty",
        deserialize_with = "deserialize_names"
    )]
    pub deps: Vec<String>,

    /// Conditions that, when all hold, skip this target's steps
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub guard: Vec<Condition>,

    /// Steps to execute
    #[serde(default, alias = "steps", deserialize_with = "deserialize_steps")]
    pub run: Vec<Step>,
}

/// A step to execute
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Step {
    /// Simple command string
    Simple(String),

    /// Command with additional options
    Complex(StepDetail),
}

/// Detailed step specification
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StepDetail {
    /// The command to execute
    pub exec: String,

    /// What to print when running (defaults to exec)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub print: Option<String>,

    /// Whether to suppress echoing the command
    #[serde(default)]
    pub quiet: bool,

    /// Working directory for the command
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,

    /// Keep going when the command exits non-zero
    #[serde(rename = "continue-on-error", default)]
    pub continue_on_error: bool,
}

/// A single guard condition
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Condition {
    /// Check if values are equal
    #[serde(skip_serializing_if = "Option::is_none")]
    pub equal: Option<Comparison>,

    /// Check if values are not equal
    #[serde(rename = "not-equal", skip_serializing_if = "Option::is_none")]
    pub not_equal: Option<Comparison>,

    /// Check if a command succeeds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,

    /// Check if a path (or glob pattern) exists
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exists: Option<String>,

    /// Check if environment variable is set
    #[serde(rename = "env-set", skip_serializing_if = "Option::is_none")]
    pub env_set: Option<String>,

    /// Check if environment variable is not set
    #[serde(rename = "env-not-set", skip_serializing_if = "Option::is_none")]
    pub env_not_set: Option<String>,
}

/// A comparison for guard conditions
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Comparison {
    /// Left-hand side of comparison
    pub left: String,

    /// Right-hand side of comparison
    pub right: String,
}

/// A variable definition: a literal default or a command whose output is the value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Variable {
    /// Plain default value
    Value(String),

    /// Value computed from a command's trimmed stdout
    Computed { command: String },
}

impl<'de> Deserialize<'de> for Variable {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::Error;
        use serde_yaml::Value;

        match Value::deserialize(deserializer)? {
            Value::String(s) => Ok(Variable::Value(s)),
            Value::Number(n) => Ok(Variable::Value(n.to_string())),
            Value::Bool(b) => Ok(Variable::Value(b.to_string())),
            Value::Null => Ok(Variable::Value(String::new())),
            Value::Mapping(map) => {
                if map.len() != 1 {
                    return Err(D::Error::custom(
                        "computed variable must contain exactly one 'command' key",
                    ));
                }
                match map.get("command") {
                    Some(Value::String(command)) => Ok(Variable::Computed {
                        command: command.clone(),
                    }),
                    _ => Err(D::Error::custom(
                        "computed variable must contain a 'command' string",
                    )),
                }
            }
            _ => Err(D::Error::custom(
                "variable must be a string, number, boolean, or {command: ...}",
            )),
        }
    }
}

/// Custom deserializer for prerequisite names that handles both a single name and a list
fn deserialize_names<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;
    use serde_yaml::Value;

    let value = Value::deserialize(deserializer)?;

    match value {
        Value::String(s) => Ok(s.split_whitespace().map(str::to_string).collect()),
        Value::Sequence(seq) => seq
            .into_iter()
            .map(|item| match item {
                Value::String(s) => Ok(s),
                _ => Err(D::Error::custom("prerequisite names must be strings")),
            })
            .collect(),
        Value::Null => Ok(Vec::new()),
        _ => Err(D::Error::custom("deps must be a string or array")),
    }
}

/// Custom deserializer for steps that handles both single values and arrays
fn deserialize_steps<'de, D>(deserializer: D) -> Result<Vec<Step>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;
    use serde_yaml::Value;

    let value = Value::deserialize(deserializer)?;

    match value {
        // Single string or detailed step
        Value::String(s) => Ok(vec![Step::Simple(s)]),
        Value::Mapping(_) => {
            let step = Step::deserialize(value).map_err(D::Error::custom)?;
            Ok(vec![step])
        }
        // Array of steps
        Value::Sequence(seq) => {
            let mut steps = Vec::new();
            for item in seq {
                let step = Step::deserialize(item).map_err(D::Error::custom)?;
                steps.push(step);
            }
            Ok(steps)
        }
        Value::Null => Ok(Vec::new()),
        _ => Err(D::Error::custom("run must be a string, object, or array")),
    }
}
