//! Configuration validation
//!
//! This module provides validation logic for configuration files.

use crate::config::types::{Condition, Config};
use crate::error::{ConfigError, ConfigResult};
use std::collections::HashSet;

/// Name of the built-in self-documentation target
pub const HELP_TARGET: &str = "help";

/// Validate a complete configuration
pub fn validate_config(config: &Config) -> ConfigResult<()> {
    if let Some(interpreter) = &config.interpreter {
        if interpreter.is_empty() {
            return Err(ConfigError::Invalid(
                "interpreter must name at least one program".to_string(),
            ));
        }
    }

    let mut names: Vec<&String> = config.targets.keys().collect();
    names.sort();

    for name in &names {
        validate_target(name, config)?;
    }

    if let Some(default) = &config.default {
        if default != HELP_TARGET && !config.targets.contains_key(default) {
            return Err(ConfigError::UnknownTarget {
                name: default.clone(),
                referenced_by: Some("default".to_string()),
            });
        }
    }

    detect_circular_dependencies(config, &names)?;

    Ok(())
}

/// Validate a single target
fn validate_target(name: &str, config: &Config) -> ConfigResult<()> {
    if name == HELP_TARGET {
        return Err(ConfigError::ReservedName(name.to_string()));
    }
    if name.is_empty() || name.contains(char::is_whitespace) || name.contains('=') {
        return Err(ConfigError::Invalid(format!(
            "Invalid target name '{}': names must be non-empty and contain no whitespace or '='",
            name
        )));
    }

    let target = &config.targets[name];

    for dep in &target.deps {
        if dep != HELP_TARGET && !config.targets.contains_key(dep) {
            return Err(ConfigError::UnknownTarget {
                name: dep.clone(),
                referenced_by: Some(name.to_string()),
            });
        }
    }

    for condition in &target.guard {
        validate_condition(name, condition)?;
    }

    Ok(())
}

/// A guard condition must set exactly one check
fn validate_condition(target: &str, condition: &Condition) -> ConfigResult<()> {
    let set = [
        condition.equal.is_some(),
        condition.not_equal.is_some(),
        condition.command.is_some(),
        condition.exists.is_some(),
        condition.env_set.is_some(),
        condition.env_not_set.is_some(),
    ]
    .iter()
    .filter(|set| **set)
    .count();

    if set != 1 {
        return Err(ConfigError::Invalid(format!(
            "Guard condition in target '{}' must set exactly one check (found {})",
            target, set
        )));
    }
    Ok(())
}

/// Detect circular dependencies between targets
fn detect_circular_dependencies(config: &Config, names: &[&String]) -> ConfigResult<()> {
    let mut visited = HashSet::new();
    for name in names {
        let mut stack = Vec::new();
        check_target_cycle(config, name, &mut visited, &mut stack)?;
    }
    Ok(())
}

/// Recursively check for cycles in target dependencies
fn check_target_cycle(
    config: &Config,
    target_name: &str,
    visited: &mut HashSet<String>,
    stack: &mut Vec<String>,
) -> ConfigResult<()> {
    if let Some(start) = stack.iter().position(|t| t == target_name) {
        let mut cycle = stack[start..].to_vec();
        cycle.push(target_name.to_string());
        return Err(ConfigError::CircularDependency(cycle.join(" -> ")));
    }

    if visited.contains(target_name) {
        return Ok(());
    }

    // The built-in help target has no prerequisites
    let Some(target) = config.targets.get(target_name) else {
        return Ok(());
    };

    stack.push(target_name.to_string());
    for dep in &target.deps {
        check_target_cycle(config, dep, visited, stack)?;
    }
    stack.pop();
    visited.insert(target_name.to_string());

    Ok(())
}
