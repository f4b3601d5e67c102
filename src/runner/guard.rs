//! Guard evaluation
//!
//! A guard is satisfied when every one of its conditions holds; a
//! satisfied guard skips the target's steps. Guards only read state.

use crate::error::{ExecutionError, ExecutionResult, InterpolationError, ProcessError};
use crate::runner::{Condition, Context, Executor, Invocation, OutputMode, Target, Variables};
use std::env;
use std::path::Path;
use thiserror::Error;

/// Evaluate a target's guard; a target without conditions is never skipped
pub fn guard_satisfied(
    target: &Target,
    ctx: &Context,
    vars: &Variables,
    executor: &dyn Executor,
) -> ExecutionResult<bool> {
    if target.guard.is_empty() {
        return Ok(false);
    }

    for condition in &target.guard {
        let holds = evaluate_condition(condition, ctx, vars, executor).map_err(|e| match e {
            GuardError::Interpolation(error) => ExecutionError::Interpolation {
                target: target.name.clone(),
                error,
            },
            GuardError::Process(source) => ExecutionError::Process {
                target: target.name.clone(),
                source,
            },
        })?;

        tracing::debug!(target_name = %target.name, ?condition, holds, "guard condition");
        if !holds {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Errors while evaluating a single condition
#[derive(Error, Debug)]
pub enum GuardError {
    #[error(transparent)]
    Interpolation(#[from] InterpolationError),

    #[error(transparent)]
    Process(#[from] ProcessError),
}

/// Evaluate a single condition
pub fn evaluate_condition(
    condition: &Condition,
    ctx: &Context,
    vars: &Variables,
    executor: &dyn Executor,
) -> Result<bool, GuardError> {
    match condition {
        Condition::Equal { left, right } => Ok(vars.render(left)? == vars.render(right)?),

        Condition::NotEqual { left, right } => Ok(vars.render(left)? != vars.render(right)?),

        Condition::Command(cmd) => {
            let invocation = Invocation::new(
                vars.render(cmd)?,
                ctx.working_dir.clone(),
                OutputMode::Silent,
            )
            .with_env(vars.env());
            let output = executor.execute(&invocation)?;
            Ok(output.success())
        }

        Condition::Exists(path) => Ok(path_exists(&ctx.working_dir, &vars.render(path)?)),

        Condition::EnvSet(name) => Ok(env::var_os(vars.render(name)?).is_some()),

        Condition::EnvNotSet(name) => Ok(env::var_os(vars.render(name)?).is_none()),
    }
}

/// Whether a path, or anything matching a glob pattern, exists
fn path_exists(base: &Path, pattern: &str) -> bool {
    let full = base.join(pattern);

    if !pattern.contains(['*', '?', '[']) {
        return full.exists();
    }

    let Some(full) = full.to_str() else {
        return false;
    };
    match glob::glob(full) {
        Ok(mut paths) => paths.any(|p| p.is_ok()),
        Err(e) => {
            tracing::warn!(pattern, error = %e, "invalid glob pattern in guard");
            false
        }
    }
}
