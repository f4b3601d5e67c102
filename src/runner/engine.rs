//! Execution engine
//!
//! Runs a plan target by target. A satisfied guard skips a target's steps;
//! the first failing step that is not best-effort halts the whole run.

use crate::error::{ExecutionError, ExecutionResult};
use crate::runner::{
    guard_satisfied, help, Action, Context, ExecutionPlan, Executor, Invocation, OutputMode,
    Registry, Step, Target, Variables,
};
use std::fmt;
use std::io::Write;

/// A step that exited non-zero and halted the run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepFailure {
    /// Target the step belongs to
    pub target: String,
    /// Zero-based index of the step within the target
    pub step: usize,
    /// Rendered command text
    pub command: String,
    /// Exit code, `None` when killed by a signal
    pub code: Option<i32>,
}

impl fmt::Display for StepFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self.code {
            Some(code) => format!("exit code {}", code),
            None => "a signal".to_string(),
        };
        write!(
            f,
            "target '{}' step {} ({}) failed with {}",
            self.target,
            self.step + 1,
            self.command,
            code
        )
    }
}

/// Outcome of one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunResult {
    /// Targets whose body ran, in order
    pub executed: Vec<String>,
    /// Targets skipped by their guard
    pub skipped: Vec<String>,
    /// Where the run stopped, if it did
    pub failure: Option<StepFailure>,
}

impl RunResult {
    pub fn success(&self) -> bool {
        self.failure.is_none()
    }

    /// Process exit code for the run
    pub fn exit_code(&self) -> i32 {
        match &self.failure {
            None => 0,
            Some(failure) => failure.code.filter(|c| *c != 0).unwrap_or(1),
        }
    }
}

/// Runs plans against a registry
pub struct Engine<'a> {
    registry: &'a Registry,
    executor: &'a dyn Executor,
    ctx: &'a Context,
}

impl<'a> Engine<'a> {
    pub fn new(registry: &'a Registry, executor: &'a dyn Executor, ctx: &'a Context) -> Self {
        Engine {
            registry,
            executor,
            ctx,
        }
    }

    /// Run every target of the plan in order.
    ///
    /// Help output is written to `out`; step output goes straight to the
    /// runner's own stdout and stderr.
    pub fn run<W: Write>(
        &self,
        plan: ExecutionPlan,
        vars: &Variables,
        out: &mut W,
    ) -> ExecutionResult<RunResult> {
        let targets = plan.resolve(self.registry)?;
        let mut result = RunResult::default();

        for target in targets {
            if self.ctx.dry_run {
                self.describe(target, vars, out)?;
                continue;
            }

            if guard_satisfied(target, self.ctx, vars, self.executor)? {
                self.ctx.print_target_skip(&target.name, "guard satisfied");
                result.skipped.push(target.name.clone());
                continue;
            }

            match &target.action {
                Action::Help => {
                    out.write_all(help::format_help(&help::render(self.registry)).as_bytes())?;
                }
                Action::Steps(steps) => {
                    self.ctx.print_target_start(&target.name);
                    if let Some(failure) = self.run_steps(target, steps, vars)? {
                        self.ctx.print_error(&failure.to_string());
                        result.failure = Some(failure);
                        return Ok(result);
                    }
                }
            }
            self.ctx.print_target_complete(&target.name);
            result.executed.push(target.name.clone());
        }

        Ok(result)
    }

    /// Run a target's steps, returning the failure that halts the run
    fn run_steps(
        &self,
        target: &Target,
        steps: &[Step],
        vars: &Variables,
    ) -> ExecutionResult<Option<StepFailure>> {
        for (index, step) in steps.iter().enumerate() {
            let invocation = self.invocation(target, step, vars)?;

            if !step.quiet {
                let shown = match &step.print {
                    Some(print) => vars
                        .render(print)
                        .map_err(|error| interpolation(target, error))?,
                    None => invocation.command.clone(),
                };
                self.ctx.print_command(&shown);
            }

            let output = self
                .executor
                .execute(&invocation)
                .map_err(|source| ExecutionError::Process {
                    target: target.name.clone(),
                    source,
                })?;
            tracing::debug!(
                target_name = %target.name,
                step = index,
                code = ?output.code,
                "step finished"
            );

            if output.success() {
                continue;
            }

            if step.continue_on_error {
                self.ctx.print_warning(&format!(
                    "Ignoring failure of '{}' in target '{}' (exit code {:?})",
                    invocation.command, target.name, output.code
                ));
                continue;
            }

            return Ok(Some(StepFailure {
                target: target.name.clone(),
                step: index,
                command: invocation.command,
                code: output.code,
            }));
        }
        Ok(None)
    }

    fn invocation(
        &self,
        target: &Target,
        step: &Step,
        vars: &Variables,
    ) -> ExecutionResult<Invocation> {
        let command = vars
            .render(&step.command)
            .map_err(|error| interpolation(target, error))?;

        let dir = match &step.dir {
            Some(dir) => self.ctx.working_dir.join(
                vars.render(dir)
                    .map_err(|error| interpolation(target, error))?,
            ),
            None => self.ctx.working_dir.clone(),
        };

        Ok(Invocation::new(command, dir, OutputMode::Inherit).with_env(vars.env()))
    }

    /// Dry run: show what a target would do without evaluating its guard
    fn describe<W: Write>(
        &self,
        target: &Target,
        vars: &Variables,
        out: &mut W,
    ) -> ExecutionResult<()> {
        writeln!(out, "{}:", target.name)?;
        if !target.guard.is_empty() {
            writeln!(
                out,
                "  (guarded: skipped when {} condition(s) hold)",
                target.guard.len()
            )?;
        }
        match &target.action {
            Action::Help => writeln!(out, "  <print help>")?,
            Action::Steps(steps) => {
                for step in steps {
                    let command = vars
                        .render(&step.command)
                        .map_err(|error| interpolation(target, error))?;
                    let marker = if step.continue_on_error { "-" } else { " " };
                    match &step.dir {
                        Some(dir) => {
                            let dir = vars
                                .render(dir)
                                .map_err(|error| interpolation(target, error))?;
                            writeln!(out, " {} {}  (in {})", marker, command, dir)?;
                        }
                        None => writeln!(out, " {} {}", marker, command)?,
                    }
                }
            }
        }
        Ok(())
    }
}

fn interpolation(target: &Target, error: crate::error::InterpolationError) -> ExecutionError {
    ExecutionError::Interpolation {
        target: target.name.clone(),
        error,
    }
}
