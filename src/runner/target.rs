//! Runtime target representation
//!
//! This differs from config::Target by carrying parsed templates and the
//! built-in action used by the help target.

use crate::config;
use crate::runner::Template;
use std::collections::BTreeSet;

/// A validated, executable target
#[derive(Debug, Clone)]
pub struct Target {
    /// Target name
    pub name: String,

    /// Description for the help listing
    pub description: Option<String>,

    /// Prerequisite targets in declared order
    pub prerequisites: Vec<String>,

    /// Conditions that, when all hold, skip the steps
    pub guard: Vec<Condition>,

    /// What running the target does
    pub action: Action,
}

/// The body of a target
#[derive(Debug, Clone)]
pub enum Action {
    /// External command steps
    Steps(Vec<Step>),

    /// Print the help listing
    Help,
}

impl Target {
    /// Create a runtime target from configuration
    pub fn from_config(name: String, config: config::Target) -> Self {
        Target {
            name,
            description: config.description.filter(|d| !d.trim().is_empty()),
            prerequisites: config.deps,
            guard: config.guard.into_iter().map(Condition::from_config).collect(),
            action: Action::Steps(config.run.into_iter().map(Step::from_config).collect()),
        }
    }

    /// The built-in help target
    pub fn help() -> Self {
        Target {
            name: config::HELP_TARGET.to_string(),
            description: Some("Show this help".to_string()),
            prerequisites: Vec::new(),
            guard: Vec::new(),
            action: Action::Help,
        }
    }

    /// Steps to run, empty for built-in actions
    pub fn steps(&self) -> &[Step] {
        match &self.action {
            Action::Steps(steps) => steps,
            Action::Help => &[],
        }
    }

    /// Every variable key referenced by this target's steps and guard
    pub fn referenced_keys(&self) -> BTreeSet<String> {
        let mut keys = BTreeSet::new();
        for step in self.steps() {
            for template in step.templates() {
                keys.extend(template.keys().iter().cloned());
            }
        }
        for condition in &self.guard {
            for template in condition.templates() {
                keys.extend(template.keys().iter().cloned());
            }
        }
        keys
    }
}

/// One external command invocation
#[derive(Debug, Clone)]
pub struct Step {
    /// Command template
    pub command: Template,

    /// Text echoed instead of the command
    pub print: Option<Template>,

    /// Do not echo the command
    pub quiet: bool,

    /// Working directory relative to the run directory
    pub dir: Option<Template>,

    /// Keep going when the command exits non-zero
    pub continue_on_error: bool,
}

impl Step {
    /// Create from config
    pub fn from_config(config: config::Step) -> Self {
        match config {
            config::Step::Simple(cmd) => Step::new(cmd),
            config::Step::Complex(detail) => Step {
                command: Template::parse(detail.exec),
                print: detail.print.map(Template::parse),
                quiet: detail.quiet,
                dir: detail.dir.map(Template::parse),
                continue_on_error: detail.continue_on_error,
            },
        }
    }

    /// A plain step that halts the run on failure
    pub fn new(command: impl Into<String>) -> Self {
        Step {
            command: Template::parse(command),
            print: None,
            quiet: false,
            dir: None,
            continue_on_error: false,
        }
    }

    /// Mark this step as best-effort
    pub fn best_effort(mut self) -> Self {
        self.continue_on_error = true;
        self
    }

    fn templates(&self) -> impl Iterator<Item = &Template> {
        std::iter::once(&self.command)
            .chain(self.print.iter())
            .chain(self.dir.iter())
    }
}

/// A guard condition
#[derive(Debug, Clone)]
pub enum Condition {
    Equal { left: Template, right: Template },
    NotEqual { left: Template, right: Template },
    Command(Template),
    Exists(Template),
    EnvSet(Template),
    EnvNotSet(Template),
}

impl Condition {
    /// Create from config; validation guarantees exactly one check is set
    pub fn from_config(config: config::Condition) -> Self {
        if let Some(eq) = config.equal {
            Condition::Equal {
                left: Template::parse(eq.left),
                right: Template::parse(eq.right),
            }
        } else if let Some(ne) = config.not_equal {
            Condition::NotEqual {
                left: Template::parse(ne.left),
                right: Template::parse(ne.right),
            }
        } else if let Some(cmd) = config.command {
            Condition::Command(Template::parse(cmd))
        } else if let Some(path) = config.exists {
            Condition::Exists(Template::parse(path))
        } else if let Some(var) = config.env_set {
            Condition::EnvSet(Template::parse(var))
        } else {
            Condition::EnvNotSet(Template::parse(config.env_not_set.unwrap_or_default()))
        }
    }

    fn templates(&self) -> Vec<&Template> {
        match self {
            Condition::Equal { left, right } | Condition::NotEqual { left, right } => {
                vec![left, right]
            }
            Condition::Command(t)
            | Condition::Exists(t)
            | Condition::EnvSet(t)
            | Condition::EnvNotSet(t) => vec![t],
        }
    }
}
