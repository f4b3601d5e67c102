//! Variable resolution
//!
//! Values come from three layers: declared defaults, caller overrides, and
//! commands whose trimmed stdout becomes the value. Computed values are
//! only produced for keys the plan actually references.

use crate::config;
use crate::error::{InterpolationError, VariableError, VariableResult};
use crate::runner::{Executor, Invocation, OutputMode, Target, Template};
use std::collections::{BTreeSet, HashMap};
use std::env;
use std::path::PathBuf;

/// Where a variable's value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Default,
    EnvironmentOverride,
    ComputedFromCommand,
}

/// A resolved variable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub value: String,
    pub source: Source,
}

/// Resolved variables for one run; immutable once built
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Variables {
    bindings: HashMap<String, Binding>,
}

impl Variables {
    /// Bind plain values, all marked as overrides
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Variables {
            bindings: pairs
                .into_iter()
                .map(|(k, v)| {
                    (
                        k.into(),
                        Binding {
                            value: v.into(),
                            source: Source::EnvironmentOverride,
                        },
                    )
                })
                .collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.bindings.get(key).map(|b| b.value.as_str())
    }

    pub fn binding(&self, key: &str) -> Option<&Binding> {
        self.bindings.get(key)
    }

    /// Value for substitution: a binding, else the process environment
    pub fn lookup(&self, key: &str) -> Option<String> {
        self.get(key)
            .map(str::to_string)
            .or_else(|| env::var(key).ok())
    }

    /// Render a template against these variables
    pub fn render(&self, template: &Template) -> Result<String, InterpolationError> {
        template.render(|key| self.lookup(key))
    }

    /// Bindings sorted by key, for exporting into step environments
    pub fn env(&self) -> Vec<(String, String)> {
        let mut env: Vec<(String, String)> = self
            .bindings
            .iter()
            .map(|(k, b)| (k.clone(), b.value.clone()))
            .collect();
        env.sort();
        env
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// How a declared variable gets its value
#[derive(Debug, Clone)]
enum Definition {
    Default(Template),
    Computed(Template),
}

impl Definition {
    fn template(&self) -> &Template {
        match self {
            Definition::Default(t) | Definition::Computed(t) => t,
        }
    }
}

/// Resolves declared variables against overrides
pub struct VariableResolver<'a> {
    definitions: HashMap<String, Definition>,
    executor: &'a dyn Executor,
    working_dir: PathBuf,
}

impl<'a> VariableResolver<'a> {
    pub fn new(
        vars: &HashMap<String, config::Variable>,
        executor: &'a dyn Executor,
        working_dir: PathBuf,
    ) -> Self {
        let definitions = vars
            .iter()
            .map(|(key, var)| {
                let definition = match var {
                    config::Variable::Value(value) => Definition::Default(Template::parse(value)),
                    config::Variable::Computed { command } => {
                        Definition::Computed(Template::parse(command))
                    }
                };
                (key.clone(), definition)
            })
            .collect();

        VariableResolver {
            definitions,
            executor,
            working_dir,
        }
    }

    /// Whether a key is declared in the configuration
    pub fn is_declared(&self, key: &str) -> bool {
        self.definitions.contains_key(key)
    }

    /// Declared keys, sorted
    pub fn declared_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.definitions.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    /// Resolve every variable a run needs.
    ///
    /// `referenced` lists keys used by the planned targets; only their
    /// transitive closure and the override keys are expanded, so computed
    /// variables outside it are never run. Every referenced key must
    /// resolve to a binding or an environment variable.
    pub fn resolve(
        &self,
        overrides: &HashMap<String, String>,
        referenced: &BTreeSet<String>,
    ) -> VariableResult<Variables> {
        let mut state = Resolution {
            resolver: self,
            overrides,
            resolved: HashMap::new(),
            in_progress: Vec::new(),
        };

        for key in referenced {
            state.resolve_key(key)?;
        }

        for key in overrides.keys() {
            state.resolve_key(key)?;
        }

        // Unreferenced literal defaults are exported as-is; anything that
        // would need expansion stays unresolved
        for (key, definition) in &self.definitions {
            if let Definition::Default(template) = definition {
                if template.keys().is_empty() && !state.resolved.contains_key(key) {
                    let value = template.render(|_| None)?;
                    state.bind(key, value, Source::Default);
                }
            }
        }

        Ok(Variables {
            bindings: state.resolved,
        })
    }
}

struct Resolution<'r, 'a> {
    resolver: &'r VariableResolver<'a>,
    overrides: &'r HashMap<String, String>,
    resolved: HashMap<String, Binding>,
    in_progress: Vec<String>,
}

impl Resolution<'_, '_> {
    /// Resolve one key; keys with no binding must exist in the environment
    fn resolve_key(&mut self, key: &str) -> VariableResult<()> {
        if self.resolved.contains_key(key) {
            return Ok(());
        }

        if let Some(value) = self.overrides.get(key) {
            self.bind(key, value.clone(), Source::EnvironmentOverride);
            return Ok(());
        }

        let resolver = self.resolver;
        let Some(definition) = resolver.definitions.get(key) else {
            return match env::var(key) {
                Ok(_) => Ok(()),
                Err(_) => Err(InterpolationError::UndefinedVariable(key.to_string()).into()),
            };
        };

        if self.in_progress.iter().any(|k| k == key) {
            let mut chain = self.in_progress.clone();
            chain.push(key.to_string());
            return Err(InterpolationError::RecursiveInterpolation(chain.join(" -> ")).into());
        }

        self.in_progress.push(key.to_string());
        let rendered = self.render(definition.template());
        self.in_progress.pop();
        let rendered = rendered?;

        match definition {
            Definition::Default(_) => self.bind(key, rendered, Source::Default),
            Definition::Computed(_) => {
                let value = self.compute(key, rendered)?;
                self.bind(key, value, Source::ComputedFromCommand);
            }
        }
        Ok(())
    }

    fn render(&mut self, template: &Template) -> VariableResult<String> {
        for dependency in template.keys() {
            self.resolve_key(dependency)?;
        }
        let resolved = &self.resolved;
        let rendered = template.render(|k| {
            resolved
                .get(k)
                .map(|b| b.value.clone())
                .or_else(|| env::var(k).ok())
        })?;
        Ok(rendered)
    }

    fn compute(&self, key: &str, command: String) -> VariableResult<String> {
        tracing::debug!(key, command = %command, "computing variable");

        let invocation = Invocation::new(
            command,
            self.resolver.working_dir.clone(),
            OutputMode::Capture,
        );
        let output = self
            .resolver
            .executor
            .execute(&invocation)
            .map_err(|source| VariableError::Process {
                key: key.to_string(),
                source,
            })?;

        if !output.success() {
            return Err(VariableError::Computation {
                key: key.to_string(),
                code: output.code,
            });
        }
        Ok(output.stdout.trim().to_string())
    }

    fn bind(&mut self, key: &str, value: String, source: Source) {
        self.resolved
            .insert(key.to_string(), Binding { value, source });
    }
}

/// Every variable key referenced by the targets of a plan
pub fn referenced_keys<'t>(targets: impl IntoIterator<Item = &'t Target>) -> BTreeSet<String> {
    targets
        .into_iter()
        .flat_map(Target::referenced_keys)
        .collect()
}
