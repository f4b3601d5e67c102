//! Dependency resolution
//!
//! Turns a requested target into the ordered list of targets to run:
//! depth-first, post-order, prerequisites in declared order, each target
//! once at the position of its first resolution.

use crate::error::{ConfigError, ConfigResult};
use crate::runner::{Registry, Target};
use std::collections::HashSet;

/// Ordered, deduplicated targets for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionPlan {
    targets: Vec<String>,
}

impl ExecutionPlan {
    /// Target names in execution order
    pub fn targets(&self) -> &[String] {
        &self.targets
    }

    /// The requested target, always last
    pub fn root(&self) -> Option<&str> {
        self.targets.last().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Resolve the plan's targets against the registry they were planned from
    pub fn resolve<'r>(&self, registry: &'r Registry) -> ConfigResult<Vec<&'r Target>> {
        self.targets
            .iter()
            .map(|name| registry.lookup(name))
            .collect()
    }
}

impl IntoIterator for ExecutionPlan {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.targets.into_iter()
    }
}

/// Compute the execution plan for `root`
pub fn plan(root: &str, registry: &Registry) -> ConfigResult<ExecutionPlan> {
    let mut resolver = Resolver {
        registry,
        visiting: Vec::new(),
        done: HashSet::new(),
        order: Vec::new(),
    };
    resolver.visit(root, None)?;

    tracing::debug!(root, plan = ?resolver.order, "plan resolved");
    Ok(ExecutionPlan {
        targets: resolver.order,
    })
}

struct Resolver<'r> {
    registry: &'r Registry,
    /// Current recursion path, kept ordered to report cycles
    visiting: Vec<String>,
    done: HashSet<String>,
    order: Vec<String>,
}

impl Resolver<'_> {
    fn visit(&mut self, name: &str, referenced_by: Option<&str>) -> ConfigResult<()> {
        if self.done.contains(name) {
            return Ok(());
        }

        if let Some(start) = self.visiting.iter().position(|t| t == name) {
            let mut cycle = self.visiting[start..].to_vec();
            cycle.push(name.to_string());
            return Err(ConfigError::CircularDependency(cycle.join(" -> ")));
        }

        let registry = self.registry;
        let target = registry.lookup(name).map_err(|_| ConfigError::UnknownTarget {
            name: name.to_string(),
            referenced_by: referenced_by.map(str::to_string),
        })?;

        self.visiting.push(name.to_string());
        for prerequisite in &target.prerequisites {
            self.visit(prerequisite, Some(name))?;
        }
        self.visiting.pop();

        self.done.insert(name.to_string());
        self.order.push(name.to_string());
        Ok(())
    }
}
