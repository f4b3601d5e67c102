//! Target registry
//!
//! The registry is built once from a validated configuration and never
//! changes afterwards; planning and execution only borrow it.

use crate::config::{self, validate_config, Config, HELP_TARGET};
use crate::error::{ConfigError, ConfigResult};
use crate::runner::Target;
use std::collections::HashMap;

/// Immutable set of all targets
#[derive(Debug, Clone)]
pub struct Registry {
    targets: HashMap<String, Target>,
    default_target: String,
}

impl Registry {
    /// Validate the configuration and build the registry from it
    pub fn from_config(config: &Config) -> ConfigResult<Self> {
        validate_config(config)?;

        let mut targets: HashMap<String, Target> = config
            .targets
            .iter()
            .map(|(name, target)| {
                (
                    name.clone(),
                    Target::from_config(name.clone(), target.clone()),
                )
            })
            .collect();
        targets.insert(HELP_TARGET.to_string(), Target::help());

        let default_target = config
            .default
            .clone()
            .unwrap_or_else(|| HELP_TARGET.to_string());

        tracing::debug!(targets = targets.len(), default = %default_target, "registry built");

        Ok(Registry {
            targets,
            default_target,
        })
    }

    /// Build a registry directly from runtime targets (used by tests and embedders)
    pub fn from_targets(targets: impl IntoIterator<Item = Target>) -> ConfigResult<Self> {
        let mut config = Config::default();
        let mut built = HashMap::new();

        for target in targets {
            let name = target.name.clone();
            if built.contains_key(&name) {
                return Err(ConfigError::Invalid(format!(
                    "Target '{}' is defined more than once",
                    name
                )));
            }
            // Reuse config validation for names, dangling references and cycles
            config.targets.insert(
                name.clone(),
                config::Target {
                    deps: target.prerequisites.clone(),
                    ..config::Target::default()
                },
            );
            built.insert(name, target);
        }
        validate_config(&config)?;

        built.insert(HELP_TARGET.to_string(), Target::help());
        Ok(Registry {
            targets: built,
            default_target: HELP_TARGET.to_string(),
        })
    }

    /// Build without validation so planning-time checks can be exercised
    #[cfg(test)]
    pub(crate) fn unchecked(targets: Vec<Target>) -> Self {
        Registry {
            targets: targets.into_iter().map(|t| (t.name.clone(), t)).collect(),
            default_target: HELP_TARGET.to_string(),
        }
    }

    /// Look up a target by name
    pub fn lookup(&self, name: &str) -> ConfigResult<&Target> {
        self.targets
            .get(name)
            .ok_or_else(|| ConfigError::unknown_target(name))
    }

    /// All targets, in no particular order
    pub fn all(&self) -> impl Iterator<Item = &Target> {
        self.targets.values()
    }

    /// Target run when none is requested
    pub fn default_target(&self) -> &str {
        &self.default_target
    }

    /// Number of targets, including the built-in help target
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Whether the registry holds no targets at all
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;
    use crate::runner::Step;

    fn target(name: &str, deps: &[&str]) -> Target {
        let mut t = Target::from_config(name.to_string(), config::Target::default());
        t.prerequisites = deps.iter().map(|d| d.to_string()).collect();
        t.action = crate::runner::Action::Steps(vec![Step::new(format!("echo {}", name))]);
        t
    }

    #[test]
    fn test_from_config_adds_help() {
        let config = parse_config(
            r#"
targets:
  build:
    description: Build it
    run: make
"#,
        )
        .unwrap();
        let registry = Registry::from_config(&config).unwrap();
        assert_eq!(registry.len(), 2);
        assert!(registry.lookup("help").is_ok());
        assert_eq!(registry.default_target(), "help");
    }

    #[test]
    fn test_configured_default() {
        let config = parse_config(
            r#"
default: build
targets:
  build:
    run: make
"#,
        )
        .unwrap();
        let registry = Registry::from_config(&config).unwrap();
        assert_eq!(registry.default_target(), "build");
    }

    #[test]
    fn test_lookup_unknown() {
        let registry = Registry::from_targets(vec![target("a", &[])]).unwrap();
        match registry.lookup("nope") {
            Err(ConfigError::UnknownTarget { name, .. }) => assert_eq!(name, "nope"),
            other => panic!("expected unknown target, got {:?}", other),
        }
    }

    #[test]
    fn test_from_targets_rejects_cycles() {
        let result = Registry::from_targets(vec![target("a", &["b"]), target("b", &["a"])]);
        assert!(matches!(result, Err(ConfigError::CircularDependency(_))));
    }

    #[test]
    fn test_from_targets_rejects_duplicates() {
        let result = Registry::from_targets(vec![target("a", &[]), target("a", &[])]);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_from_targets_rejects_dangling() {
        let result = Registry::from_targets(vec![target("a", &["ghost"])]);
        assert!(matches!(result, Err(ConfigError::UnknownTarget { .. })));
    }
}
