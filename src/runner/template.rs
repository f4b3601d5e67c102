//! Command templates and variable substitution
//!
//! A template is command text with `${KEY}` references parsed out once, at
//! registry construction. `$${KEY}` renders as a literal `${KEY}` for the
//! shell; any other `$` form is left untouched.

use crate::error::{InterpolationError, InterpolationResult};
use regex::{Captures, Regex};
use std::collections::HashSet;
use std::sync::OnceLock;

fn reference_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(\$?)\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("reference pattern is valid")
    })
}

/// Command text plus the variable keys it references
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    raw: String,
    keys: Vec<String>,
}

impl Template {
    /// Parse a template, collecting referenced keys in first-use order
    pub fn parse(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let mut seen = HashSet::new();
        let keys = reference_regex()
            .captures_iter(&raw)
            .filter(|caps| caps[1].is_empty())
            .map(|caps| caps[2].to_string())
            .filter(|key| seen.insert(key.clone()))
            .collect();

        Template { raw, keys }
    }

    /// The unrendered text
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Keys referenced by this template
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Substitute every reference through `lookup`, failing on the first missing key
    pub fn render<F>(&self, lookup: F) -> InterpolationResult<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(missing) = self.keys.iter().find(|key| lookup(key).is_none()) {
            return Err(InterpolationError::UndefinedVariable(missing.clone()));
        }

        let rendered = reference_regex().replace_all(&self.raw, |caps: &Captures| {
            if caps[1].is_empty() {
                lookup(&caps[2]).unwrap_or_default()
            } else {
                format!("${{{}}}", &caps[2])
            }
        });

        Ok(rendered.into_owned())
    }
}

impl From<&str> for Template {
    fn from(raw: &str) -> Self {
        Template::parse(raw)
    }
}

impl std::fmt::Display for Template {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}
