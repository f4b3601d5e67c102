//! Execution context for a run
//!
//! The context holds the per-run settings shared by every target and the
//! verbosity-gated progress output written to stderr.

use colored::Colorize;
use std::env;
use std::path::PathBuf;

/// Settings shared by every target in a run
#[derive(Debug, Clone)]
pub struct Context {
    /// Directory steps run in
    pub working_dir: PathBuf,

    /// Configuration file path
    pub config_path: Option<PathBuf>,

    /// Verbosity level
    pub verbosity: Verbosity,

    /// Print what would run without running anything
    pub dry_run: bool,
}

/// Verbosity levels for output
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    Silent = 0,
    Quiet = 1,
    #[default]
    Normal = 2,
    Verbose = 3,
}

impl Context {
    /// Create a new context with default settings
    pub fn new() -> Self {
        Context {
            working_dir: env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_path: None,
            verbosity: Verbosity::Normal,
            dry_run: false,
        }
    }

    /// Create a context with a specific working directory
    pub fn with_working_dir(mut self, dir: PathBuf) -> Self {
        self.working_dir = dir;
        self
    }

    /// Set the configuration file path; steps then run in its directory
    pub fn with_config_path(mut self, path: PathBuf) -> Self {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            self.working_dir = parent.to_path_buf();
        }
        self.config_path = Some(path);
        self
    }

    /// Set verbosity level
    pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Enable or disable dry-run mode
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Print info message
    pub fn print_info(&self, message: &str) {
        if self.verbosity >= Verbosity::Normal {
            eprintln!("{} {}", "[INFO]".cyan(), message);
        }
    }

    /// Print warning message
    pub fn print_warning(&self, message: &str) {
        if self.verbosity >= Verbosity::Quiet {
            eprintln!("{} {}", "[WARN]".yellow(), message);
        }
    }

    /// Print error message
    pub fn print_error(&self, message: &str) {
        if self.verbosity >= Verbosity::Quiet {
            eprintln!("{} {}", "[ERROR]".red().bold(), message);
        }
    }

    /// Print debug message (only in verbose mode)
    pub fn print_debug(&self, message: &str) {
        if self.verbosity >= Verbosity::Verbose {
            eprintln!("{} {}", "[DEBUG]".dimmed(), message);
        }
    }

    /// Echo a command before running it
    pub fn print_command(&self, command: &str) {
        if self.verbosity >= Verbosity::Normal {
            eprintln!("{} {}", "[RUN]".green(), command);
        }
    }

    /// Print target start message
    pub fn print_target_start(&self, target: &str) {
        self.print_info(&format!("Running target: {}", target.bold()));
    }

    /// Print target complete message
    pub fn print_target_complete(&self, target: &str) {
        self.print_debug(&format!("Target completed: {}", target));
    }

    /// Print target skip message
    pub fn print_target_skip(&self, target: &str, reason: &str) {
        self.print_info(&format!("Skipping target '{}': {}", target, reason));
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_new() {
        let ctx = Context::new();
        assert_eq!(ctx.verbosity, Verbosity::Normal);
        assert!(!ctx.dry_run);
        assert!(ctx.config_path.is_none());
    }

    #[test]
    fn test_config_path_sets_working_dir() {
        let ctx = Context::new().with_config_path(PathBuf::from("/project/rmk.yml"));
        assert_eq!(ctx.working_dir, PathBuf::from("/project"));
        assert_eq!(ctx.config_path, Some(PathBuf::from("/project/rmk.yml")));
    }

    #[test]
    fn test_bare_config_name_keeps_working_dir() {
        let before = Context::new().working_dir;
        let ctx = Context::new().with_config_path(PathBuf::from("rmk.yml"));
        assert_eq!(ctx.working_dir, before);
    }

    #[test]
    fn test_verbosity_levels() {
        assert!(Verbosity::Verbose > Verbosity::Normal);
        assert!(Verbosity::Normal > Verbosity::Quiet);
        assert!(Verbosity::Quiet > Verbosity::Silent);
    }

    #[test]
    fn test_with_verbosity() {
        let ctx = Context::new().with_verbosity(Verbosity::Verbose);
        assert_eq!(ctx.verbosity, Verbosity::Verbose);
    }
}
