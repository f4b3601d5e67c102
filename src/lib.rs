//! rmk - a declarative target runner
//!
//! Targets, their prerequisites, guards and shell steps are declared in an
//! `rmk.yml` file. rmk plans the dependency graph, resolves variables once
//! per run, and executes each target's steps in order.

// Public modules
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod runner;

// Re-export commonly used types
pub use error::{Result, RmkError};

/// Current version of rmk
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
