//! Target execution engine
//!
//! This module holds the runtime side of rmk: the validated registry,
//! dependency planning, variable resolution, guards, and the engine that
//! runs a plan step by step.

pub mod context;
pub mod engine;
pub mod executor;
pub mod guard;
pub mod help;
pub mod plan;
pub mod registry;
pub mod target;
pub mod template;
pub mod variables;

// Re-export main types
pub use context::*;
pub use engine::*;
pub use executor::*;
pub use guard::*;
pub use plan::*;
pub use registry::*;
pub use target::*;
pub use template::*;
pub use variables::*;
