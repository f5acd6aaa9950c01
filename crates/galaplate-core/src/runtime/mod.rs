//! Post-generation setup with external tools
//!
//! This module provides:
//! - Generic tool management for CLIs like git and go
//! - The best-effort git and dependency setup steps

pub mod setup;
pub mod tool;

pub use setup::{init_git, resolve_dependencies};
pub use tool::ToolManager;
