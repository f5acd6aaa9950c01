//! TUI module - cliclack-based progress output
//!
//! This module is only available when the `tui` feature is enabled.

mod prompts;

pub use prompts::{run, CreateArgs};
