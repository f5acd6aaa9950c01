//! Galaplate Core - Shared library for scaffolding projects from a template archive
//!
//! This library turns a repository's branch tarball into a new project on disk:
//! the archive is downloaded, unpacked into a scratch directory, and copied into the
//! project directory while placeholders, the module declaration and import paths are
//! rewritten for the new project.
//!
//! # Architecture
//!
//! The library is organized into layers:
//!
//! - **Layer 1: Core Operations** - Fetching, extraction, exclusion-aware copying, rewriting
//! - **Layer 2: Workflow Orchestration** - `ProductConfig` trait and `Scaffolder`
//! - **Layer 3: CLI/TUI Interface** - Optional cliclack-based progress output (feature-gated)
//!
//! # Feature Flags
//!
//! - `tui` (default): Enables the cliclack-based progress module
//!
//! # Example Usage (without TUI)
//!
//! ```ignore
//! use galaplate_core::{NoopObserver, ProjectOptions, Scaffolder};
//!
//! let scaffolder = Scaffolder::from_config(MyConfig)?;
//! let options = ProjectOptions::builder("my-api").module("example.com/my-api").build()?;
//! let report = scaffolder.create(&options, &std::env::current_dir()?, &mut NoopObserver).await?;
//! ```

pub mod error;
pub mod options;
pub mod product;
pub mod runtime;
pub mod scaffold;
pub mod templates;
pub mod version;

#[cfg(feature = "tui")]
pub mod tui;

#[cfg(test)]
mod test_support;

// Re-export main types for convenience
pub use error::{PipelineError, ScaffoldError, ScaffoldResult, Stage};
pub use options::{DatabaseKind, ProjectOptions, TemplateKind};
pub use product::ProductConfig;
pub use scaffold::{Advisory, NoopObserver, ScaffoldObserver, ScaffoldReport, Scaffolder};
pub use templates::{ArchiveFetcher, ArchiveLocation, ArchiveSource, ExclusionRules};
pub use version::BuildInfo;

#[cfg(feature = "tui")]
pub use tui::run;
