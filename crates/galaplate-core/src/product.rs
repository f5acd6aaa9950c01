//! Product configuration trait for CLI binaries
//!
//! This trait defines the interface a scaffolding binary implements to point the
//! pipeline at its template repository and describe how generated projects are
//! finished (module root, exclusions, post-setup commands).

use crate::templates::exclusions::ExclusionRules;
use crate::templates::fetcher::ArchiveSource;
use std::path::Path;

/// Configuration trait for scaffolding products
///
/// Each product defines:
/// - Product identity (name, display name)
/// - The template archive and its default module root
/// - Which template entries never reach the project
/// - Post-setup commands and instructions
pub trait ProductConfig: Clone + Send + Sync + 'static {
    /// Internal product name (used for CLI command, scratch dir prefix)
    fn name(&self) -> &'static str;

    /// Human-readable display name
    fn display_name(&self) -> &'static str;

    /// Repository holding the canonical template
    fn archive_source(&self) -> ArchiveSource;

    /// Environment variable name for overriding the archive URL
    fn archive_url_env(&self) -> &'static str;

    /// Module root the template's own sources import from
    fn module_root(&self) -> &'static str;

    /// Directories and files that are never copied into a project
    fn exclusions(&self) -> ExclusionRules;

    /// Command resolving the generated project's dependencies
    fn dependency_command(&self) -> &'static [&'static str];

    /// Message for the initial git commit
    fn initial_commit_message(&self) -> &'static str;

    /// Generate the "next steps" instructions after project creation
    fn next_steps(&self, dir: &Path) -> Vec<String>;

    /// CLI description shown in help text
    fn cli_description(&self) -> &'static str;

    /// User agent string for HTTP requests
    fn user_agent(&self) -> &'static str {
        self.name()
    }
}
