//! Shared fixtures for unit tests

use crate::product::ProductConfig;
use crate::templates::exclusions::ExclusionRules;
use crate::templates::fetcher::ArchiveSource;
use std::path::Path;

/// Product config pointing at a fictional template repository
#[derive(Clone)]
pub struct TestConfig;

impl ProductConfig for TestConfig {
    fn name(&self) -> &'static str {
        "test"
    }

    fn display_name(&self) -> &'static str {
        "Test"
    }

    fn archive_source(&self) -> ArchiveSource {
        ArchiveSource::github("acme", "template", "main")
    }

    fn archive_url_env(&self) -> &'static str {
        "TEST_ARCHIVE_URL"
    }

    fn module_root(&self) -> &'static str {
        "github.com/acme/template"
    }

    fn exclusions(&self) -> ExclusionRules {
        ExclusionRules::new(&[".git", "node_modules", "tmp"], &["main", "AGENTS.md"])
    }

    fn dependency_command(&self) -> &'static [&'static str] {
        &["test-tool-that-does-not-exist", "tidy"]
    }

    fn initial_commit_message(&self) -> &'static str {
        "Initial commit from Test"
    }

    fn next_steps(&self, dir: &Path) -> Vec<String> {
        vec![format!("cd {}", dir.display())]
    }

    fn cli_description(&self) -> &'static str {
        "Test scaffolder"
    }
}
