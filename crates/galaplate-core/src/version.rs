//! Build information and version parsing

use anyhow::Result;
use semver::Version;
use std::fmt;

/// Version details of a CLI build, fixed at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildInfo {
    pub version: &'static str,
    pub commit: &'static str,
    pub date: &'static str,
    pub core_version: &'static str,
}

impl BuildInfo {
    pub fn new(version: &'static str) -> Self {
        Self {
            version,
            commit: "none",
            date: "unknown",
            core_version: "v0.0.0-local",
        }
    }

    pub fn with_commit(mut self, commit: Option<&'static str>) -> Self {
        if let Some(commit) = commit {
            self.commit = commit;
        }
        self
    }

    pub fn with_date(mut self, date: Option<&'static str>) -> Self {
        if let Some(date) = date {
            self.date = date;
        }
        self
    }

    /// Lines printed by the version command
    pub fn report(&self, product: &str) -> Vec<String> {
        vec![
            format!("{} CLI v{}", product, self.version),
            format!("Built: {}", self.date),
            format!("Commit: {}", self.commit),
            format!("{} core: {}", product.to_lowercase(), self.core_version),
        ]
    }
}

impl fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{} ({}, {})", self.version, self.commit, self.date)
    }
}

/// Parse version string, handling various formats
pub fn parse_version(version_str: &str) -> Result<Version> {
    // Remove leading 'v' if present
    let cleaned = version_str.strip_prefix('v').unwrap_or(version_str);
    Version::parse(cleaned).map_err(|e| anyhow::anyhow!("Invalid version '{}': {}", version_str, e))
}
