//! Name-based filters keeping template internals out of generated projects

use std::collections::BTreeSet;
use std::path::{Component, Path};

/// Directories and files that never reach the destination tree
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionRules {
    /// Matched against an entry's first path segment only
    directories: BTreeSet<String>,

    /// Matched against the base name of any entry
    files: BTreeSet<String>,
}

/// Why an entry was left out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exclusion {
    /// The entry lives under an excluded top-level directory
    Directory,
    /// The entry's base name is an excluded file name
    File,
}

impl ExclusionRules {
    pub fn new(directories: &[&str], files: &[&str]) -> Self {
        Self {
            directories: directories.iter().map(|d| d.to_string()).collect(),
            files: files.iter().map(|f| f.to_string()).collect(),
        }
    }

    /// Add a directory name to the exclusion set
    pub fn with_directory(mut self, name: &str) -> Self {
        self.directories.insert(name.to_string());
        self
    }

    /// Add a file name to the exclusion set
    pub fn with_file(mut self, name: &str) -> Self {
        self.files.insert(name.to_string());
        self
    }

    pub fn directories(&self) -> impl Iterator<Item = &str> {
        self.directories.iter().map(String::as_str)
    }

    pub fn files(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(String::as_str)
    }

    /// Check an entry path relative to the template root
    pub fn check(&self, relative: &Path) -> Option<Exclusion> {
        let first = relative.components().find_map(|c| match c {
            Component::Normal(name) => Some(name),
            _ => None,
        })?;

        if first
            .to_str()
            .is_some_and(|name| self.directories.contains(name))
        {
            return Some(Exclusion::Directory);
        }

        let base = relative.file_name().and_then(|n| n.to_str())?;
        if self.files.contains(base) {
            return Some(Exclusion::File);
        }

        None
    }
}
