//! Template tree copying with exclusion filtering

use crate::error::{ScaffoldError, ScaffoldResult};
use crate::templates::exclusions::{Exclusion, ExclusionRules};
use crate::templates::rewriter::{RewrittenFile, Rewriter};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// What a copy produced
#[derive(Debug, Clone, Default)]
pub struct CopyReport {
    /// Files written, with the rule each went through
    pub files: Vec<RewrittenFile>,
    /// Directories created (or already present) in the destination
    pub directories: usize,
    /// Template paths left out by the exclusion rules
    pub excluded: Vec<PathBuf>,
}

/// Mirror the extracted template into `target_dir`, rewriting every copied file.
///
/// Excluded top-level directories are skipped without descending into them. The
/// first error aborts the copy and leaves whatever was already written in place.
pub fn copy_tree(
    source_root: &Path,
    target_dir: &Path,
    exclusions: &ExclusionRules,
    rewriter: &Rewriter,
) -> ScaffoldResult<CopyReport> {
    std::fs::create_dir_all(target_dir)
        .map_err(|e| ScaffoldError::fs("failed to create project directory", target_dir, e))?;

    let mut report = CopyReport::default();
    let mut walker = WalkDir::new(source_root).sort_by_file_name().into_iter();

    while let Some(entry) = walker.next() {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(source_root).to_path_buf();
            ScaffoldError::fs("failed to walk", path, e.into())
        })?;

        let relative = match entry.path().strip_prefix(source_root) {
            Ok(rel) if !rel.as_os_str().is_empty() => rel.to_path_buf(),
            _ => continue,
        };
        let file_type = entry.file_type();

        match exclusions.check(&relative) {
            Some(Exclusion::Directory) => {
                if file_type.is_dir() {
                    walker.skip_current_dir();
                }
                tracing::debug!(path = %relative.display(), "excluded directory");
                report.excluded.push(relative);
                continue;
            }
            Some(Exclusion::File) => {
                tracing::debug!(path = %relative.display(), "excluded file");
                report.excluded.push(relative);
                continue;
            }
            None => {}
        }

        let target_path = target_dir.join(&relative);

        if file_type.is_dir() {
            std::fs::create_dir_all(&target_path)
                .map_err(|e| ScaffoldError::fs("failed to create directory", &target_path, e))?;
            report.directories += 1;
        } else if file_type.is_file() {
            let written = rewriter.rewrite_file(entry.path(), &target_path)?;
            report.files.push(written);
        }
    }

    Ok(report)
}
