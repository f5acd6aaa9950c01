//! Tarball extraction into a scratch directory
//!
//! Repository archives wrap the whole tree in a single `{repo}-{branch}/` directory.
//! Extraction drops that first segment from every entry, so the scratch root mirrors
//! the repository root. Entry paths are resolved lexically and must stay under the
//! scratch root.

use crate::error::{ScaffoldError, ScaffoldResult};
use std::io::Read;
use std::path::{Component, Path, PathBuf};
use tempfile::TempDir;

const MAX_ENTRY_COUNT: usize = 10_000;
const MAX_EXTRACTED_SIZE: u64 = 500_000_000;

/// An archive entry that was not materialized
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEntry {
    /// Path as stored in the archive
    pub path: String,
    /// Tar entry type, e.g. `Symlink`
    pub kind: String,
}

/// Extracted template tree living in a scratch directory
///
/// The scratch directory is removed when the tree is dropped, whether or not the
/// rest of the pipeline succeeded.
#[derive(Debug)]
pub struct ExtractedTree {
    dir: TempDir,
    entries: usize,
    skipped: Vec<SkippedEntry>,
}

impl ExtractedTree {
    /// Root of the extracted tree (the repository root)
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Number of directories and files written
    pub fn entry_count(&self) -> usize {
        self.entries
    }

    /// Entries that were left out because their kind is not supported
    pub fn skipped(&self) -> &[SkippedEntry] {
        &self.skipped
    }

    /// Remove the scratch directory now, reporting failures instead of ignoring them
    pub fn close(self) -> ScaffoldResult<()> {
        let path = self.dir.path().to_path_buf();
        self.dir
            .close()
            .map_err(|e| ScaffoldError::fs("failed to remove scratch directory", path, e))
    }
}

/// Decompress a `.tar.gz` and unpack it into a fresh scratch directory
///
/// The scratch directory name starts with `prefix`. On error the partially
/// populated directory is removed before returning.
pub fn extract_archive(data: &[u8], prefix: &str) -> ScaffoldResult<ExtractedTree> {
    let dir = tempfile::Builder::new()
        .prefix(prefix)
        .tempdir()
        .map_err(|e| ScaffoldError::fs("failed to create scratch directory", std::env::temp_dir(), e))?;

    let mut tree = ExtractedTree {
        dir,
        entries: 0,
        skipped: Vec::new(),
    };

    unpack(flate2::read::GzDecoder::new(data), &mut tree)?;

    tracing::debug!(
        root = %tree.root().display(),
        entries = tree.entries,
        skipped = tree.skipped.len(),
        "template archive extracted"
    );
    Ok(tree)
}

fn unpack<R: Read>(reader: R, tree: &mut ExtractedTree) -> ScaffoldResult<()> {
    let root = tree.root().to_path_buf();
    let mut archive = tar::Archive::new(reader);

    let mut entry_count = 0usize;
    let mut total_size: u64 = 0;

    let entries = archive
        .entries()
        .map_err(|e| ScaffoldError::archive(format!("failed to read archive entries: {}", e)))?;

    for entry_result in entries {
        let mut entry = entry_result
            .map_err(|e| ScaffoldError::archive(format!("failed to read archive entry: {}", e)))?;

        entry_count += 1;
        if entry_count > MAX_ENTRY_COUNT {
            return Err(ScaffoldError::archive(format!(
                "archive exceeds maximum entry count ({})",
                MAX_ENTRY_COUNT
            )));
        }

        let stored = String::from_utf8(entry.path_bytes().into_owned())
            .map_err(|_| ScaffoldError::archive("archive entry path is not valid UTF-8"))?;

        // `{repo}-{branch}/` itself, or a pax global header
        let Some(relative) = strip_first_segment(&stored) else {
            continue;
        };
        let target = resolve_under(&root, relative).ok_or_else(|| ScaffoldError::PathSafety {
            path: stored.clone(),
        })?;

        let header = entry.header();
        let entry_type = header.entry_type();
        let mode = header
            .mode()
            .map_err(|e| ScaffoldError::archive(format!("invalid mode for {}: {}", stored, e)))?;

        if entry_type.is_dir() {
            create_dir(&target, (mode & 0o777) | 0o700)?;
            tree.entries += 1;
        } else if entry_type.is_file() || entry_type == tar::EntryType::Continuous {
            let size = header
                .size()
                .map_err(|e| ScaffoldError::archive(format!("invalid size for {}: {}", stored, e)))?;
            total_size = total_size.saturating_add(size);
            if total_size > MAX_EXTRACTED_SIZE {
                return Err(ScaffoldError::archive(format!(
                    "archive exceeds maximum extracted size ({} bytes)",
                    MAX_EXTRACTED_SIZE
                )));
            }

            let mut payload = Vec::with_capacity(usize::try_from(size).unwrap_or(0));
            entry
                .read_to_end(&mut payload)
                .map_err(|e| ScaffoldError::archive(format!("failed to read {}: {}", stored, e)))?;

            write_file(&target, &payload, (mode & 0o777) | 0o400)?;
            tree.entries += 1;
        } else if is_metadata(entry_type) {
            continue;
        } else {
            tracing::warn!(path = %stored, kind = ?entry_type, "skipping unsupported archive entry");
            tree.skipped.push(SkippedEntry {
                path: stored,
                kind: format!("{:?}", entry_type),
            });
        }
    }

    if entry_count == 0 {
        return Err(ScaffoldError::archive("archive is empty"));
    }

    Ok(())
}

/// Drop the archive's top-level directory from a stored path.
///
/// Returns `None` for entries with fewer than two segments.
pub fn strip_first_segment(stored: &str) -> Option<&str> {
    let (_, rest) = stored.split_once('/')?;
    if rest.is_empty() {
        return None;
    }
    Some(rest)
}

/// Join `relative` onto `root`, resolving `.` and `..` lexically.
///
/// Returns `None` if the path climbs above `root` or contains a root or prefix.
pub fn resolve_under(root: &Path, relative: &str) -> Option<PathBuf> {
    let mut segments: Vec<&str> = Vec::new();
    for segment in relative.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop()?;
            }
            name => {
                let mut components = Path::new(name).components();
                match (components.next(), components.next()) {
                    (Some(Component::Normal(_)), None) => segments.push(name),
                    _ => return None,
                }
            }
        }
    }

    let mut path = root.to_path_buf();
    path.extend(segments);
    path.starts_with(root).then_some(path)
}

fn is_metadata(entry_type: tar::EntryType) -> bool {
    entry_type.is_pax_global_extensions()
        || entry_type.is_pax_local_extensions()
        || entry_type.is_gnu_longname()
        || entry_type.is_gnu_longlink()
}

fn create_dir(path: &Path, mode: u32) -> ScaffoldResult<()> {
    std::fs::create_dir_all(path)
        .map_err(|e| ScaffoldError::fs("failed to create directory", path, e))?;
    set_mode(path, mode)
}

fn write_file(path: &Path, payload: &[u8], mode: u32) -> ScaffoldResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| ScaffoldError::fs("failed to create directory", parent, e))?;
    }
    std::fs::write(path, payload).map_err(|e| ScaffoldError::fs("failed to write", path, e))?;
    set_mode(path, mode)
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> ScaffoldResult<()> {
    use std::os::unix::fs::PermissionsExt;

    std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
        .map_err(|e| ScaffoldError::fs("failed to set permissions on", path, e))
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> ScaffoldResult<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    enum Entry<'a> {
        Dir(&'a str),
        File(&'a str, &'a [u8], u32),
        Symlink(&'a str, &'a str),
    }

    fn tarball(entries: &[Entry<'_>]) -> Vec<u8> {
        let mut builder = tar::Builder::new(Vec::new());
        for entry in entries {
            let mut header = tar::Header::new_gnu();
            match entry {
                Entry::Dir(path) => {
                    header.set_entry_type(tar::EntryType::Directory);
                    header.set_path(path).unwrap();
                    header.set_mode(0o755);
                    header.set_size(0);
                    header.set_cksum();
                    builder.append(&header, std::io::empty()).unwrap();
                }
                Entry::File(path, data, mode) => {
                    header.set_path(path).unwrap();
                    header.set_mode(*mode);
                    header.set_size(data.len() as u64);
                    header.set_cksum();
                    builder.append(&header, *data).unwrap();
                }
                Entry::Symlink(path, target) => {
                    header.set_entry_type(tar::EntryType::Symlink);
                    header.set_path(path).unwrap();
                    header.set_link_name(target).unwrap();
                    header.set_mode(0o777);
                    header.set_size(0);
                    header.set_cksum();
                    builder.append(&header, std::io::empty()).unwrap();
                }
            }
        }
        gzip(&builder.into_inner().unwrap())
    }

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::fast());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    /// Raw tar entry, bypassing the path validation `tar::Header::set_path` performs
    fn raw_tarball(path: &[u8], data: &[u8]) -> Vec<u8> {
        let mut header = [0u8; 512];
        header[..path.len()].copy_from_slice(path);
        header[100..108].copy_from_slice(b"0000644\0");
        header[124..136].copy_from_slice(format!("{:011o}\0", data.len()).as_bytes());
        header[156] = b'0';
        header[148..156].copy_from_slice(b"        ");
        let cksum: u32 = header.iter().map(|&b| u32::from(b)).sum();
        header[148..156].copy_from_slice(format!("{:06o}\0 ", cksum).as_bytes());

        let mut tar_data = header.to_vec();
        tar_data.extend_from_slice(data);
        tar_data.resize(tar_data.len() + (512 - data.len() % 512) % 512, 0);
        tar_data.resize(tar_data.len() + 1024, 0);
        gzip(&tar_data)
    }

    #[test]
    fn test_strip_first_segment() {
        assert_eq!(strip_first_segment("repo-main/go.mod"), Some("go.mod"));
        assert_eq!(strip_first_segment("repo-main/app/models/user.go"), Some("app/models/user.go"));
        assert_eq!(strip_first_segment("repo-main/"), None);
        assert_eq!(strip_first_segment("pax_global_header"), None);
    }

    #[test]
    fn test_resolve_under_rejects_escapes() {
        let root = Path::new("/scratch");
        assert_eq!(resolve_under(root, "a/../b"), Some(PathBuf::from("/scratch/b")));
        assert_eq!(resolve_under(root, "./a//b"), Some(PathBuf::from("/scratch/a/b")));
        assert_eq!(resolve_under(root, "../etc/passwd"), None);
        assert_eq!(resolve_under(root, "a/../../etc"), None);
    }

    #[test]
    fn test_extract_strips_top_level_directory() {
        let data = tarball(&[
            Entry::Dir("galaplate-main/"),
            Entry::File("galaplate-main/go.mod", b"module x\n", 0o644),
            Entry::Dir("galaplate-main/app/"),
            Entry::File("galaplate-main/app/models/user.go", b"package models\n", 0o644),
        ]);

        let tree = extract_archive(&data, "galaplate-test-").unwrap();
        let root = tree.root();
        assert_eq!(std::fs::read(root.join("go.mod")).unwrap(), b"module x\n");
        assert!(root.join("app/models/user.go").is_file());
        assert!(!root.join("galaplate-main").exists());
        assert_eq!(tree.entry_count(), 3);
    }

    #[test]
    fn test_extract_rejects_parent_traversal() {
        // Extraction root is <temp>/galaplate-test-XXXX, so two `..` land beside <temp>
        let data = raw_tarball(b"galaplate-main/../../galaplate-escape-two.txt", b"malicious");
        let target = std::env::temp_dir()
            .parent()
            .map(|p| p.join("galaplate-escape-two.txt"));

        let err = extract_archive(&data, "galaplate-test-").unwrap_err();
        assert!(matches!(err, ScaffoldError::PathSafety { ref path } if path.contains("..")));
        if let Some(target) = target {
            assert!(!target.exists());
        }
    }

    #[test]
    fn test_extract_rejects_single_parent_escape() {
        let data = raw_tarball(b"galaplate-main/../galaplate-escape-one.txt", b"malicious");
        let target = std::env::temp_dir().join("galaplate-escape-one.txt");

        let err = extract_archive(&data, "galaplate-test-").unwrap_err();
        assert!(matches!(err, ScaffoldError::PathSafety { .. }));
        assert!(!target.exists());
    }

    #[test]
    fn test_extract_allows_inner_parent_segments() {
        let data = raw_tarball(b"galaplate-main/app/../README.md", b"# readme");
        let tree = extract_archive(&data, "galaplate-test-").unwrap();
        assert_eq!(std::fs::read(tree.root().join("README.md")).unwrap(), b"# readme");
    }

    #[test]
    fn test_symlinks_are_skipped_and_recorded() {
        let data = tarball(&[
            Entry::File("galaplate-main/README.md", b"hi", 0o644),
            Entry::Symlink("galaplate-main/docs", "README.md"),
        ]);

        let tree = extract_archive(&data, "galaplate-test-").unwrap();
        assert!(!tree.root().join("docs").exists());
        assert_eq!(
            tree.skipped(),
            &[SkippedEntry {
                path: "galaplate-main/docs".to_string(),
                kind: "Symlink".to_string(),
            }]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_file_permissions_applied() {
        use std::os::unix::fs::PermissionsExt;

        let data = tarball(&[Entry::File("galaplate-main/scripts/run.sh", b"#!/bin/sh\n", 0o755)]);
        let tree = extract_archive(&data, "galaplate-test-").unwrap();
        let mode = std::fs::metadata(tree.root().join("scripts/run.sh"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o755);
    }

    #[test]
    fn test_corrupt_stream_is_archive_error() {
        let err = extract_archive(b"definitely not gzip", "galaplate-test-").unwrap_err();
        assert!(matches!(err, ScaffoldError::ArchiveFormat { .. }));
    }

    #[test]
    fn test_scratch_directory_removed_on_drop() {
        let data = tarball(&[Entry::File("galaplate-main/go.mod", b"module x\n", 0o644)]);
        let tree = extract_archive(&data, "galaplate-test-").unwrap();
        let root = tree.root().to_path_buf();
        assert!(root.exists());
        drop(tree);
        assert!(!root.exists());
    }
}
