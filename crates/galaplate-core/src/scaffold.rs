//! Project creation workflow
//!
//! Sequences the pipeline stages for one project:
//! validate → fetch → extract → copy (fail-fast), then git and dependency setup
//! (best-effort). The scratch directory holding the extracted template is removed on
//! every exit path. A failed copy leaves the partially written project in place.

use crate::error::{PipelineError, ScaffoldError, Stage};
use crate::options::ProjectOptions;
use crate::product::ProductConfig;
use crate::runtime::{init_git, resolve_dependencies};
use crate::templates::copier::{copy_tree, CopyReport};
use crate::templates::extractor::{extract_archive, SkippedEntry};
use crate::templates::fetcher::ArchiveFetcher;
use crate::templates::rewriter::Rewriter;
use std::path::{Path, PathBuf};

/// A non-fatal problem from a setup step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advisory {
    pub stage: Stage,
    pub message: String,
}

/// Receives progress while a project is being created
///
/// All methods default to doing nothing.
pub trait ScaffoldObserver {
    fn stage_started(&mut self, _stage: Stage) {}

    fn stage_finished(&mut self, _stage: Stage, _detail: &str) {}

    fn stage_failed(&mut self, _stage: Stage) {}

    fn advisory(&mut self, _advisory: &Advisory) {}
}

/// Observer that ignores all progress
#[derive(Debug, Default)]
pub struct NoopObserver;

impl ScaffoldObserver for NoopObserver {}

/// Outcome of a successful project creation
#[derive(Debug, Clone)]
pub struct ScaffoldReport {
    pub destination: PathBuf,
    pub copy: CopyReport,
    /// Archive entries that were not extracted (links and other special files)
    pub skipped_entries: Vec<SkippedEntry>,
    pub git_initialized: bool,
    pub dependencies_resolved: bool,
    pub advisories: Vec<Advisory>,
}

/// Creates projects from a product's template archive
pub struct Scaffolder<C: ProductConfig> {
    config: C,
    fetcher: ArchiveFetcher,
}

impl<C: ProductConfig> Scaffolder<C> {
    pub fn new(config: C, fetcher: ArchiveFetcher) -> Self {
        Self { config, fetcher }
    }

    /// Scaffolder reading the product's remote archive
    pub fn from_config(config: C) -> Result<Self, ScaffoldError> {
        let fetcher = ArchiveFetcher::from_config(&config)?;
        Ok(Self::new(config, fetcher))
    }

    /// Create the project described by `options` under `base_dir`
    pub async fn create(
        &self,
        options: &ProjectOptions,
        base_dir: &Path,
        observer: &mut dyn ScaffoldObserver,
    ) -> Result<ScaffoldReport, PipelineError> {
        let destination = options.destination(base_dir);

        // Validate before any side effect
        observer.stage_started(Stage::Validate);
        if destination.symlink_metadata().is_ok() && !options.overwrite() {
            return Err(fail(
                observer,
                Stage::Validate,
                ScaffoldError::PreexistingDestination {
                    path: PathBuf::from(options.name()),
                },
            ));
        }
        let rewriter = Rewriter::for_project(options, self.config.module_root())
            .map_err(|e| fail(observer, Stage::Validate, e))?;
        observer.stage_finished(Stage::Validate, &destination.display().to_string());

        observer.stage_started(Stage::Fetch);
        let archive = self
            .fetcher
            .fetch()
            .await
            .map_err(|e| fail(observer, Stage::Fetch, e))?;
        observer.stage_finished(
            Stage::Fetch,
            &format!("{} ({} bytes)", self.fetcher.location(), archive.len()),
        );

        observer.stage_started(Stage::Extract);
        let tree = extract_archive(&archive, &format!("{}-", self.config.name()))
            .map_err(|e| fail(observer, Stage::Extract, e))?;
        drop(archive);
        observer.stage_finished(Stage::Extract, &tree.root().display().to_string());

        observer.stage_started(Stage::Copy);
        let copy = match copy_tree(tree.root(), &destination, &self.config.exclusions(), &rewriter) {
            Ok(copy) => copy,
            Err(e) => {
                tracing::error!(
                    destination = %destination.display(),
                    "copy failed, project directory may be partially written"
                );
                return Err(fail(observer, Stage::Copy, e));
            }
        };
        let skipped_entries = tree.skipped().to_vec();
        if let Err(e) = tree.close() {
            tracing::warn!(error = %e, "scratch directory was not removed");
        }
        observer.stage_finished(
            Stage::Copy,
            &format!("Created {} files in {}", copy.files.len(), destination.display()),
        );

        let mut report = ScaffoldReport {
            destination,
            copy,
            skipped_entries,
            git_initialized: false,
            dependencies_resolved: false,
            advisories: Vec::new(),
        };

        if !options.skip_git() {
            observer.stage_started(Stage::GitInit);
            match init_git(&report.destination, self.config.initial_commit_message()).await {
                Ok(()) => {
                    report.git_initialized = true;
                    observer.stage_finished(Stage::GitInit, "Initialized git repository");
                }
                Err(e) => advise(observer, &mut report, Stage::GitInit, &e),
            }
        }

        observer.stage_started(Stage::Dependencies);
        match resolve_dependencies(&report.destination, self.config.dependency_command()).await {
            Ok(()) => {
                report.dependencies_resolved = true;
                observer.stage_finished(Stage::Dependencies, "Dependencies installed");
            }
            Err(e) => advise(observer, &mut report, Stage::Dependencies, &e),
        }

        Ok(report)
    }
}

fn fail(observer: &mut dyn ScaffoldObserver, stage: Stage, error: ScaffoldError) -> PipelineError {
    tracing::debug!(%stage, error = %error, "pipeline stage failed");
    observer.stage_failed(stage);
    PipelineError::new(stage, error)
}

fn advise(
    observer: &mut dyn ScaffoldObserver,
    report: &mut ScaffoldReport,
    stage: Stage,
    error: &anyhow::Error,
) {
    let advisory = Advisory {
        stage,
        message: format!("{:#}", error),
    };
    tracing::warn!(%stage, message = %advisory.message, "setup step failed");
    observer.advisory(&advisory);
    report.advisories.push(advisory);
}
