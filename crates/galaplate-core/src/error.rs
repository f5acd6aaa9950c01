//! Scaffolding error types

use std::fmt;
use std::path::PathBuf;

/// Errors from the scaffolding pipeline.
///
/// Every variant is fatal: the pipeline stops at the first one and nothing is retried.
#[derive(Debug, thiserror::Error)]
pub enum ScaffoldError {
    /// The archive host could not be reached or the transfer failed.
    #[error("network error while fetching {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The archive host answered with a non-success status.
    #[error("failed to download {url}: HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    /// The compressed stream or tar structure could not be decoded.
    #[error("invalid archive: {message}")]
    ArchiveFormat { message: String },

    /// An archive entry would resolve outside the scratch directory.
    #[error("archive entry escapes extraction root: {path}")]
    PathSafety { path: String },

    /// Creating, writing or changing permissions of a file failed.
    #[error("{action} {}: {source}", .path.display())]
    Filesystem {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The destination exists and overwriting was not requested.
    #[error("directory '{}' already exists. Use --force to overwrite", .path.display())]
    PreexistingDestination { path: PathBuf },

    /// The project options are incomplete or malformed.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ScaffoldError {
    pub(crate) fn archive(message: impl Into<String>) -> Self {
        Self::ArchiveFormat {
            message: message.into(),
        }
    }

    pub(crate) fn fs(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Filesystem {
            action,
            path: path.into(),
            source,
        }
    }
}

/// Pipeline stage, used to report where a fatal error happened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Validate,
    Fetch,
    Extract,
    Copy,
    GitInit,
    Dependencies,
}

impl Stage {
    pub fn description(&self) -> &'static str {
        match self {
            Stage::Validate => "validate project options",
            Stage::Fetch => "download template",
            Stage::Extract => "extract template",
            Stage::Copy => "copy project files",
            Stage::GitInit => "initialize git repository",
            Stage::Dependencies => "install dependencies",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// A fatal error together with the stage that produced it
#[derive(Debug, thiserror::Error)]
#[error("failed to {stage}: {source}")]
pub struct PipelineError {
    pub stage: Stage,
    #[source]
    pub source: ScaffoldError,
}

impl PipelineError {
    pub fn new(stage: Stage, source: ScaffoldError) -> Self {
        Self { stage, source }
    }
}

/// Result alias for pipeline components
pub type ScaffoldResult<T> = Result<T, ScaffoldError>;
