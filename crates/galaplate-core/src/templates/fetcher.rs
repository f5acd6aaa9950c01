//! Template archive fetching from a remote host or a local file
//!
//! Remote templates are the branch tarballs GitHub serves for every repository:
//! `https://<host>/<owner>/<repository>/archive/refs/heads/<branch>.tar.gz`.
//! A local `.tar.gz` can stand in for the remote one during development.

use crate::error::{ScaffoldError, ScaffoldResult};
use crate::product::ProductConfig;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Host serving repository archives
pub const DEFAULT_ARCHIVE_HOST: &str = "github.com";

/// Upper bound on the archive size accepted from the network
const MAX_DOWNLOAD_SIZE: u64 = 100 * 1024 * 1024;

/// Overall deadline for the archive request, including the body transfer
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(120);

/// Repository branch whose archive holds the template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveSource {
    pub host: String,
    pub owner: String,
    pub repository: String,
    pub branch: String,
}

impl ArchiveSource {
    /// A branch of a repository hosted on GitHub
    pub fn github(owner: &str, repository: &str, branch: &str) -> Self {
        Self {
            host: DEFAULT_ARCHIVE_HOST.to_string(),
            owner: owner.to_string(),
            repository: repository.to_string(),
            branch: branch.to_string(),
        }
    }

    /// Canonical download URL of the branch's compressed archive
    pub fn url(&self) -> ScaffoldResult<Url> {
        let raw = format!(
            "https://{}/{}/{}/archive/refs/heads/{}.tar.gz",
            self.host, self.owner, self.repository, self.branch
        );
        Url::parse(&raw).map_err(|e| ScaffoldError::Config(format!("invalid archive URL {}: {}", raw, e)))
    }
}

/// Where the template archive is read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveLocation {
    Remote(Url),
    Local(PathBuf),
}

impl ArchiveLocation {
    /// Remote location for a product, honouring its URL override variable
    pub fn from_config<C: ProductConfig>(config: &C) -> ScaffoldResult<Self> {
        Self::resolve(config, std::env::var(config.archive_url_env()).ok())
    }

    /// Resolve the remote location, preferring an explicit URL override
    pub fn resolve<C: ProductConfig>(config: &C, url_override: Option<String>) -> ScaffoldResult<Self> {
        match url_override.filter(|u| !u.trim().is_empty()) {
            Some(raw) => {
                let url = Url::parse(raw.trim()).map_err(|e| {
                    ScaffoldError::Config(format!(
                        "invalid archive URL in {}: {}",
                        config.archive_url_env(),
                        e
                    ))
                })?;
                Ok(Self::Remote(url))
            }
            None => Ok(Self::Remote(config.archive_source().url()?)),
        }
    }

    /// Local archive on disk
    pub fn local(path: PathBuf) -> Self {
        Self::Local(path)
    }
}

impl fmt::Display for ArchiveLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArchiveLocation::Remote(url) => write!(f, "{}", url),
            ArchiveLocation::Local(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Archive fetcher - retrieves the compressed template from its location
pub struct ArchiveFetcher {
    location: ArchiveLocation,
    client: reqwest::Client,
}

impl ArchiveFetcher {
    /// Create a new fetcher with a custom user agent
    pub fn new(location: ArchiveLocation, user_agent: &str) -> ScaffoldResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .redirect(reqwest::redirect::Policy::limited(10))
            .timeout(DOWNLOAD_TIMEOUT)
            .build()
            .map_err(|e| ScaffoldError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { location, client })
    }

    /// Create a fetcher from a product config
    pub fn from_config<C: ProductConfig>(config: &C) -> ScaffoldResult<Self> {
        let location = ArchiveLocation::from_config(config)?;
        Self::new(location, config.user_agent())
    }

    /// Create a fetcher for a local archive
    pub fn from_local(path: PathBuf, user_agent: &str) -> ScaffoldResult<Self> {
        Self::new(ArchiveLocation::local(path), user_agent)
    }

    /// Get the archive location
    pub fn location(&self) -> &ArchiveLocation {
        &self.location
    }

    /// Retrieve the compressed archive bytes
    pub async fn fetch(&self) -> ScaffoldResult<Vec<u8>> {
        match &self.location {
            ArchiveLocation::Remote(url) => self.download(url).await,
            ArchiveLocation::Local(path) => {
                tracing::debug!(path = %path.display(), "reading local template archive");
                tokio::fs::read(path)
                    .await
                    .map_err(|e| ScaffoldError::fs("failed to read archive", path, e))
            }
        }
    }

    async fn download(&self, url: &Url) -> ScaffoldResult<Vec<u8>> {
        tracing::debug!(%url, "fetching template archive");

        let network = |source: reqwest::Error| ScaffoldError::Network {
            url: url.to_string(),
            source,
        };

        let mut response = self.client.get(url.clone()).send().await.map_err(network)?;

        if !response.status().is_success() {
            return Err(ScaffoldError::HttpStatus {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        if let Some(len) = response.content_length() {
            if len > MAX_DOWNLOAD_SIZE {
                return Err(too_large(len));
            }
        }

        let capacity = usize::try_from(response.content_length().unwrap_or(0)).unwrap_or(0);
        let mut bytes = Vec::with_capacity(capacity);
        while let Some(chunk) = response.chunk().await.map_err(network)? {
            bytes.extend_from_slice(&chunk);
            let size = u64::try_from(bytes.len()).unwrap_or(u64::MAX);
            if size > MAX_DOWNLOAD_SIZE {
                return Err(too_large(size));
            }
        }

        tracing::debug!(bytes = bytes.len(), "template archive downloaded");
        Ok(bytes)
    }
}

fn too_large(size: u64) -> ScaffoldError {
    ScaffoldError::archive(format!(
        "archive is {} bytes, larger than the {} byte limit",
        size, MAX_DOWNLOAD_SIZE
    ))
}
