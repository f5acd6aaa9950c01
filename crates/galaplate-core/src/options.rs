//! Project options collected from the command line

use crate::error::{ScaffoldError, ScaffoldResult};
use crate::version::parse_version;
use std::fmt;
use std::path::{Path, PathBuf};

/// Default value of the core version placeholder
pub const DEFAULT_CORE_VERSION: &str = "v0.0.0";

/// Project flavours offered by the template repository
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, clap::ValueEnum)]
pub enum TemplateKind {
    /// REST API only
    #[default]
    Api,
    /// API plus frontend templates and static assets
    Full,
    /// Minimal microservice
    Micro,
}

impl TemplateKind {
    pub const ALL: [TemplateKind; 3] = [TemplateKind::Api, TemplateKind::Full, TemplateKind::Micro];

    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateKind::Api => "api",
            TemplateKind::Full => "full",
            TemplateKind::Micro => "micro",
        }
    }

    pub fn summary(&self) -> &'static str {
        match self {
            TemplateKind::Api => "REST API only (default)",
            TemplateKind::Full => "Full-stack application",
            TemplateKind::Micro => "Microservice template",
        }
    }

    pub fn features(&self) -> &'static str {
        match self {
            TemplateKind::Api => "HTTP server, Database, Auth, Jobs, Console",
            TemplateKind::Full => "API + Frontend templates + Static assets",
            TemplateKind::Micro => "Minimal API, Service discovery, Health checks",
        }
    }

    pub fn best_for(&self) -> &'static str {
        match self {
            TemplateKind::Api => "Backend APIs, microservices",
            TemplateKind::Full => "Web applications with UI",
            TemplateKind::Micro => "Distributed systems, minimal services",
        }
    }
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Database the generated project is configured for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, clap::ValueEnum)]
pub enum DatabaseKind {
    #[default]
    Postgres,
    Mysql,
}

impl DatabaseKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DatabaseKind::Postgres => "postgres",
            DatabaseKind::Mysql => "mysql",
        }
    }
}

impl fmt::Display for DatabaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Validated options for one project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectOptions {
    name: String,
    template: TemplateKind,
    database: DatabaseKind,
    module: String,
    skip_git: bool,
    overwrite: bool,
    core_version: String,
}

impl ProjectOptions {
    pub fn builder(name: impl Into<String>) -> ProjectOptionsBuilder {
        ProjectOptionsBuilder {
            name: name.into(),
            template: TemplateKind::default(),
            database: DatabaseKind::default(),
            module: None,
            skip_git: false,
            overwrite: false,
            core_version: DEFAULT_CORE_VERSION.to_string(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn template(&self) -> TemplateKind {
        self.template
    }

    pub fn database(&self) -> DatabaseKind {
        self.database
    }

    /// Module path, the project name unless one was given
    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn skip_git(&self) -> bool {
        self.skip_git
    }

    pub fn overwrite(&self) -> bool {
        self.overwrite
    }

    pub fn core_version(&self) -> &str {
        &self.core_version
    }

    /// Project directory under `base`
    pub fn destination(&self, base: &Path) -> PathBuf {
        base.join(&self.name)
    }
}

/// Builder for [`ProjectOptions`]
#[derive(Debug, Clone)]
pub struct ProjectOptionsBuilder {
    name: String,
    template: TemplateKind,
    database: DatabaseKind,
    module: Option<String>,
    skip_git: bool,
    overwrite: bool,
    core_version: String,
}

impl ProjectOptionsBuilder {
    pub fn template(mut self, template: TemplateKind) -> Self {
        self.template = template;
        self
    }

    pub fn database(mut self, database: DatabaseKind) -> Self {
        self.database = database;
        self
    }

    pub fn module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }

    pub fn skip_git(mut self, skip_git: bool) -> Self {
        self.skip_git = skip_git;
        self
    }

    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    pub fn core_version(mut self, core_version: impl Into<String>) -> Self {
        self.core_version = core_version.into();
        self
    }

    pub fn build(self) -> ScaffoldResult<ProjectOptions> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(ScaffoldError::Config("project name is required".to_string()));
        }
        if name == "." || name == ".." {
            return Err(ScaffoldError::Config(format!(
                "'{}' is not a valid project name",
                name
            )));
        }

        let module = self
            .module
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| name.clone());
        if module.contains(|c: char| c.is_whitespace() || c == '"') {
            return Err(ScaffoldError::Config(format!(
                "'{}' is not a valid module path",
                module
            )));
        }

        parse_version(&self.core_version)
            .map_err(|e| ScaffoldError::Config(format!("invalid core version: {}", e)))?;

        Ok(ProjectOptions {
            name,
            template: self.template,
            database: self.database,
            module,
            skip_git: self.skip_git,
            overwrite: self.overwrite,
            core_version: self.core_version,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ProjectOptions::builder("my-api").build().unwrap();
        assert_eq!(options.name(), "my-api");
        assert_eq!(options.module(), "my-api");
        assert_eq!(options.template(), TemplateKind::Api);
        assert_eq!(options.database(), DatabaseKind::Postgres);
        assert_eq!(options.core_version(), "v0.0.0");
        assert!(!options.skip_git());
        assert!(!options.overwrite());
    }

    #[test]
    fn test_explicit_module() {
        let options = ProjectOptions::builder("demo")
            .module("example.com/demo")
            .build()
            .unwrap();
        assert_eq!(options.module(), "example.com/demo");
    }

    #[test]
    fn test_blank_module_falls_back_to_name() {
        let options = ProjectOptions::builder("demo").module("  ").build().unwrap();
        assert_eq!(options.module(), "demo");
    }

    #[test]
    fn test_missing_name_is_config_error() {
        let err = ProjectOptions::builder("").build().unwrap_err();
        assert!(matches!(err, ScaffoldError::Config(msg) if msg == "project name is required"));
    }

    #[test]
    fn test_module_with_quote_rejected() {
        let err = ProjectOptions::builder("demo")
            .module("example.com/\"demo")
            .build()
            .unwrap_err();
        assert!(matches!(err, ScaffoldError::Config(_)));
    }

    #[test]
    fn test_invalid_core_version_rejected() {
        let err = ProjectOptions::builder("demo")
            .core_version("latest")
            .build()
            .unwrap_err();
        assert!(matches!(err, ScaffoldError::Config(msg) if msg.contains("core version")));
    }

    #[test]
    fn test_destination_joins_name() {
        let options = ProjectOptions::builder("demo").build().unwrap();
        assert_eq!(options.destination(Path::new("/work")), PathBuf::from("/work/demo"));
    }
}
