//! Per-file content rewriting for copied template files
//!
//! Exactly one rule applies to each file, checked in this order:
//! 1. `*.template` files lose the suffix and get their placeholder tokens replaced
//! 2. `go.mod` gets its module declaration pointed at the new module
//! 3. `*.go` sources get imports of the template module rewritten
//! 4. everything else is copied byte for byte

use crate::error::{ScaffoldError, ScaffoldResult};
use crate::options::ProjectOptions;
use regex::{Captures, Regex};
use std::fmt;
use std::path::{Path, PathBuf};

/// Suffix marking files whose placeholders are filled in
pub const TEMPLATE_SUFFIX: &str = ".template";

/// Build manifest declaring the module root
pub const MANIFEST_FILE: &str = "go.mod";

/// Extension of source files that import the module root
pub const SOURCE_EXTENSION: &str = ".go";

pub const PROJECT_NAME_TOKEN: &str = "{{PROJECT_NAME}}";
pub const MODULE_NAME_TOKEN: &str = "{{MODULE_NAME}}";
pub const DB_TYPE_TOKEN: &str = "{{DB_TYPE}}";
pub const CORE_VERSION_TOKEN: &str = "{{GALAPLATE_CORE_VERSION}}";

/// The rule a file was processed with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewriteRule {
    Template,
    Manifest,
    Source,
    Passthrough,
}

impl RewriteRule {
    /// Pick the rule for a file name, in priority order
    pub fn for_file_name(name: &str) -> Self {
        if name.ends_with(TEMPLATE_SUFFIX) {
            RewriteRule::Template
        } else if name == MANIFEST_FILE {
            RewriteRule::Manifest
        } else if name.ends_with(SOURCE_EXTENSION) {
            RewriteRule::Source
        } else {
            RewriteRule::Passthrough
        }
    }
}

impl fmt::Display for RewriteRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RewriteRule::Template => "template",
            RewriteRule::Manifest => "manifest",
            RewriteRule::Source => "source",
            RewriteRule::Passthrough => "copy",
        };
        write!(f, "{}", name)
    }
}

/// Placeholder tokens and their values for one project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenMap {
    tokens: Vec<(&'static str, String)>,
}

impl TokenMap {
    pub fn for_project(options: &ProjectOptions) -> Self {
        Self {
            tokens: vec![
                (PROJECT_NAME_TOKEN, options.name().to_string()),
                (MODULE_NAME_TOKEN, options.module().to_string()),
                (DB_TYPE_TOKEN, options.database().to_string()),
                (CORE_VERSION_TOKEN, options.core_version().to_string()),
            ],
        }
    }

    /// Replace every token occurrence verbatim
    pub fn apply(&self, content: &str) -> String {
        self.tokens
            .iter()
            .fold(content.to_string(), |acc, (token, value)| acc.replace(token, value))
    }
}

/// Rewrites references to the template's module root
#[derive(Debug, Clone)]
pub struct ModuleRewrite {
    old_root: String,
    new_module: String,
    declaration: String,
    references: Regex,
}

impl ModuleRewrite {
    pub fn new(old_root: &str, new_module: &str) -> ScaffoldResult<Self> {
        let escaped = regex::escape(old_root);
        let references = Regex::new(&format!(r#""{escaped}([^"\s]*)"|{escaped}"#))
            .map_err(|e| ScaffoldError::Config(format!("invalid module root '{}': {}", old_root, e)))?;

        Ok(Self {
            old_root: old_root.to_string(),
            new_module: new_module.to_string(),
            declaration: format!("module {}", old_root),
            references,
        })
    }

    /// Replace the `module <root>` line, leaving every other line untouched
    pub fn rewrite_manifest(&self, content: &str) -> String {
        content
            .split_inclusive('\n')
            .map(|line| {
                let body = line.trim_end_matches(['\n', '\r']);
                match body.strip_prefix(&self.declaration) {
                    Some(rest) if rest.is_empty() || rest.starts_with([' ', '\t']) => {
                        format!("module {}{}{}", self.new_module, rest, &line[body.len()..])
                    }
                    _ => line.to_string(),
                }
            })
            .collect()
    }

    /// Rewrite quoted import paths under the root, then any bare occurrence of it
    ///
    /// Both forms are matched in a single pass over the original text. A quoted path
    /// never spans whitespace, so an unterminated quote cannot swallow later references.
    pub fn rewrite_source(&self, content: &str) -> String {
        self.references
            .replace_all(content, |caps: &Captures<'_>| match caps.get(1) {
                Some(suffix) => format!(
                    "\"{}{}\"",
                    self.new_module,
                    suffix.as_str().replace(&self.old_root, &self.new_module)
                ),
                None => self.new_module.clone(),
            })
            .into_owned()
    }
}

/// Applies the rewrite rules to copied files
#[derive(Debug, Clone)]
pub struct Rewriter {
    tokens: TokenMap,
    module: ModuleRewrite,
}

/// Result of rewriting one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewrittenFile {
    pub destination: PathBuf,
    pub rule: RewriteRule,
}

impl Rewriter {
    pub fn new(tokens: TokenMap, module: ModuleRewrite) -> Self {
        Self { tokens, module }
    }

    /// Build the rewriter for a project against a template module root
    pub fn for_project(options: &ProjectOptions, module_root: &str) -> ScaffoldResult<Self> {
        Ok(Self::new(
            TokenMap::for_project(options),
            ModuleRewrite::new(module_root, options.module())?,
        ))
    }

    /// Transform text content under `rule`
    pub fn transform(&self, rule: RewriteRule, content: &str) -> String {
        match rule {
            RewriteRule::Template => self.tokens.apply(content),
            RewriteRule::Manifest => self.module.rewrite_manifest(content),
            RewriteRule::Source => self.module.rewrite_source(content),
            RewriteRule::Passthrough => content.to_string(),
        }
    }

    /// Copy `source` to `destination`, rewriting it according to its file name.
    ///
    /// Template files are written without their suffix. The written file gets the
    /// source file's permissions.
    pub fn rewrite_file(&self, source: &Path, destination: &Path) -> ScaffoldResult<RewrittenFile> {
        let name = source
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        let mut rule = RewriteRule::for_file_name(name);

        let destination = match rule {
            RewriteRule::Template => strip_template_suffix(destination),
            _ => destination.to_path_buf(),
        };

        if let Some(parent) = destination.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ScaffoldError::fs("failed to create directory", parent, e))?;
        }

        let bytes = std::fs::read(source).map_err(|e| ScaffoldError::fs("failed to read", source, e))?;

        let output = match rule {
            RewriteRule::Passthrough => bytes,
            _ => match String::from_utf8(bytes) {
                Ok(text) => self.transform(rule, &text).into_bytes(),
                Err(err) => {
                    tracing::warn!(
                        path = %source.display(),
                        "file is not valid UTF-8, copying without rewriting"
                    );
                    rule = RewriteRule::Passthrough;
                    err.into_bytes()
                }
            },
        };

        std::fs::write(&destination, output)
            .map_err(|e| ScaffoldError::fs("failed to write", &destination, e))?;

        let permissions = std::fs::metadata(source)
            .map_err(|e| ScaffoldError::fs("failed to read metadata of", source, e))?
            .permissions();
        std::fs::set_permissions(&destination, permissions)
            .map_err(|e| ScaffoldError::fs("failed to set permissions on", &destination, e))?;

        tracing::trace!(path = %destination.display(), %rule, "file written");
        Ok(RewrittenFile { destination, rule })
    }
}

fn strip_template_suffix(path: &Path) -> PathBuf {
    match path.file_name().and_then(|n| n.to_str()) {
        Some(name) => path.with_file_name(name.strip_suffix(TEMPLATE_SUFFIX).unwrap_or(name)),
        None => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{DatabaseKind, ProjectOptions};

    fn options() -> ProjectOptions {
        ProjectOptions::builder("demo")
            .module("example.com/demo")
            .database(DatabaseKind::Mysql)
            .build()
            .unwrap()
    }

    fn rewriter() -> Rewriter {
        Rewriter::for_project(&options(), "github.com/galaplate/galaplate").unwrap()
    }

    #[test]
    fn test_rule_priority() {
        assert_eq!(RewriteRule::for_file_name(".env.template"), RewriteRule::Template);
        assert_eq!(RewriteRule::for_file_name("go.mod.template"), RewriteRule::Template);
        assert_eq!(RewriteRule::for_file_name("main.go.template"), RewriteRule::Template);
        assert_eq!(RewriteRule::for_file_name("go.mod"), RewriteRule::Manifest);
        assert_eq!(RewriteRule::for_file_name("main.go"), RewriteRule::Source);
        assert_eq!(RewriteRule::for_file_name("go.sum"), RewriteRule::Passthrough);
        assert_eq!(RewriteRule::for_file_name("logo.png"), RewriteRule::Passthrough);
    }

    #[test]
    fn test_template_tokens_replaced() {
        let content = "APP_NAME={{PROJECT_NAME}}\nMODULE={{MODULE_NAME}}\nDB_CONNECTION={{DB_TYPE}}\ncore {{GALAPLATE_CORE_VERSION}}\n";
        let out = rewriter().transform(RewriteRule::Template, content);

        assert_eq!(
            out,
            "APP_NAME=demo\nMODULE=example.com/demo\nDB_CONNECTION=mysql\ncore v0.0.0\n"
        );
        for token in [PROJECT_NAME_TOKEN, MODULE_NAME_TOKEN, DB_TYPE_TOKEN, CORE_VERSION_TOKEN] {
            assert!(!out.contains(token));
        }
    }

    #[test]
    fn test_template_tokens_are_case_sensitive() {
        let out = rewriter().transform(RewriteRule::Template, "{{project_name}} {{PROJECT_NAME}}");
        assert_eq!(out, "{{project_name}} demo");
    }

    #[test]
    fn test_manifest_changes_only_module_line() {
        let content = "module github.com/galaplate/galaplate\r\n\ngo 1.22\n\nrequire (\n\tgithub.com/galaplate/galaplate/core v0.1.0\n)\n";
        let out = rewriter().transform(RewriteRule::Manifest, content);

        assert_eq!(
            out,
            "module example.com/demo\r\n\ngo 1.22\n\nrequire (\n\tgithub.com/galaplate/galaplate/core v0.1.0\n)\n"
        );
    }

    #[test]
    fn test_manifest_keeps_similar_module_names() {
        let content = "module github.com/galaplate/galaplate-extra\n";
        assert_eq!(rewriter().transform(RewriteRule::Manifest, content), content);
    }

    #[test]
    fn test_manifest_without_trailing_newline() {
        let out = rewriter().transform(RewriteRule::Manifest, "module github.com/galaplate/galaplate");
        assert_eq!(out, "module example.com/demo");
    }

    #[test]
    fn test_import_path_suffix_preserved() {
        let module = ModuleRewrite::new("github.com/old/old", "github.com/new/new").unwrap();
        let out = module.rewrite_source("import \"github.com/old/old/sub/pkg\"\n");
        assert_eq!(out, "import \"github.com/new/new/sub/pkg\"\n");
    }

    #[test]
    fn test_source_rewrites_imports_and_bare_references() {
        let content = r#"package main

import (
	"fmt"

	"github.com/galaplate/galaplate"
	"github.com/galaplate/galaplate/app/models"
)

// see github.com/galaplate/galaplate for docs
"#;
        let out = rewriter().transform(RewriteRule::Source, content);

        assert!(out.contains("\t\"example.com/demo\"\n"));
        assert!(out.contains("\"example.com/demo/app/models\""));
        assert!(out.contains("// see example.com/demo for docs"));
        assert!(!out.contains("galaplate/galaplate"));
    }

    #[test]
    fn test_source_rewrite_does_not_reapply_to_new_module() {
        let module = ModuleRewrite::new("github.com/acme/app", "github.com/acme/app/v2").unwrap();
        let out = module.rewrite_source("\"github.com/acme/app/internal\" github.com/acme/app");
        assert_eq!(out, "\"github.com/acme/app/v2/internal\" github.com/acme/app/v2");
    }

    #[test]
    fn test_unterminated_quote_does_not_hide_later_references() {
        let module = ModuleRewrite::new("github.com/galaplate/galaplate", "example.com/demo").unwrap();
        let content = "// see \"github.com/galaplate/galaplate\n// docs: github.com/galaplate/galaplate/docs\nvar x = \"y\"\n";
        let out = module.rewrite_source(content);

        assert_eq!(
            out,
            "// see \"example.com/demo\n// docs: example.com/demo/docs\nvar x = \"y\"\n"
        );
        assert!(!out.contains("github.com/galaplate/galaplate"));
    }

    #[test]
    fn test_root_repeated_inside_import_path_is_rewritten() {
        let module = ModuleRewrite::new("github.com/old/old", "example.com/demo").unwrap();
        let out = module.rewrite_source("import \"github.com/old/old/vendor/github.com/old/old/x\"");
        assert_eq!(out, "import \"example.com/demo/vendor/example.com/demo/x\"");
    }

    #[test]
    fn test_module_with_dollar_sign_is_literal() {
        let module = ModuleRewrite::new("github.com/old/old", "example.com/$1").unwrap();
        let out = module.rewrite_source("\"github.com/old/old/x\"");
        assert_eq!(out, "\"example.com/$1/x\"");
    }

    #[test]
    fn test_rewrite_file_strips_template_suffix() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("src/.env.template");
        std::fs::create_dir_all(source.parent().unwrap()).unwrap();
        std::fs::write(&source, "APP_NAME={{PROJECT_NAME}}\n").unwrap();

        let dest = dir.path().join("out/.env.template");
        let written = rewriter().rewrite_file(&source, &dest).unwrap();

        assert_eq!(written.rule, RewriteRule::Template);
        assert_eq!(written.destination, dir.path().join("out/.env"));
        assert_eq!(std::fs::read_to_string(dir.path().join("out/.env")).unwrap(), "APP_NAME=demo\n");
        assert!(!dest.exists());
    }

    #[test]
    fn test_rewrite_file_passes_binary_through() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("logo.png");
        let bytes = vec![0x89, b'P', b'N', b'G', 0xff, 0x00, 0xfe];
        std::fs::write(&source, &bytes).unwrap();

        let dest = dir.path().join("out/logo.png");
        let written = rewriter().rewrite_file(&source, &dest).unwrap();

        assert_eq!(written.rule, RewriteRule::Passthrough);
        assert_eq!(std::fs::read(&dest).unwrap(), bytes);
    }

    #[test]
    fn test_rewrite_file_invalid_utf8_source_falls_back_to_copy() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("blob.go");
        let bytes = vec![b'g', b'i', b't', 0xff, 0xfe];
        std::fs::write(&source, &bytes).unwrap();

        let dest = dir.path().join("out/blob.go");
        let written = rewriter().rewrite_file(&source, &dest).unwrap();

        assert_eq!(written.rule, RewriteRule::Passthrough);
        assert_eq!(std::fs::read(&dest).unwrap(), bytes);
    }
}
