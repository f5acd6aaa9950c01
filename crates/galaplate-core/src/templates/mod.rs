//! Template fetching, extraction, copying and rewriting
//!
//! This module provides:
//! - Archive fetching from a remote host or a local file
//! - Safe tarball extraction into a scratch directory
//! - Tree copying with exclusion rules
//! - Per-file rewriting of placeholders and module references

pub mod copier;
pub mod exclusions;
pub mod extractor;
pub mod fetcher;
pub mod rewriter;

use crate::options::TemplateKind;
use crate::product::ProductConfig;
use colored::Colorize;

pub use copier::{copy_tree, CopyReport};
pub use exclusions::{Exclusion, ExclusionRules};
pub use extractor::{extract_archive, ExtractedTree, SkippedEntry};
pub use fetcher::{ArchiveFetcher, ArchiveLocation, ArchiveSource};
pub use rewriter::{ModuleRewrite, RewriteRule, Rewriter, TokenMap};

/// Lines describing the available template kinds
pub fn template_listing<C: ProductConfig>(config: &C) -> Vec<String> {
    let mut lines = Vec::new();
    for kind in TemplateKind::ALL {
        lines.push(format!("  {:<7} - {}", kind.as_str(), kind.summary()));
        lines.push(format!("            Features: {}", kind.features()));
        lines.push(format!("            Best for: {}", kind.best_for()));
        lines.push(String::new());
    }
    lines.push(format!(
        "Usage: {} new my-project --template={}",
        config.name(),
        TemplateKind::default()
    ));
    lines
}

/// Print the available template kinds
pub fn print_templates<C: ProductConfig>(config: &C) {
    println!("{}", "Available Templates:".cyan().bold());
    println!();
    for line in template_listing(config) {
        match line.strip_prefix("  ") {
            Some(entry) if !entry.starts_with(' ') => {
                let (name, rest) = entry.split_once(' ').unwrap_or((entry, ""));
                println!("  {} {}", name.green().bold(), rest);
            }
            _ => println!("{}", line),
        }
    }
}
