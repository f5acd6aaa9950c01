//! Best-effort setup steps for a freshly generated project

use super::tool::{git_tool, tool_for};
use anyhow::{Context, Result};
use std::path::Path;

/// Initialize a git repository in `dir` and record everything in an initial commit
pub async fn init_git(dir: &Path, commit_message: &str) -> Result<()> {
    let git = git_tool();
    git.run(&["init"], dir).await?;

    git.run(&["add", "."], dir)
        .await
        .context("Repository initialized but staging files failed")?;
    git.run(&["commit", "-m", commit_message], dir)
        .await
        .context("Repository initialized but the initial commit failed")?;

    Ok(())
}

/// Run the product's dependency command (e.g. `go mod tidy`) in `dir`
pub async fn resolve_dependencies(dir: &Path, command: &[&str]) -> Result<()> {
    let Some((program, args)) = command.split_first() else {
        return Ok(());
    };
    tool_for(program).run(args, dir).await
}
