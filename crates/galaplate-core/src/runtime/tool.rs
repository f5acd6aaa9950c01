//! External command-line tools run after a project is generated
//!
//! Provides a small abstraction for running a tool inside the project directory
//! with a deadline.

use anyhow::Result;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command as TokioCommand;
use tokio::time::timeout;

/// Timeout for a single tool invocation (2 minutes)
const RUN_TIMEOUT: Duration = Duration::from_secs(120);

/// Runs a CLI tool found on PATH
#[derive(Debug, Clone)]
pub struct ToolManager {
    /// Name of the tool binary (e.g., "git")
    name: String,
    run_timeout: Duration,
}

impl ToolManager {
    /// Create a new tool manager for the given binary
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            run_timeout: RUN_TIMEOUT,
        }
    }

    /// Override the per-invocation timeout
    pub fn with_timeout(mut self, run_timeout: Duration) -> Self {
        self.run_timeout = run_timeout;
        self
    }

    /// Run the tool with `args` inside `dir`
    ///
    /// Output is captured; on failure the last line of stderr is included in the error.
    pub async fn run(&self, args: &[&str], dir: &Path) -> Result<()> {
        let command_line = format!("{} {}", self.name, args.join(" "));
        tracing::debug!(command = %command_line, dir = %dir.display(), "running tool");

        let mut cmd = TokioCommand::new(&self.name);
        cmd.args(args)
            .current_dir(dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = match timeout(self.run_timeout, cmd.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                anyhow::bail!("Failed to run '{}': {}", command_line, e);
            }
            Err(_) => {
                anyhow::bail!(
                    "'{}' timed out after {} seconds",
                    command_line,
                    self.run_timeout.as_secs()
                );
            }
        };

        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        match stderr.lines().rev().find(|l| !l.trim().is_empty()) {
            Some(line) => anyhow::bail!(
                "'{}' exited with code {}: {}",
                command_line,
                output.status.code().unwrap_or(-1),
                line.trim()
            ),
            None => anyhow::bail!(
                "'{}' exited with code {}",
                command_line,
                output.status.code().unwrap_or(-1)
            ),
        }
    }
}

/// Pre-configured tool manager for git
pub fn git_tool() -> ToolManager {
    ToolManager::new("git")
}

/// Tool manager for the first word of a command line
pub fn tool_for(program: &str) -> ToolManager {
    ToolManager::new(program)
}
