//! Galaplate CLI - Go REST API project scaffolding

mod logging;

use anyhow::Result;
use clap::{Parser, Subcommand};
use galaplate_core::tui::CreateArgs;
use galaplate_core::{
    ArchiveSource, BuildInfo, DatabaseKind, ExclusionRules, ProductConfig, TemplateKind,
};
use std::path::{Path, PathBuf};

/// CLI version
pub const CLI_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Galaplate product configuration
#[derive(Clone)]
pub struct GalaplateConfig;

impl ProductConfig for GalaplateConfig {
    fn name(&self) -> &'static str {
        "galaplate"
    }

    fn display_name(&self) -> &'static str {
        "Galaplate"
    }

    fn archive_source(&self) -> ArchiveSource {
        ArchiveSource::github("galaplate", "galaplate", "main")
    }

    fn archive_url_env(&self) -> &'static str {
        "GALAPLATE_ARCHIVE_URL"
    }

    fn module_root(&self) -> &'static str {
        "github.com/galaplate/galaplate"
    }

    fn exclusions(&self) -> ExclusionRules {
        ExclusionRules::new(
            &[
                "cli",
                ".git",
                "node_modules",
                "tmp",
                "storage",
                "cmd",
                "test-api",
                ".opencode",
            ],
            &[
                // compiled binaries
                "main",
                "server",
                "galaplate",
                // development docs
                "AGENTS.md",
                "CORE_EXTRACTION_PLAN.md",
                "IMPLEMENTATION_ROADMAP.md",
                "PHASE1_PROGRESS_REPORT.md",
                "WORKFLOW_EXAMPLE.md",
            ],
        )
    }

    fn dependency_command(&self) -> &'static [&'static str] {
        &["go", "mod", "tidy"]
    }

    fn initial_commit_message(&self) -> &'static str {
        "Initial commit from Galaplate"
    }

    fn cli_description(&self) -> &'static str {
        "Galaplate CLI - Go REST API Boilerplate Generator"
    }

    fn next_steps(&self, dir: &Path) -> Vec<String> {
        vec![
            format!("cd {}", dir.display()),
            "cp .env.example .env  # then edit your database settings".to_string(),
            "go mod tidy".to_string(),
            "go run main.go console db:up".to_string(),
            "go run main.go".to_string(),
            "go run main.go console list  # built-in generators".to_string(),
        ]
    }
}

#[derive(Parser, Debug)]
#[command(name = "galaplate")]
#[command(about = GalaplateConfig.cli_description())]
#[command(version, arg_required_else_help = true)]
pub struct Args {
    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a new Galaplate project
    #[command(visible_alias = "create")]
    New(CliNewArgs),
    /// List available project templates
    Templates,
    /// Show CLI version information
    Version,
}

#[derive(Parser, Debug)]
pub struct CliNewArgs {
    /// Project name (also the directory to create)
    pub name: String,

    /// Template to use
    #[arg(long, value_enum, default_value_t = TemplateKind::Api)]
    pub template: TemplateKind,

    /// Database type
    #[arg(long = "db", value_enum, default_value_t = DatabaseKind::Postgres)]
    pub database: DatabaseKind,

    /// Custom Go module name [default: project name]
    #[arg(long)]
    pub module: Option<String>,

    /// Skip git initialization
    #[arg(long = "no-git")]
    pub no_git: bool,

    /// Overwrite existing directory
    #[arg(long)]
    pub force: bool,

    /// Local template archive (.tar.gz) to use instead of downloading (for development use)
    #[arg(long)]
    pub archive: Option<PathBuf>,

    /// Value for the {{GALAPLATE_CORE_VERSION}} placeholder
    #[arg(long = "core-version")]
    pub core_version: Option<String>,
}

impl From<CliNewArgs> for CreateArgs {
    fn from(args: CliNewArgs) -> Self {
        CreateArgs {
            name: args.name,
            template: args.template,
            database: args.database,
            module: args.module,
            no_git: args.no_git,
            force: args.force,
            archive: args.archive,
            core_version: args.core_version,
        }
    }
}

fn build_info() -> BuildInfo {
    BuildInfo::new(CLI_VERSION)
        .with_commit(option_env!("GALAPLATE_COMMIT"))
        .with_date(option_env!("GALAPLATE_BUILD_DATE"))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Ensure terminal cursor is restored on panic
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = console::Term::stderr().show_cursor();
        default_panic(info);
    }));

    // Handle Ctrl+C gracefully
    ctrlc::set_handler(move || {
        let _ = console::Term::stderr().show_cursor();
        std::process::exit(130);
    })
    .ok();

    let args = Args::parse();
    logging::init_logging(args.verbose, args.quiet)?;
    let config = GalaplateConfig;
    tracing::debug!(command = ?args.command, "dispatching");

    match args.command {
        Some(Command::New(new_args)) => {
            let result = galaplate_core::run(&config, new_args.into()).await;

            // Ensure cursor is visible on normal exit
            let _ = console::Term::stderr().show_cursor();

            result
        }
        Some(Command::Templates) => {
            galaplate_core::templates::print_templates(&config);
            Ok(())
        }
        Some(Command::Version) => {
            for line in build_info().report(config.display_name()) {
                println!("{}", line);
            }
            Ok(())
        }
        None => Ok(()),
    }
}
