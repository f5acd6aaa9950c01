//! Charm-style CLI progress output using cliclack

use crate::error::Stage;
use crate::options::{DatabaseKind, ProjectOptions, TemplateKind};
use crate::product::ProductConfig;
use crate::scaffold::{Advisory, ScaffoldObserver, ScaffoldReport, Scaffolder};
use crate::templates::fetcher::ArchiveFetcher;
use anyhow::Result;
use std::path::{Path, PathBuf};

/// CLI arguments for the create command
#[derive(Debug, Clone, Default)]
pub struct CreateArgs {
    /// Project name, also the directory created under the working directory
    pub name: String,

    /// Template flavour to record in the project
    pub template: TemplateKind,

    /// Database the project is configured for
    pub database: DatabaseKind,

    /// Module path (defaults to the project name)
    pub module: Option<String>,

    /// Skip git initialization
    pub no_git: bool,

    /// Write into an existing directory
    pub force: bool,

    /// Local archive to use instead of downloading (for development use)
    pub archive: Option<PathBuf>,

    /// Value for the core version placeholder
    pub core_version: Option<String>,
}

impl CreateArgs {
    fn to_options(&self) -> Result<ProjectOptions> {
        let mut builder = ProjectOptions::builder(self.name.clone())
            .template(self.template)
            .database(self.database)
            .skip_git(self.no_git)
            .overwrite(self.force);
        if let Some(module) = &self.module {
            builder = builder.module(module.clone());
        }
        if let Some(core_version) = &self.core_version {
            builder = builder.core_version(core_version.clone());
        }
        Ok(builder.build()?)
    }
}

/// Run project creation with spinners for each stage
pub async fn run<C: ProductConfig>(config: &C, args: CreateArgs) -> Result<()> {
    let options = args.to_options()?;

    cliclack::intro(format!(
        "Creating new {} project: {}",
        config.display_name(),
        options.name()
    ))?;
    cliclack::log::info(format!(
        "Template: {}\nDatabase: {}\nModule: {}",
        options.template(),
        options.database(),
        options.module()
    ))?;

    let fetcher = setup_fetcher(config, &args.archive)?;
    let scaffolder = Scaffolder::new(config.clone(), fetcher);

    let base_dir = std::env::current_dir()?;
    let mut observer = SpinnerObserver::default();
    let report = scaffolder.create(&options, &base_dir, &mut observer).await?;

    report_skipped(&report)?;
    print_next_steps(config, Path::new(options.name()))?;

    Ok(())
}

fn setup_fetcher<C: ProductConfig>(config: &C, archive: &Option<PathBuf>) -> Result<ArchiveFetcher> {
    let fetcher = match archive {
        Some(path) => {
            cliclack::log::info(format!("Using local template archive {}", path.display()))?;
            ArchiveFetcher::from_local(path.clone(), config.user_agent())?
        }
        None => ArchiveFetcher::from_config(config)?,
    };

    Ok(fetcher)
}

fn progress_message(stage: Stage) -> &'static str {
    match stage {
        Stage::Validate => "Checking project directory...",
        Stage::Fetch => "Downloading template...",
        Stage::Extract => "Extracting template...",
        Stage::Copy => "Copying project files...",
        Stage::GitInit => "Initializing git repository...",
        Stage::Dependencies => "Installing dependencies...",
    }
}

/// Shows one spinner per pipeline stage
#[derive(Default)]
struct SpinnerObserver {
    spinner: Option<cliclack::ProgressBar>,
}

impl ScaffoldObserver for SpinnerObserver {
    fn stage_started(&mut self, stage: Stage) {
        let spinner = cliclack::spinner();
        spinner.start(progress_message(stage));
        self.spinner = Some(spinner);
    }

    fn stage_finished(&mut self, _stage: Stage, detail: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.stop(detail);
        }
    }

    fn stage_failed(&mut self, stage: Stage) {
        if let Some(spinner) = self.spinner.take() {
            spinner.error(format!("Failed to {}", stage));
        }
    }

    fn advisory(&mut self, advisory: &Advisory) {
        if let Some(spinner) = self.spinner.take() {
            spinner.stop(format!("Could not {}", advisory.stage));
        }
        let _ = cliclack::log::warning(format!("Warning: {}", advisory.message));
    }
}

fn report_skipped(report: &ScaffoldReport) -> Result<()> {
    if report.skipped_entries.is_empty() {
        return Ok(());
    }

    let paths: Vec<String> = report
        .skipped_entries
        .iter()
        .map(|e| format!("{} ({})", e.path, e.kind))
        .collect();
    cliclack::log::warning(format!(
        "Skipped {} unsupported archive entries:\n{}",
        paths.len(),
        paths.join("\n")
    ))?;

    Ok(())
}

fn print_next_steps<C: ProductConfig>(config: &C, project_dir: &Path) -> Result<()> {
    let steps = config.next_steps(project_dir);

    println!();
    println!("  Next steps");
    println!();

    for (i, step) in steps.iter().enumerate() {
        println!("  {}.  {}", i + 1, step);
    }

    cliclack::outro(format!("Project '{}' created successfully!", project_dir.display()))?;

    Ok(())
}
