//! `starter bundle`: generate a bundle for one project.
//!
//! The template source comes from the pack's entry in the configuration
//! file, or entirely from `--repository` when given. Services and databases
//! come from `--context` and are extended by `--service` and `--database`.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::bundle::{BundleOutcome, BundleRequest, ProjectContext, generate_bundle};
use crate::config::{StarterConfig, TemplateSource};
use crate::fetch::RepositoryFetcher;

/// Generate a bundle for a project.
#[derive(Args, Debug)]
pub struct BundleCommand {
    /// Project pack, e.g. `rails` or `node`.
    #[arg(short, long)]
    pack: String,

    /// Project context YAML listing services and databases.
    #[arg(long)]
    context: Option<PathBuf>,

    /// Add a service (repeatable).
    #[arg(long = "service", value_name = "NAME")]
    services: Vec<String>,

    /// Add a database (repeatable).
    #[arg(long = "database", value_name = "NAME")]
    databases: Vec<String>,

    /// Directory that receives `starter.bundle`.
    #[arg(short, long, default_value = ".")]
    output: PathBuf,

    /// Template repository, overriding the configured one.
    #[arg(long)]
    repository: Option<String>,

    /// Repository branch.
    #[arg(long)]
    branch: Option<String>,

    /// Repository URL recorded in the manifest.
    #[arg(long)]
    github_url: Option<String>,

    /// Replace an existing bundle.
    #[arg(short, long)]
    force: bool,

    /// Fail when the catalog has circular dependencies.
    #[arg(long)]
    deny_cycles: bool,
}

impl BundleCommand {
    /// Run the command.
    pub async fn execute(self, config_path: Option<&Path>, quiet: bool) -> Result<()> {
        let config = StarterConfig::load(config_path).await?;
        let source = self.template_source(&config);
        let context = self.project_context()?;

        let request = BundleRequest {
            pack: self.pack.clone(),
            source,
            context,
            output_dir: self.output.clone(),
            overwrite: self.force,
            deny_cycles: self.deny_cycles,
        };

        let outcome = match &request.source {
            Some(source) => {
                let repository = source.resolved_repository()?;
                debug!("Using template repository {repository}");
                let fetcher = RepositoryFetcher::for_repository(&repository, &config.fetch)?;
                generate_bundle(&request, &fetcher).await?
            }
            None => BundleOutcome::NoTemplate {
                pack: request.pack.clone(),
            },
        };

        if !quiet {
            print_outcome(&outcome);
        }
        Ok(())
    }

    fn template_source(&self, config: &StarterConfig) -> Option<TemplateSource> {
        let mut source = match &self.repository {
            Some(repository) => TemplateSource::new(repository.clone()),
            None => config.pack(&self.pack)?.clone(),
        };

        if let Some(branch) = &self.branch {
            source.branch.clone_from(branch);
        }
        if let Some(github_url) = &self.github_url {
            source.github_url = Some(github_url.clone());
        }
        Some(source)
    }

    fn project_context(&self) -> Result<ProjectContext> {
        let mut context = match &self.context {
            Some(path) => ProjectContext::load(path)
                .with_context(|| format!("Failed to load project context {}", path.display()))?,
            None => ProjectContext::default(),
        };

        context.add_services(self.services.iter().cloned());
        context.add_databases(self.databases.iter().cloned());
        Ok(context)
    }
}

fn print_outcome(outcome: &BundleOutcome) {
    match outcome {
        BundleOutcome::Written {
            bundle_dir,
            stencil_count,
            cycles,
            ..
        } => {
            for cycle in cycles {
                println!("{} {cycle}", "warning:".yellow());
            }
            println!(
                "{} Bundle with {} stencil(s) saved to {}",
                "✓".green(),
                stencil_count,
                bundle_dir.display().to_string().cyan()
            );
        }
        BundleOutcome::NoTemplate {
            pack,
        } => {
            println!("{} No stencil template is defined for '{}'", "⚠".yellow(), pack);
            println!("  Add a [packs.{pack}] entry to the configuration or pass --repository");
        }
    }
}
