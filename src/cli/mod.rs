//! Command-line interface for starter.
//!
//! # Commands
//!
//! - `bundle` - resolve a pack's template catalog and write `starter.bundle`
//! - `resolve` - compute the required closure of a local catalog
//! - `config` - inspect or initialize the configuration file
//!
//! # Global Options
//!
//! - `--verbose` - debug logging
//! - `--quiet` - errors only
//! - `--config` - configuration file to use instead of the default
//!
//! Logging goes to stderr through `tracing`. `RUST_LOG`, when set, takes
//! precedence over `--verbose` and `--quiet`.
//!
//! # Examples
//!
//! ```bash
//! starter bundle --pack rails --context project.yml
//! starter bundle --pack node --service web --database postgresql --output ./out
//! starter resolve --catalog ./templates.json --tree
//! starter --config ./starter.toml config show
//! ```

mod bundle;
mod config;
mod resolve;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Settings derived from global flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliConfig {
    /// Default log filter; `None` keeps only errors.
    pub log_level: Option<String>,
    /// Configuration file override.
    pub config_path: Option<PathBuf>,
}

impl CliConfig {
    /// Install the global `tracing` subscriber.
    ///
    /// Safe to call more than once; later calls keep the first subscriber.
    pub fn init_logging(&self) {
        let filter = if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            EnvFilter::new(self.log_level.as_deref().unwrap_or("error"))
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }
}

/// Generate deployment bundles from stencil template repositories.
#[derive(Parser)]
#[command(
    name = "starter",
    about = "Generate deployment bundles from stencil templates",
    version,
    long_about = "Resolves the stencils, policies, transformations and Helm charts a project \
                  needs from its pack's template catalog and writes them as a bundle."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug output.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only report errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to the configuration file.
    ///
    /// Defaults to `$STARTER_CONFIG`, then `~/.starter/config.toml`.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a bundle for a project.
    Bundle(bundle::BundleCommand),

    /// Resolve the required closure of a template catalog.
    Resolve(resolve::ResolveCommand),

    /// Manage the configuration file.
    Config(config::ConfigCommand),
}

impl Cli {
    /// Run the parsed command.
    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        self.execute_with_config(config).await
    }

    /// Translate global flags into a [`CliConfig`].
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            Some("debug".to_string())
        } else if self.quiet {
            None
        } else {
            Some("info".to_string())
        };

        CliConfig {
            log_level,
            config_path: self.config.clone(),
        }
    }

    /// Run the parsed command with explicit settings.
    pub async fn execute_with_config(self, config: CliConfig) -> Result<()> {
        config.init_logging();

        match self.command {
            Commands::Bundle(cmd) => cmd.execute(config.config_path.as_deref(), self.quiet).await,
            Commands::Resolve(cmd) => cmd.execute(self.quiet),
            Commands::Config(cmd) => cmd.execute(config.config_path).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbose_sets_debug() {
        let cli = Cli::parse_from(["starter", "--verbose", "resolve", "--catalog", "t.json"]);
        assert_eq!(cli.build_config().log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_quiet_disables_logging() {
        let cli = Cli::parse_from(["starter", "resolve", "--catalog", "t.json", "--quiet"]);
        assert_eq!(cli.build_config().log_level, None);
    }

    #[test]
    fn test_config_path_is_global() {
        let cli = Cli::parse_from(["starter", "config", "path", "--config", "/tmp/s.toml"]);
        assert_eq!(cli.build_config().config_path, Some(PathBuf::from("/tmp/s.toml")));
    }

    #[test]
    fn test_verbose_and_quiet_conflict() {
        let result =
            Cli::try_parse_from(["starter", "-v", "-q", "resolve", "--catalog", "t.json"]);
        assert!(result.is_err());
    }
}
