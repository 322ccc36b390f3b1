//! `starter config`: inspect and initialize the configuration file.
//!
//! ```bash
//! starter config              # same as `config show`
//! starter config path
//! starter config init --force
//! ```

use anyhow::Result;
use clap::{Args, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

use crate::config::StarterConfig;

/// Manage the configuration file.
#[derive(Args, Debug)]
pub struct ConfigCommand {
    #[command(subcommand)]
    command: Option<ConfigSubcommands>,
}

#[derive(Subcommand, Debug)]
enum ConfigSubcommands {
    /// Write an example configuration.
    Init {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },

    /// Print the effective configuration.
    Show,

    /// Print the configuration file location.
    Path,
}

impl ConfigCommand {
    /// Run the command against `config_path`, or the default location.
    pub async fn execute(self, config_path: Option<PathBuf>) -> Result<()> {
        let config_path = match config_path {
            Some(path) => path,
            None => StarterConfig::default_path()?,
        };

        match self.command {
            Some(ConfigSubcommands::Init {
                force,
            }) => Self::init(force, config_path).await,
            Some(ConfigSubcommands::Show) | None => Self::show(config_path).await,
            Some(ConfigSubcommands::Path) => {
                println!("{}", config_path.display());
                Ok(())
            }
        }
    }

    async fn init(force: bool, config_path: PathBuf) -> Result<()> {
        if config_path.exists() && !force {
            println!("❌ Config already exists at: {}", config_path.display());
            println!("   Use --force to overwrite");
            return Ok(());
        }

        let config = StarterConfig::init_example();
        config.save_to(&config_path).await?;

        println!("✅ Created config at: {}", config_path.display());
        println!("\n{}", "Example configuration:".bold());
        println!("{}", toml::to_string_pretty(&config)?);
        println!("\n{}", "Next steps:".yellow());
        println!("  Point each [packs.<name>] repository at your template repositories");

        Ok(())
    }

    async fn show(config_path: PathBuf) -> Result<()> {
        let config = StarterConfig::load(Some(&config_path)).await?;

        println!("{}", "Starter Configuration".bold());
        println!("Location: {}\n", config_path.display());

        if config.packs.is_empty() {
            println!("No template sources configured.");
            println!("\n{}", "Tip:".yellow());
            println!("  Run 'starter config init' to create an example configuration");
        }
        println!("{}", toml::to_string_pretty(&config)?);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_init_respects_existing_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested/config.toml");

        ConfigCommand::init(false, path.clone()).await.unwrap();
        let written = StarterConfig::load_from(&path).await.unwrap();
        assert_eq!(written, StarterConfig::init_example());

        std::fs::write(&path, "[packs.node]\nrepository = \"/srv/node\"\n").unwrap();
        ConfigCommand::init(false, path.clone()).await.unwrap();
        let kept = StarterConfig::load_from(&path).await.unwrap();
        assert!(kept.pack("node").is_some());

        ConfigCommand::init(true, path.clone()).await.unwrap();
        let replaced = StarterConfig::load_from(&path).await.unwrap();
        assert!(replaced.pack("node").is_none());
    }

    #[tokio::test]
    async fn test_show_missing_file() {
        let temp = TempDir::new().unwrap();
        assert!(ConfigCommand::show(temp.path().join("config.toml")).await.is_ok());
    }
}
