//! Shared helpers for integration tests.

#![allow(dead_code)]

use anyhow::{Context, Result};
use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use starter_bundle::config::{StarterConfig, TemplateSource};
use starter_bundle::test_utils::CatalogFixture;

/// Isolated workspace with a template repository, config file and output dir.
pub struct TestProject {
    _temp_dir: TempDir,
    templates_dir: PathBuf,
    output_dir: PathBuf,
    config_path: PathBuf,
}

impl TestProject {
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let templates_dir = temp_dir.path().join("templates");
        let output_dir = temp_dir.path().join("out");
        let config_path = temp_dir.path().join("starter").join("config.toml");

        fs::create_dir_all(&templates_dir)?;
        fs::create_dir_all(&output_dir)?;

        Ok(Self {
            _temp_dir: temp_dir,
            templates_dir,
            output_dir,
            config_path,
        })
    }

    pub fn templates_path(&self) -> &Path {
        &self.templates_dir
    }

    pub fn output_path(&self) -> &Path {
        &self.output_dir
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn bundle_path(&self) -> PathBuf {
        self.output_dir.join("starter.bundle")
    }

    /// Write `fixture` as the template repository.
    pub fn write_templates(&self, fixture: &CatalogFixture) -> Result<()> {
        fixture.write_repo(&self.templates_dir)
    }

    /// Write a config mapping `pack` to the local template repository.
    pub fn write_config(&self, pack: &str, github_url: Option<&str>) -> Result<()> {
        let mut source = TemplateSource::new(self.templates_dir.display().to_string());
        source.github_url = github_url.map(ToString::to_string);

        let mut config = StarterConfig::default();
        config.packs.insert(pack.to_string(), source);

        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(&config)?;
        fs::write(&self.config_path, content)
            .with_context(|| format!("Failed to write {}", self.config_path.display()))
    }

    /// Write a file relative to the workspace root.
    pub fn write_file(&self, relative: &str, content: &str) -> Result<PathBuf> {
        let path = self.output_dir.parent().unwrap_or(&self.output_dir).join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, content)?;
        Ok(path)
    }

    /// `starter` with the config file of this project.
    pub fn starter(&self) -> Command {
        let mut cmd = Command::cargo_bin("starter").expect("starter binary is built");
        cmd.env("STARTER_CONFIG", &self.config_path)
            .env("NO_COLOR", "1")
            .env_remove("RUST_LOG")
            .current_dir(&self.output_dir);
        cmd
    }

    /// The written manifest as JSON.
    pub fn manifest_json(&self) -> serde_json::Value {
        let content = fs::read_to_string(self.bundle_path().join("manifest.json"))
            .expect("manifest.json exists");
        serde_json::from_str(&content).expect("manifest.json is valid JSON")
    }
}

/// Catalog shared by several tests:
///
/// - `service` (per-service, root) depends on `procfile` and `policies/quota`
/// - `procfile` depends on `helm_charts/redis`
/// - `lonely` is never required
/// - `transformations/env` depends on nothing and nobody depends on it
pub fn rails_catalog() -> CatalogFixture {
    CatalogFixture::new()
        .named("rails")
        .service_stencil("service", "service.yml", 1, &["stencils/procfile", "policies/quota"])
        .stencil("procfile", 0, &["helm_charts/redis"])
        .stencil("lonely", 0, &[])
        .policy("quota", &[])
        .transformation("env", &[])
        .helm_release("redis", &[])
}
