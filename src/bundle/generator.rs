//! End-to-end bundle generation.
//!
//! One call runs the whole pipeline in order:
//!
//! 1. Create the bundle folder layout in a staging directory
//! 2. Write the pack configuration file
//! 3. Add database Helm releases
//! 4. Fetch and parse `templates.json`
//! 5. Resolve the required closure
//! 6. Fetch required stencils and record every required unit
//! 7. Stamp metadata and write `manifest.json`
//! 8. Move the staging directory to `<output>/starter.bundle`
//!
//! Any failure drops the staging directory, so a failed run leaves no
//! partial bundle behind and does not touch an existing one. With
//! `overwrite`, the existing bundle is kept aside until the new one is in
//! place.

use anyhow::{Context, Result};
use chrono::Utc;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, info, warn};

use super::assembler::{AssemblyTarget, assemble};
use super::context::ProjectContext;
use super::helm::database_releases;
use super::manifest::ManifestBundle;
use crate::catalog::Catalog;
use crate::config::TemplateSource;
use crate::constants::{
    BUNDLE_DIR_NAME, BUNDLE_SUBFOLDERS, CATALOG_FILENAME, CONFIGURATIONS_FOLDER, MANIFEST_FILENAME,
};
use crate::core::BundleError;
use crate::fetch::StencilFetcher;
use crate::resolver::{CycleWarning, resolve_catalog, select_required};
use crate::utils::fs::{ensure_dir, remove_dir_all, safe_write};
use crate::utils::path::join_location;

/// Everything one generation needs.
#[derive(Debug, Clone)]
pub struct BundleRequest {
    /// Project pack, e.g. `rails`; names the configuration file.
    pub pack: String,
    /// Template source for the pack, if one is configured.
    pub source: Option<TemplateSource>,
    /// Services and databases to generate for.
    pub context: ProjectContext,
    /// Directory that receives `starter.bundle`.
    pub output_dir: PathBuf,
    /// Replace an existing bundle.
    pub overwrite: bool,
    /// Fail on dependency cycles instead of warning.
    pub deny_cycles: bool,
}

/// What a generation produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BundleOutcome {
    /// The bundle was written.
    Written {
        /// The bundle folder.
        bundle_dir: PathBuf,
        /// The manifest inside it.
        manifest_path: PathBuf,
        /// Number of stencil instances.
        stencil_count: usize,
        /// Cycles found during resolution.
        cycles: Vec<CycleWarning>,
    },
    /// No template source exists for the pack; nothing was written.
    NoTemplate {
        /// The pack without a template source.
        pack: String,
    },
}

/// Generate a bundle, fetching repository files through `fetcher`.
///
/// A pack without a template source is not an error; it yields
/// [`BundleOutcome::NoTemplate`].
pub async fn generate_bundle<F: StencilFetcher>(
    request: &BundleRequest,
    fetcher: &F,
) -> Result<BundleOutcome> {
    let Some(source) = &request.source else {
        let unavailable = BundleError::CatalogUnavailable {
            pack: request.pack.clone(),
        };
        warn!("{unavailable}");
        return Ok(BundleOutcome::NoTemplate {
            pack: request.pack.clone(),
        });
    };

    let bundle_dir = request.output_dir.join(BUNDLE_DIR_NAME);
    if bundle_dir.exists() && !request.overwrite {
        return Err(BundleError::PersistenceFailure {
            path: bundle_dir.display().to_string(),
            reason: "bundle already exists".to_string(),
        }
        .into());
    }

    ensure_dir(&request.output_dir)?;
    let staging = tempfile::Builder::new()
        .prefix(".starter.bundle-")
        .tempdir_in(&request.output_dir)
        .with_context(|| {
            format!("Failed to create staging directory in {}", request.output_dir.display())
        })?;
    debug!("Staging bundle in {}", staging.path().display());

    create_bundle_layout(staging.path())?;

    let mut manifest = ManifestBundle::new();
    let config_file = write_pack_config(&request.pack, &request.context, staging.path())?;
    manifest.configurations.push(config_file);
    manifest.helm_releases.extend(database_releases(&request.context.databases));

    let repository = source.resolved_repository()?;
    let catalog = fetch_catalog(&repository, &source.branch, fetcher).await?;
    info!("Loaded template catalog '{}' with {} unit(s)", catalog.name, catalog.unit_count());

    let mut closure = resolve_catalog(&catalog)?;
    if request.deny_cycles {
        closure = closure.deny_cycles()?;
    }
    let units = select_required(&catalog, &closure.required);
    info!("{} of {} unit(s) required", units.len(), catalog.unit_count());

    let target = AssemblyTarget {
        repository: &repository,
        branch: &source.branch,
        repo_url: source.manifest_repo(),
        bundle_dir: staging.path(),
    };
    let services = request.context.service_names();
    assemble(&mut manifest, &catalog, &units, &services, &target, fetcher)
        .await
        .with_context(|| format!("Failed to assemble stencils for '{}'", request.pack))?;

    manifest.apply_metadata(Utc::now());
    manifest.save(staging.path())?;

    publish(staging, &bundle_dir)?;
    info!("Bundle is saved to {}", bundle_dir.display());

    Ok(BundleOutcome::Written {
        manifest_path: bundle_dir.join(MANIFEST_FILENAME),
        bundle_dir,
        stencil_count: manifest.stencils().count(),
        cycles: closure.cycles,
    })
}

/// Create the standard subfolders under `bundle_dir`.
pub fn create_bundle_layout(bundle_dir: &Path) -> Result<()> {
    for subfolder in BUNDLE_SUBFOLDERS {
        ensure_dir(&bundle_dir.join(subfolder))?;
    }
    Ok(())
}

/// Write `configurations/<pack>-config` with one `KEY=VALUE` line per
/// environment variable, sorted by key. Returns the file name.
pub fn write_pack_config(pack: &str, context: &ProjectContext, bundle_dir: &Path) -> Result<String> {
    let filename = format!("{pack}-config");
    let path = bundle_dir.join(CONFIGURATIONS_FOLDER).join(&filename);

    let content: String =
        context.env_vars().iter().map(|(key, value)| format!("{key}={value}\n")).collect();

    safe_write(&path, &content).map_err(|e| BundleError::PersistenceFailure {
        path: path.display().to_string(),
        reason: format!("{e:#}"),
    })?;

    Ok(filename)
}

/// Fetch `templates.json` from the repository root into a scratch folder and parse it.
pub async fn fetch_catalog<F: StencilFetcher>(
    repository: &str,
    branch: &str,
    fetcher: &F,
) -> Result<Catalog> {
    let scratch = TempDir::new().context("Failed to create scratch directory")?;
    let source = join_location(repository, CATALOG_FILENAME);

    let path = fetcher.fetch(&source, scratch.path(), CATALOG_FILENAME, branch).await?;
    let content = tokio::fs::read_to_string(&path)
        .await
        .with_context(|| format!("Failed to read fetched catalog {}", path.display()))?;

    Ok(Catalog::from_json_str(&content, &source)?)
}

/// Move the staged bundle into place.
///
/// An existing bundle is renamed aside first and only deleted once the new
/// one is in place; if the move fails it is renamed back.
fn publish(staging: TempDir, bundle_dir: &Path) -> Result<()> {
    let persistence_failure = |e: std::io::Error| BundleError::PersistenceFailure {
        path: bundle_dir.display().to_string(),
        reason: e.to_string(),
    };

    let previous = bundle_dir.with_file_name(format!(".{BUNDLE_DIR_NAME}.previous"));
    let replacing = bundle_dir.exists();
    if replacing {
        remove_dir_all(&previous)?;
        std::fs::rename(bundle_dir, &previous).map_err(persistence_failure)?;
    }

    if let Err(e) = std::fs::rename(staging.path(), bundle_dir) {
        if replacing {
            if let Err(restore) = std::fs::rename(&previous, bundle_dir) {
                warn!(
                    "Could not restore previous bundle from {}: {restore}",
                    previous.display()
                );
            }
        }
        return Err(persistence_failure(e).into());
    }

    if replacing {
        if let Err(e) = remove_dir_all(&previous) {
            warn!("Could not remove previous bundle at {}: {e}", previous.display());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{CatalogFixture, RecordingFetcher};

    fn request(output_dir: &Path) -> BundleRequest {
        BundleRequest {
            pack: "rails".to_string(),
            source: Some(TemplateSource::new("https://example.com/rails/")),
            context: ProjectContext::from_service_names(["web"]),
            output_dir: output_dir.to_path_buf(),
            overwrite: false,
            deny_cycles: false,
        }
    }

    fn catalog_json() -> String {
        CatalogFixture::new()
            .named("rails")
            .service_stencil("service", "service.yml", 1, &["stencils/procfile"])
            .stencil("procfile", 0, &["stencils/service"])
            .to_json()
    }

    #[tokio::test]
    async fn test_no_template_source() {
        let temp = TempDir::new().unwrap();
        let mut request = request(temp.path());
        request.source = None;

        let outcome = generate_bundle(&request, &RecordingFetcher::new()).await.unwrap();
        assert_eq!(
            outcome,
            BundleOutcome::NoTemplate {
                pack: "rails".to_string()
            }
        );
        assert!(!temp.path().join(BUNDLE_DIR_NAME).exists());
    }

    #[tokio::test]
    async fn test_generates_bundle() {
        let temp = TempDir::new().unwrap();
        let fetcher = RecordingFetcher::new()
            .with_file("https://example.com/rails/templates.json", catalog_json());

        let outcome = generate_bundle(&request(temp.path()), &fetcher).await.unwrap();
        let BundleOutcome::Written {
            bundle_dir,
            stencil_count,
            cycles,
            ..
        } = outcome
        else {
            panic!("expected a written bundle");
        };

        assert_eq!(bundle_dir, temp.path().join("starter.bundle"));
        assert_eq!(stencil_count, 2);
        assert_eq!(cycles.len(), 1);
        for subfolder in BUNDLE_SUBFOLDERS {
            assert!(bundle_dir.join(subfolder).is_dir(), "{subfolder}");
        }
        assert!(bundle_dir.join("stencils/web_service.yml").is_file());
        assert!(bundle_dir.join("stencils/procfile.yml").is_file());
        assert!(bundle_dir.join("configurations/rails-config").is_file());

        let manifest = ManifestBundle::load(&bundle_dir).unwrap();
        assert_eq!(manifest.configurations, ["rails-config"]);
        assert_eq!(manifest.name, "starter-formation");
        assert_eq!(manifest.base_templates[0].repo, "https://example.com/rails/");
    }

    #[tokio::test]
    async fn test_existing_bundle_requires_overwrite() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join(BUNDLE_DIR_NAME)).unwrap();
        let fetcher = RecordingFetcher::new()
            .with_file("https://example.com/rails/templates.json", catalog_json());

        let err = generate_bundle(&request(temp.path()), &fetcher).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BundleError>(),
            Some(BundleError::PersistenceFailure { .. })
        ));
        assert!(fetcher.requests().is_empty());

        let mut request = request(temp.path());
        request.overwrite = true;
        assert!(generate_bundle(&request, &fetcher).await.is_ok());
    }

    #[tokio::test]
    async fn test_failure_leaves_no_bundle() {
        let temp = TempDir::new().unwrap();
        let fetcher = RecordingFetcher::new()
            .with_file("https://example.com/rails/templates.json", catalog_json())
            .failing_on("procfile.yml");

        let err = generate_bundle(&request(temp.path()), &fetcher).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BundleError>(),
            Some(BundleError::FetchFailure { .. })
        ));

        let leftovers: Vec<_> = std::fs::read_dir(temp.path()).unwrap().collect();
        assert!(leftovers.is_empty(), "{leftovers:?}");
    }

    #[tokio::test]
    async fn test_deny_cycles() {
        let temp = TempDir::new().unwrap();
        let fetcher = RecordingFetcher::new()
            .with_file("https://example.com/rails/templates.json", catalog_json());
        let mut request = request(temp.path());
        request.deny_cycles = true;

        let err = generate_bundle(&request, &fetcher).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BundleError>(),
            Some(BundleError::CycleDetected { .. })
        ));
    }

    #[test]
    fn test_publish_replaces_existing_bundle() {
        let temp = TempDir::new().unwrap();
        let bundle_dir = temp.path().join(BUNDLE_DIR_NAME);
        std::fs::create_dir_all(&bundle_dir).unwrap();
        std::fs::write(bundle_dir.join("old.txt"), "old").unwrap();

        let staging = tempfile::Builder::new().tempdir_in(temp.path()).unwrap();
        std::fs::write(staging.path().join("new.txt"), "new").unwrap();

        publish(staging, &bundle_dir).unwrap();
        assert!(bundle_dir.join("new.txt").exists());
        assert!(!bundle_dir.join("old.txt").exists());
        assert!(!temp.path().join(".starter.bundle.previous").exists());
    }

    #[test]
    fn test_failed_publish_keeps_existing_bundle() {
        let temp = TempDir::new().unwrap();
        let bundle_dir = temp.path().join(BUNDLE_DIR_NAME);
        std::fs::create_dir_all(&bundle_dir).unwrap();
        std::fs::write(bundle_dir.join("old.txt"), "old").unwrap();

        let staging = tempfile::Builder::new().tempdir_in(temp.path()).unwrap();
        std::fs::remove_dir(staging.path()).unwrap();

        let err = publish(staging, &bundle_dir).unwrap_err();
        assert!(err.to_string().contains("Failed to write"));
        assert_eq!(std::fs::read_to_string(bundle_dir.join("old.txt")).unwrap(), "old");
        assert!(!temp.path().join(".starter.bundle.previous").exists());
    }

    #[test]
    fn test_write_pack_config_sorted() {
        let temp = TempDir::new().unwrap();
        create_bundle_layout(temp.path()).unwrap();
        let context = ProjectContext::from_yaml_str(
            "services:\n  - name: web\n    env_vars:\n      ZED: \"1\"\n      ALPHA: \"2\"\n",
            "ctx.yml",
        )
        .unwrap();

        let filename = write_pack_config("node", &context, temp.path()).unwrap();
        assert_eq!(filename, "node-config");

        let content =
            std::fs::read_to_string(temp.path().join("configurations/node-config")).unwrap();
        assert_eq!(content, "ALPHA=2\nZED=1\n");
    }
}
