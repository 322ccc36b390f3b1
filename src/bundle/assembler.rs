//! Turns resolved catalog units into manifest entries.
//!
//! Stencils whose `context_type` is `"service"` are instantiated once per
//! service, in service order, as `<service>_<filename>` with the service as
//! `context_id`. Every other stencil is instantiated once under its own file
//! name with an empty `context_id`. Each instance is fetched from the
//! repository's `stencils/` folder into the bundle's `stencils/` folder
//! before its entry is recorded; the first failed fetch aborts assembly.
//!
//! Stencil file names come from the repository's catalog. Every template and
//! instance file name must be a single plain path component, checked for all
//! instances before the first fetch.

use std::path::Path;
use tracing::{debug, info};

use super::manifest::{
    BundleBaseTemplate, BundleHelmRelease, BundlePolicy, BundleStencil, BundleTransformation,
    ManifestBundle,
};
use crate::catalog::{
    Catalog, HelmReleaseTemplate, PolicyTemplate, StencilTemplate, TransformationTemplate,
};
use crate::constants::{
    PROVENANCE_TAG, SERVICE_CONTEXT_TYPE, STENCIL_STATUS_PENDING_DEPLOY, STENCILS_FOLDER,
};
use crate::core::BundleError;
use crate::fetch::StencilFetcher;
use crate::resolver::RequiredUnits;
use crate::utils::path::{is_plain_file_name, join_location};

/// Where stencils come from and where they go.
#[derive(Debug, Clone, Copy)]
pub struct AssemblyTarget<'a> {
    /// Repository base location, ending in `/`.
    pub repository: &'a str,
    /// Repository branch.
    pub branch: &'a str,
    /// Repository URL recorded in the manifest.
    pub repo_url: &'a str,
    /// Bundle folder receiving fetched files.
    pub bundle_dir: &'a Path,
}

/// Manifest entries for one stencil, before any fetching.
#[must_use]
pub fn stencil_entries(stencil: &StencilTemplate, services: &[String]) -> Vec<BundleStencil> {
    if stencil.context_type == SERVICE_CONTEXT_TYPE {
        services.iter().map(|service| stencil_entry(stencil, service)).collect()
    } else {
        vec![stencil_entry(stencil, "")]
    }
}

fn stencil_entry(stencil: &StencilTemplate, context: &str) -> BundleStencil {
    let filename = if context.is_empty() {
        stencil.filename.clone()
    } else {
        format!("{context}_{}", stencil.filename)
    };

    BundleStencil {
        uid: String::new(),
        filename,
        template_filename: stencil.filename.clone(),
        context_id: context.to_string(),
        status: STENCIL_STATUS_PENDING_DEPLOY,
        tags: vec![PROVENANCE_TAG.to_string()],
        sequence: stencil.preferred_sequence,
    }
}

/// Fetch and record every instance of the required stencils.
///
/// Returns the base template record for the repository.
pub async fn assemble_stencils<F: StencilFetcher>(
    catalog: &Catalog,
    stencils: &[&StencilTemplate],
    services: &[String],
    target: &AssemblyTarget<'_>,
    fetcher: &F,
) -> Result<BundleBaseTemplate, BundleError> {
    let stencils_dir = target.bundle_dir.join(STENCILS_FOLDER);

    let mut planned = Vec::new();
    for stencil in stencils {
        check_file_name(&stencil.filename)?;
        let source =
            join_location(target.repository, &format!("{STENCILS_FOLDER}/{}", stencil.filename));

        for entry in stencil_entries(stencil, services) {
            check_file_name(&entry.filename)?;
            planned.push((stencil.name.as_str(), source.clone(), entry));
        }
    }

    let mut entries = Vec::with_capacity(planned.len());
    for (name, source, entry) in planned {
        debug!("Fetching stencil '{name}' as {}", entry.filename);
        fetcher.fetch(&source, &stencils_dir, &entry.filename, target.branch).await?;
        entries.push(entry);
    }

    info!("Added {} stencil(s) from '{}'", entries.len(), catalog.name);

    Ok(BundleBaseTemplate {
        name: catalog.name.clone(),
        repo: target.repo_url.to_string(),
        branch: target.branch.to_string(),
        stencils: entries,
    })
}

fn check_file_name(filename: &str) -> Result<(), BundleError> {
    if is_plain_file_name(filename) {
        Ok(())
    } else {
        Err(BundleError::PersistenceFailure {
            path: filename.to_string(),
            reason: format!("stencil file name must be a plain name inside '{STENCILS_FOLDER}/'"),
        })
    }
}

/// Manifest entry for a required policy.
#[must_use]
pub fn policy_entry(policy: &PolicyTemplate) -> BundlePolicy {
    BundlePolicy {
        uid: String::new(),
        name: policy.name.clone(),
        selector: String::new(),
        sequence: 0,
        tags: vec![PROVENANCE_TAG.to_string()],
    }
}

/// Manifest entry for a required transformation.
#[must_use]
pub fn transformation_entry(transformation: &TransformationTemplate) -> BundleTransformation {
    BundleTransformation {
        uid: String::new(),
        name: transformation.name.clone(),
        tags: vec![PROVENANCE_TAG.to_string()],
    }
}

/// Manifest entry for a required Helm chart.
///
/// The catalog carries no chart version or repository, so both stay empty.
#[must_use]
pub fn helm_release_entry(release: &HelmReleaseTemplate) -> BundleHelmRelease {
    BundleHelmRelease {
        uid: String::new(),
        chart_name: release.name.clone(),
        display_name: release.name.clone(),
        version: String::new(),
        repository_url: String::new(),
        values_file: String::new(),
    }
}

/// Add every required unit to `manifest`.
///
/// Stencils become one base template record; policies, transformations and
/// Helm charts are appended in catalog order.
pub async fn assemble<F: StencilFetcher>(
    manifest: &mut ManifestBundle,
    catalog: &Catalog,
    units: &RequiredUnits<'_>,
    services: &[String],
    target: &AssemblyTarget<'_>,
    fetcher: &F,
) -> Result<(), BundleError> {
    let base_template =
        assemble_stencils(catalog, &units.stencils, services, target, fetcher).await?;
    manifest.base_templates.push(base_template);

    manifest.policies.extend(units.policies.iter().copied().map(policy_entry));
    manifest.transformations.extend(units.transformations.iter().copied().map(transformation_entry));
    manifest.helm_releases.extend(units.helm_releases.iter().copied().map(helm_release_entry));

    Ok(())
}
