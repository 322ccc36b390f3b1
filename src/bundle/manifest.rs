//! The `manifest.json` document at the root of every bundle.
//!
//! Field names, nesting and order are a compatibility contract with the
//! tools that import bundles. Struct fields are declared in serialization
//! order and must not be reordered or renamed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::constants::{
    BUNDLE_ANNOTATION, BUNDLE_APP_NAME, BUNDLE_NAME, MANIFEST_FILENAME, MANIFEST_VERSION,
    PROVENANCE_TAG,
};
use crate::core::BundleError;
use crate::utils::fs::safe_write;

/// Root of `manifest.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestBundle {
    /// Manifest format version.
    pub version: String,
    /// Generation metadata, set as the last assembly step.
    pub metadata: Option<Metadata>,
    /// Bundle identifier, assigned by the importing system.
    pub uid: String,
    /// Bundle name.
    pub name: String,
    /// Stencil groups.
    pub stencil_groups: Vec<BundleStencilGroup>,
    /// One record per template source.
    pub base_templates: Vec<BundleBaseTemplate>,
    /// Required policies.
    pub policies: Vec<BundlePolicy>,
    /// Required transformations.
    pub transformations: Vec<BundleTransformation>,
    /// Bundle tags.
    pub tags: Vec<String>,
    /// Database and required Helm chart releases.
    pub helm_releases: Vec<BundleHelmRelease>,
    /// Files under `configurations/`.
    #[serde(rename = "configuration")]
    pub configurations: Vec<String>,
}

/// Generation metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// Generating application.
    pub app: String,
    /// Generation time in UTC.
    pub timestamp: DateTime<Utc>,
    /// Free-text annotations.
    pub annotations: Vec<String>,
}

/// Stencils instantiated from one template repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleBaseTemplate {
    /// Catalog name.
    pub name: String,
    /// Repository URL.
    pub repo: String,
    /// Repository branch.
    pub branch: String,
    /// Instantiated stencils.
    pub stencils: Vec<BundleStencil>,
}

/// One stencil instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleStencil {
    /// Instance identifier, assigned on import.
    pub uid: String,
    /// File name inside the bundle's `stencils/` folder.
    pub filename: String,
    /// File name of the template in the repository.
    pub template_filename: String,
    /// Service the instance belongs to, or empty.
    pub context_id: String,
    /// Lifecycle status.
    pub status: i32,
    /// Tags.
    pub tags: Vec<String>,
    /// Deployment order.
    pub sequence: i32,
}

/// A stencil group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleStencilGroup {
    /// Group identifier.
    pub uid: String,
    /// Group name.
    pub name: String,
    /// Tags.
    pub tags: Vec<String>,
}

/// A policy entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundlePolicy {
    /// Policy identifier.
    pub uid: String,
    /// Policy name.
    pub name: String,
    /// Selector the policy applies to.
    pub selector: String,
    /// Evaluation order.
    pub sequence: i32,
    /// Tags.
    pub tags: Vec<String>,
}

/// A transformation entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleTransformation {
    /// Transformation identifier.
    pub uid: String,
    /// Transformation name.
    pub name: String,
    /// Tags.
    pub tags: Vec<String>,
}

/// A Helm chart release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleHelmRelease {
    /// Release identifier.
    pub uid: String,
    /// Chart to install.
    pub chart_name: String,
    /// Name shown for the release.
    pub display_name: String,
    /// Chart version.
    pub version: String,
    /// Chart repository.
    pub repository_url: String,
    /// Values file inside the bundle, or empty.
    pub values_file: String,
}

impl Default for ManifestBundle {
    fn default() -> Self {
        Self::new()
    }
}

impl ManifestBundle {
    /// An empty manifest of the current format version.
    #[must_use]
    pub fn new() -> Self {
        Self {
            version: MANIFEST_VERSION.to_string(),
            metadata: None,
            uid: String::new(),
            name: String::new(),
            stencil_groups: Vec::new(),
            base_templates: Vec::new(),
            policies: Vec::new(),
            transformations: Vec::new(),
            tags: Vec::new(),
            helm_releases: Vec::new(),
            configurations: Vec::new(),
        }
    }

    /// Stamp generation metadata, name and tags.
    pub fn apply_metadata(&mut self, timestamp: DateTime<Utc>) {
        self.metadata = Some(Metadata {
            app: BUNDLE_APP_NAME.to_string(),
            timestamp,
            annotations: vec![BUNDLE_ANNOTATION.to_string()],
        });
        self.name = BUNDLE_NAME.to_string();
        self.tags = vec![PROVENANCE_TAG.to_string()];
    }

    /// Every stencil instance across base templates.
    pub fn stencils(&self) -> impl Iterator<Item = &BundleStencil> {
        self.base_templates.iter().flat_map(|template| template.stencils.iter())
    }

    /// Serialize with two-space indentation.
    pub fn to_json(&self) -> Result<String, BundleError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write `manifest.json` into `bundle_dir` atomically.
    pub fn save(&self, bundle_dir: &Path) -> Result<PathBuf, BundleError> {
        let path = bundle_dir.join(MANIFEST_FILENAME);
        let content = self.to_json()?;

        safe_write(&path, &content).map_err(|e| BundleError::PersistenceFailure {
            path: path.display().to_string(),
            reason: format!("{e:#}"),
        })?;

        Ok(path)
    }

    /// Read `manifest.json` from `bundle_dir`.
    pub fn load(bundle_dir: &Path) -> anyhow::Result<Self> {
        use crate::core::{FileOperation, FileResultExt};

        let path = bundle_dir.join(MANIFEST_FILENAME);
        let content = std::fs::read_to_string(&path).with_file_context(
            FileOperation::Read,
            &path,
            "loading bundle manifest",
            "bundle::ManifestBundle::load",
        )?;

        Ok(serde_json::from_str(&content)?)
    }
}
