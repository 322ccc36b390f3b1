//! Typed view over a template repository's `templates.json`.
//!
//! A catalog declares four lists of units (stencils, policies,
//! transformations and Helm releases). Every unit has a `name` that is unique
//! within its kind and a list of `dependencies`, each of which is a
//! [`QualifiedName`] string such as `"stencils/dockerfile"` or
//! `"helm_charts/redis"`.
//!
//! The catalog is read-only input. Resolution and filtering borrow it; nothing
//! in this crate mutates a loaded catalog.
//!
//! # Format
//!
//! ```json
//! {
//!   "version": "1",
//!   "public": true,
//!   "name": "rails",
//!   "icon": "",
//!   "long_name": "Ruby on Rails",
//!   "description": "Stencils for Rails applications",
//!   "templates": {
//!     "stencils": [
//!       {
//!         "name": "service",
//!         "filename": "service.yml",
//!         "context_type": "service",
//!         "min_usage": 1,
//!         "dependencies": ["stencils/procfile"]
//!       }
//!     ],
//!     "policies": [],
//!     "transformations": [],
//!     "helm_releases": []
//!   }
//! }
//! ```
//!
//! Lists that are missing or `null` are read as empty.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::warn;

use crate::constants::SIMILARITY_THRESHOLD_PERCENT;
use crate::core::{BundleError, FileOperation, FileResultExt, QualifiedName, UnitKind};

/// Parsed contents of a `templates.json` catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    /// Catalog format version.
    #[serde(default)]
    pub version: String,
    /// Whether the template repository is publicly listed.
    #[serde(default)]
    pub public: bool,
    /// Short name, recorded as the base template name in the manifest.
    #[serde(default)]
    pub name: String,
    /// Icon reference.
    #[serde(default)]
    pub icon: String,
    /// Human-readable name.
    #[serde(default)]
    pub long_name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// The declared units.
    #[serde(default, deserialize_with = "null_as_default")]
    pub templates: Templates,
}

/// The four unit lists of a catalog, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Templates {
    /// Stencil templates.
    #[serde(default, deserialize_with = "null_as_default")]
    pub stencils: Vec<StencilTemplate>,
    /// Policy templates.
    #[serde(default, deserialize_with = "null_as_default")]
    pub policies: Vec<PolicyTemplate>,
    /// Transformation templates.
    #[serde(default, deserialize_with = "null_as_default")]
    pub transformations: Vec<TransformationTemplate>,
    /// Helm release templates, referenced as `helm_charts/<name>`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub helm_releases: Vec<HelmReleaseTemplate>,
}

/// A templated file that is fetched into the bundle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StencilTemplate {
    /// Unit name, unique among stencils.
    pub name: String,
    /// Pattern describing generated file names.
    #[serde(default)]
    pub filename_pattern: String,
    /// File name under the repository's `stencils/` folder.
    #[serde(default)]
    pub filename: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// `"service"` for per-service stencils; anything else is instantiated once.
    #[serde(default)]
    pub context_type: String,
    /// Catalog tags.
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    /// Sequence number copied into manifest entries.
    #[serde(default)]
    pub preferred_sequence: i32,
    /// Whether the catalog suggests this stencil.
    #[serde(default)]
    pub suggested: bool,
    /// Stencils with a positive minimum usage are resolution roots.
    #[serde(default)]
    pub min_usage: i32,
    /// Maximum usage count.
    #[serde(default)]
    pub max_usage: i32,
    /// Qualified names this stencil depends on.
    #[serde(default, deserialize_with = "null_as_default")]
    pub dependencies: Vec<String>,
}

/// A deployment policy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyTemplate {
    /// Unit name, unique among policies.
    pub name: String,
    /// Qualified names this policy depends on.
    #[serde(default, deserialize_with = "null_as_default")]
    pub dependencies: Vec<String>,
}

/// A manifest transformation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformationTemplate {
    /// Unit name, unique among transformations.
    pub name: String,
    /// Qualified names this transformation depends on.
    #[serde(default, deserialize_with = "null_as_default")]
    pub dependencies: Vec<String>,
}

/// A Helm chart release.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelmReleaseTemplate {
    /// Unit name, unique among Helm releases.
    pub name: String,
    /// Qualified names this release depends on.
    #[serde(default, deserialize_with = "null_as_default")]
    pub dependencies: Vec<String>,
}

/// Fields shared by every catalog unit type.
pub trait TemplateUnit {
    /// The kind tag every value of this type carries.
    const KIND: UnitKind;

    /// The bare unit name.
    fn name(&self) -> &str;

    /// The declared dependency references, unparsed.
    fn dependencies(&self) -> &[String];

    /// `<type>/<name>` for this unit.
    fn qualified_name(&self) -> QualifiedName {
        Self::KIND.qualify(self.name())
    }
}

macro_rules! impl_template_unit {
    ($($ty:ty => $kind:expr),* $(,)?) => {
        $(
            impl TemplateUnit for $ty {
                const KIND: UnitKind = $kind;

                fn name(&self) -> &str {
                    &self.name
                }

                fn dependencies(&self) -> &[String] {
                    &self.dependencies
                }
            }
        )*
    };
}

impl_template_unit! {
    StencilTemplate => UnitKind::Stencil,
    PolicyTemplate => UnitKind::Policy,
    TransformationTemplate => UnitKind::Transformation,
    HelmReleaseTemplate => UnitKind::HelmRelease,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Borrowed view of any catalog unit.
///
/// Lets resolution and graph building treat the four unit kinds uniformly
/// while keeping their distinct fields available.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogUnit<'a> {
    /// A stencil template
    Stencil(&'a StencilTemplate),
    /// A policy template
    Policy(&'a PolicyTemplate),
    /// A transformation template
    Transformation(&'a TransformationTemplate),
    /// A Helm release template
    HelmRelease(&'a HelmReleaseTemplate),
}

impl<'a> CatalogUnit<'a> {
    /// The kind tag of this unit.
    #[must_use]
    pub const fn kind(&self) -> UnitKind {
        match self {
            Self::Stencil(_) => UnitKind::Stencil,
            Self::Policy(_) => UnitKind::Policy,
            Self::Transformation(_) => UnitKind::Transformation,
            Self::HelmRelease(_) => UnitKind::HelmRelease,
        }
    }

    /// The bare unit name.
    #[must_use]
    pub fn name(&self) -> &'a str {
        match self {
            Self::Stencil(unit) => &unit.name,
            Self::Policy(unit) => &unit.name,
            Self::Transformation(unit) => &unit.name,
            Self::HelmRelease(unit) => &unit.name,
        }
    }

    /// The declared dependency references, unparsed.
    #[must_use]
    pub fn dependencies(&self) -> &'a [String] {
        match self {
            Self::Stencil(unit) => &unit.dependencies,
            Self::Policy(unit) => &unit.dependencies,
            Self::Transformation(unit) => &unit.dependencies,
            Self::HelmRelease(unit) => &unit.dependencies,
        }
    }

    /// `<type>/<name>` for this unit.
    #[must_use]
    pub fn qualified_name(&self) -> QualifiedName {
        self.kind().qualify(self.name())
    }
}

impl Catalog {
    /// Parse a catalog from JSON text.
    ///
    /// `origin` names the source in error messages.
    pub fn from_json_str(content: &str, origin: &str) -> Result<Self, BundleError> {
        let catalog: Self =
            serde_json::from_str(content).map_err(|e| BundleError::CatalogParseError {
                file: origin.to_string(),
                reason: e.to_string(),
            })?;

        for duplicate in catalog.duplicate_units() {
            warn!(
                "Catalog '{}' declares '{duplicate}' more than once; the first declaration wins",
                catalog.name
            );
        }

        Ok(catalog)
    }

    /// Read and parse a catalog file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path).with_file_context(
            FileOperation::Read,
            path,
            "loading template catalog",
            "catalog::Catalog::load",
        )?;

        Ok(Self::from_json_str(&content, &path.display().to_string())?)
    }

    /// Iterate over every unit in declaration order, kind by kind.
    pub fn units(&self) -> impl Iterator<Item = CatalogUnit<'_>> {
        let templates = &self.templates;
        templates
            .stencils
            .iter()
            .map(CatalogUnit::Stencil)
            .chain(templates.policies.iter().map(CatalogUnit::Policy))
            .chain(templates.transformations.iter().map(CatalogUnit::Transformation))
            .chain(templates.helm_releases.iter().map(CatalogUnit::HelmRelease))
    }

    /// Iterate over the units of one kind in declaration order.
    pub fn units_of(&self, kind: UnitKind) -> Box<dyn Iterator<Item = CatalogUnit<'_>> + '_> {
        let templates = &self.templates;
        match kind {
            UnitKind::Stencil => Box::new(templates.stencils.iter().map(CatalogUnit::Stencil)),
            UnitKind::Policy => Box::new(templates.policies.iter().map(CatalogUnit::Policy)),
            UnitKind::Transformation => {
                Box::new(templates.transformations.iter().map(CatalogUnit::Transformation))
            }
            UnitKind::HelmRelease => {
                Box::new(templates.helm_releases.iter().map(CatalogUnit::HelmRelease))
            }
        }
    }

    /// Find the first unit of `kind` called `name`.
    #[must_use]
    pub fn find(&self, kind: UnitKind, name: &str) -> Option<CatalogUnit<'_>> {
        self.units_of(kind).find(|unit| unit.name() == name)
    }

    /// Dependencies declared by the unit `kind`/`name`.
    ///
    /// Returns [`BundleError::UnresolvedDependency`] when no such unit exists.
    pub fn lookup(&self, kind: UnitKind, name: &str) -> Result<&[String], BundleError> {
        self.find(kind, name).map(|unit| unit.dependencies()).ok_or_else(|| {
            let qualified = kind.qualify(name);
            let mut reason = format!("could not find dependency with name '{qualified}'");
            if let Some(candidate) = self.closest_name(kind, name) {
                reason.push_str(&format!(", did you mean '{}'?", kind.qualify(candidate)));
            }
            BundleError::UnresolvedDependency {
                name: qualified.to_string(),
                reason,
            }
        })
    }

    /// Dependencies declared by the unit a qualified name refers to.
    pub fn dependencies_of(&self, name: &QualifiedName) -> Result<&[String], BundleError> {
        self.lookup(name.kind(), name.name())
    }

    /// Qualified names declared more than once within their kind.
    #[must_use]
    pub fn duplicate_units(&self) -> Vec<QualifiedName> {
        let mut counts: BTreeMap<QualifiedName, usize> = BTreeMap::new();
        for unit in self.units() {
            *counts.entry(unit.qualified_name()).or_default() += 1;
        }
        counts.into_iter().filter(|(_, count)| *count > 1).map(|(name, _)| name).collect()
    }

    /// Total number of declared units.
    #[must_use]
    pub fn unit_count(&self) -> usize {
        let templates = &self.templates;
        templates.stencils.len()
            + templates.policies.len()
            + templates.transformations.len()
            + templates.helm_releases.len()
    }

    fn closest_name(&self, kind: UnitKind, name: &str) -> Option<&str> {
        let threshold = (name.len() * SIMILARITY_THRESHOLD_PERCENT / 100).max(1);
        self.units_of(kind)
            .map(|unit| (unit.name(), strsim::levenshtein(name, unit.name())))
            .filter(|(_, distance)| *distance <= threshold)
            .min_by_key(|(_, distance)| *distance)
            .map(|(candidate, _)| candidate)
    }
}
