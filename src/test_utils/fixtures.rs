//! Builders for sample catalogs and template repositories.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::catalog::{
    Catalog, HelmReleaseTemplate, PolicyTemplate, StencilTemplate, Templates,
    TransformationTemplate,
};
use crate::constants::{CATALOG_FILENAME, SERVICE_CONTEXT_TYPE, STENCILS_FOLDER};

/// Builder for [`Catalog`] values.
///
/// Units are kept in the order they are added. Stencils added with
/// [`stencil`](Self::stencil) use `<name>.yml` as their file name.
///
/// ```rust,no_run
/// use starter_bundle::test_utils::CatalogFixture;
///
/// let catalog = CatalogFixture::new()
///     .named("rails")
///     .service_stencil("service", "service.yml", 1, &["stencils/procfile"])
///     .stencil("procfile", 0, &[])
///     .build();
/// assert_eq!(catalog.templates.stencils.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CatalogFixture {
    catalog: Catalog,
}

fn owned(dependencies: &[&str]) -> Vec<String> {
    dependencies.iter().map(ToString::to_string).collect()
}

impl CatalogFixture {
    /// An empty catalog named `test`.
    pub fn new() -> Self {
        Self {
            catalog: Catalog {
                version: "1".to_string(),
                name: "test".to_string(),
                templates: Templates::default(),
                ..Catalog::default()
            },
        }
    }

    /// Set the catalog name.
    pub fn named(mut self, name: &str) -> Self {
        self.catalog.name = name.to_string();
        self
    }

    /// Add a single-instance stencil stored as `<name>.yml`.
    pub fn stencil(self, name: &str, min_usage: i32, dependencies: &[&str]) -> Self {
        self.stencil_template(StencilTemplate {
            name: name.to_string(),
            filename: format!("{name}.yml"),
            min_usage,
            dependencies: owned(dependencies),
            ..StencilTemplate::default()
        })
    }

    /// Add a per-service stencil.
    pub fn service_stencil(
        self,
        name: &str,
        filename: &str,
        min_usage: i32,
        dependencies: &[&str],
    ) -> Self {
        self.stencil_template(StencilTemplate {
            name: name.to_string(),
            filename: filename.to_string(),
            context_type: SERVICE_CONTEXT_TYPE.to_string(),
            min_usage,
            dependencies: owned(dependencies),
            ..StencilTemplate::default()
        })
    }

    /// Add a fully specified stencil.
    pub fn stencil_template(mut self, stencil: StencilTemplate) -> Self {
        self.catalog.templates.stencils.push(stencil);
        self
    }

    /// Add a policy.
    pub fn policy(mut self, name: &str, dependencies: &[&str]) -> Self {
        self.catalog.templates.policies.push(PolicyTemplate {
            name: name.to_string(),
            dependencies: owned(dependencies),
        });
        self
    }

    /// Add a transformation.
    pub fn transformation(mut self, name: &str, dependencies: &[&str]) -> Self {
        self.catalog.templates.transformations.push(TransformationTemplate {
            name: name.to_string(),
            dependencies: owned(dependencies),
        });
        self
    }

    /// Add a Helm release.
    pub fn helm_release(mut self, name: &str, dependencies: &[&str]) -> Self {
        self.catalog.templates.helm_releases.push(HelmReleaseTemplate {
            name: name.to_string(),
            dependencies: owned(dependencies),
        });
        self
    }

    /// The built catalog.
    pub fn build(self) -> Catalog {
        self.catalog
    }

    /// The catalog as `templates.json` content.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(&self.catalog).unwrap_or_else(|e| {
            panic!("Failed to serialize catalog fixture: {e}");
        })
    }

    /// Write a local template repository rooted at `dir`.
    ///
    /// Creates `templates.json` and one `stencils/<filename>` per stencil,
    /// whose content names the stencil.
    pub fn write_repo(&self, dir: &Path) -> Result<()> {
        let stencils_dir = dir.join(STENCILS_FOLDER);
        fs::create_dir_all(&stencils_dir)
            .with_context(|| format!("Failed to create {}", stencils_dir.display()))?;

        fs::write(dir.join(CATALOG_FILENAME), self.to_json())
            .with_context(|| format!("Failed to write catalog in {}", dir.display()))?;

        for stencil in &self.catalog.templates.stencils {
            fs::write(stencils_dir.join(&stencil.filename), format!("# stencil {}\n", stencil.name))
                .with_context(|| format!("Failed to write stencil {}", stencil.filename))?;
        }

        Ok(())
    }
}
