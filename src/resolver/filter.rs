//! Projection of catalog units onto a required set.
//!
//! Units are matched by qualified name, so a stencil and a policy that share
//! a bare name are never confused. Output keeps catalog declaration order;
//! the order of the required set plays no part.

use std::collections::BTreeSet;

use crate::catalog::{
    Catalog, HelmReleaseTemplate, PolicyTemplate, StencilTemplate, TemplateUnit,
    TransformationTemplate,
};
use crate::core::QualifiedName;

/// Units of one kind whose qualified name is in `required`.
pub fn filter_required<'a, T: TemplateUnit>(
    units: &'a [T],
    required: &BTreeSet<QualifiedName>,
) -> Vec<&'a T> {
    units.iter().filter(|unit| required.contains(&unit.qualified_name())).collect()
}

/// Stencils whose qualified name is in `required`.
pub fn filter_by_required_names<'a>(
    stencils: &'a [StencilTemplate],
    required: &BTreeSet<QualifiedName>,
) -> Vec<&'a StencilTemplate> {
    filter_required(stencils, required)
}

/// The required units of a catalog, kind by kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequiredUnits<'a> {
    /// Required stencils.
    pub stencils: Vec<&'a StencilTemplate>,
    /// Required policies.
    pub policies: Vec<&'a PolicyTemplate>,
    /// Required transformations.
    pub transformations: Vec<&'a TransformationTemplate>,
    /// Required Helm releases.
    pub helm_releases: Vec<&'a HelmReleaseTemplate>,
}

impl RequiredUnits<'_> {
    /// Total number of selected units.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stencils.len()
            + self.policies.len()
            + self.transformations.len()
            + self.helm_releases.len()
    }

    /// Whether nothing was selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Select every required unit of `catalog`.
pub fn select_required<'a>(
    catalog: &'a Catalog,
    required: &BTreeSet<QualifiedName>,
) -> RequiredUnits<'a> {
    let templates = &catalog.templates;
    RequiredUnits {
        stencils: filter_by_required_names(&templates.stencils, required),
        policies: filter_required(&templates.policies, required),
        transformations: filter_required(&templates.transformations, required),
        helm_releases: filter_required(&templates.helm_releases, required),
    }
}
