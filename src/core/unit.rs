//! Catalog unit kinds and qualified names.
//!
//! Every unit in a template catalog is addressed by a *qualified name* of the
//! form `<type>/<name>`, where `<type>` is one of `stencils`, `policies`,
//! `transformations` or `helm_charts`. The kind tag alone determines the
//! prefix, so building a qualified name is a pure function over [`UnitKind`].
//!
//! # Examples
//!
//! ```rust
//! use starter_bundle::core::{QualifiedName, UnitKind};
//!
//! let name = UnitKind::Stencil.qualify("dockerfile");
//! assert_eq!(name.to_string(), "stencils/dockerfile");
//!
//! let parsed = QualifiedName::parse("helm_charts/redis").unwrap();
//! assert_eq!(parsed.kind(), UnitKind::HelmRelease);
//! assert_eq!(parsed.name(), "redis");
//!
//! assert!(QualifiedName::parse("stencils/a/b").is_err());
//! ```

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use super::error::BundleError;

/// The four kinds of units a template catalog can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    /// Templated file, optionally instantiated once per service.
    Stencil,
    /// Deployment policy.
    Policy,
    /// Manifest transformation.
    Transformation,
    /// Helm chart release.
    HelmRelease,
}

impl UnitKind {
    /// All kinds, in catalog declaration order.
    pub const ALL: [Self; 4] = [Self::Stencil, Self::Policy, Self::Transformation, Self::HelmRelease];

    /// The `<type>` segment used in qualified names.
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Stencil => "stencils",
            Self::Policy => "policies",
            Self::Transformation => "transformations",
            Self::HelmRelease => "helm_charts",
        }
    }

    /// Look up a kind by its qualified-name prefix.
    #[must_use]
    pub fn from_prefix(prefix: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.prefix() == prefix)
    }

    /// Build the qualified name of the unit `name` of this kind.
    #[must_use]
    pub fn qualify(self, name: &str) -> QualifiedName {
        QualifiedName::new(self, name)
    }
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Stencil => "stencil",
            Self::Policy => "policy",
            Self::Transformation => "transformation",
            Self::HelmRelease => "helm release",
        };
        f.write_str(label)
    }
}

impl FromStr for UnitKind {
    type Err = BundleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_prefix(s).ok_or_else(|| BundleError::UnresolvedDependency {
            name: s.to_string(),
            reason: format!("unknown template type '{s}', expected {}", expected_types()),
        })
    }
}

fn expected_types() -> String {
    UnitKind::ALL.iter().map(|kind| format!("'{}'", kind.prefix())).collect::<Vec<_>>().join(", ")
}

/// A `<type>/<name>` reference to exactly one catalog unit.
///
/// Ordering compares the kind first and the bare name second, which keeps
/// sets of qualified names grouped by kind when iterated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QualifiedName {
    kind: UnitKind,
    name: String,
}

impl QualifiedName {
    /// Create a qualified name from its parts.
    pub fn new(kind: UnitKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }

    /// Parse a raw dependency reference.
    ///
    /// The reference must split on `/` into exactly two parts and the first
    /// part must be a known type. Anything else is an
    /// [`BundleError::UnresolvedDependency`].
    pub fn parse(raw: &str) -> Result<Self, BundleError> {
        let malformed = || BundleError::UnresolvedDependency {
            name: raw.to_string(),
            reason: format!(
                "dependency name should be 'TEMPLATE_TYPE/TEMPLATE_NAME', where TEMPLATE_TYPE is one of {}",
                expected_types()
            ),
        };

        let mut parts = raw.split('/');
        let (Some(prefix), Some(name), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(malformed());
        };
        let kind = UnitKind::from_prefix(prefix).ok_or_else(malformed)?;

        Ok(Self::new(kind, name))
    }

    /// The unit kind.
    #[must_use]
    pub const fn kind(&self) -> UnitKind {
        self.kind
    }

    /// The bare unit name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind.prefix(), self.name)
    }
}

impl FromStr for QualifiedName {
    type Err = BundleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for QualifiedName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for QualifiedName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qualify_uses_kind_prefix() {
        assert_eq!(UnitKind::Stencil.qualify("web").to_string(), "stencils/web");
        assert_eq!(UnitKind::Policy.qualify("quota").to_string(), "policies/quota");
        assert_eq!(UnitKind::Transformation.qualify("ns").to_string(), "transformations/ns");
        assert_eq!(UnitKind::HelmRelease.qualify("redis").to_string(), "helm_charts/redis");
    }

    #[test]
    fn test_parse_round_trips_display() {
        for kind in UnitKind::ALL {
            let name = kind.qualify("unit");
            assert_eq!(QualifiedName::parse(&name.to_string()).unwrap(), name);
        }
    }

    #[test]
    fn test_parse_rejects_wrong_part_count() {
        for raw in ["stencils", "stencils/a/b", ""] {
            let err = QualifiedName::parse(raw).unwrap_err();
            assert!(
                matches!(err, BundleError::UnresolvedDependency { ref name, .. } if name == raw),
                "unexpected error for {raw:?}: {err}"
            );
        }
    }

    #[test]
    fn test_parse_rejects_unknown_type() {
        let err = QualifiedName::parse("helm_releases/redis").unwrap_err();
        assert!(err.to_string().contains("helm_releases/redis"));
        assert!(err.to_string().contains("'helm_charts'"));
    }

    #[test]
    fn test_unit_kind_from_str() {
        assert_eq!("policies".parse::<UnitKind>().unwrap(), UnitKind::Policy);
        assert!("policy".parse::<UnitKind>().is_err());
    }

    #[test]
    fn test_serde_as_string() {
        let name = UnitKind::Stencil.qualify("procfile");
        let json = serde_json::to_string(&name).unwrap();
        assert_eq!(json, "\"stencils/procfile\"");

        let parsed: QualifiedName = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, name);
        assert!(serde_json::from_str::<QualifiedName>("\"nope\"").is_err());
    }
}
