//! Per-project context: the services and databases a bundle is generated for.
//!
//! Usually read from a YAML file produced by project analysis:
//!
//! ```yaml
//! services:
//!   - name: web
//!     env_vars:
//!       RAILS_ENV: production
//!       PORT: "3000"
//!   - name: worker
//! databases:
//!   - name: postgresql
//! ```
//!
//! Service order is significant: per-service stencils are instantiated in
//! this order.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::core::BundleError;

/// Services and databases of the project being bundled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectContext {
    /// Services, in instantiation order.
    #[serde(default)]
    pub services: Vec<Service>,
    /// Databases the project uses.
    #[serde(default)]
    pub databases: Vec<Database>,
}

/// One deployable service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    /// Service name; prefixes per-service stencil file names.
    pub name: String,
    /// Environment variables written to the pack configuration file.
    #[serde(default)]
    pub env_vars: BTreeMap<String, String>,
}

/// A database dependency.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Database {
    /// Database engine, e.g. `mysql` or `postgresql`.
    pub name: String,
}

impl ProjectContext {
    /// Read a context file.
    pub fn load(path: &Path) -> Result<Self, BundleError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| BundleError::ContextParseError {
                file: path.display().to_string(),
                reason: e.to_string(),
            })?;

        Self::from_yaml_str(&content, &path.display().to_string())
    }

    /// Parse context YAML; `origin` names the source in errors.
    pub fn from_yaml_str(content: &str, origin: &str) -> Result<Self, BundleError> {
        serde_yaml::from_str(content).map_err(|e| BundleError::ContextParseError {
            file: origin.to_string(),
            reason: e.to_string(),
        })
    }

    /// A context with the given services and nothing else.
    pub fn from_service_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            services: names
                .into_iter()
                .map(|name| Service {
                    name: name.into(),
                    env_vars: BTreeMap::new(),
                })
                .collect(),
            databases: Vec::new(),
        }
    }

    /// Add services not already present, keeping existing order.
    pub fn add_services<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            let name = name.into();
            if !self.services.iter().any(|service| service.name == name) {
                self.services.push(Service {
                    name,
                    env_vars: BTreeMap::new(),
                });
            }
        }
    }

    /// Add databases not already present.
    pub fn add_databases<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            let name = name.into();
            if !self.databases.iter().any(|database| database.name == name) {
                self.databases.push(Database {
                    name,
                });
            }
        }
    }

    /// Service names in order.
    #[must_use]
    pub fn service_names(&self) -> Vec<String> {
        self.services.iter().map(|service| service.name.clone()).collect()
    }

    /// Environment variables of all services merged, later services winning.
    #[must_use]
    pub fn env_vars(&self) -> BTreeMap<String, String> {
        self.services
            .iter()
            .flat_map(|service| service.env_vars.iter())
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }
}
