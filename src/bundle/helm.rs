//! Helm releases for project databases.

use tracing::warn;

use super::context::Database;
use super::manifest::BundleHelmRelease;
use crate::constants::HELM_CHART_REPOSITORY;

/// Chart versions for the databases that ship as Helm releases.
const DATABASE_CHARTS: [(&str, &str); 2] = [("mysql", "0.10.2"), ("postgresql", "3.1.0")];

/// The release for `database`, or `None` when the engine is unsupported.
#[must_use]
pub fn database_release(database: &Database) -> Option<BundleHelmRelease> {
    let (chart, version) =
        DATABASE_CHARTS.iter().find(|(chart, _)| *chart == database.name.as_str())?;

    Some(BundleHelmRelease {
        uid: String::new(),
        chart_name: (*chart).to_string(),
        display_name: (*chart).to_string(),
        version: (*version).to_string(),
        repository_url: HELM_CHART_REPOSITORY.to_string(),
        values_file: String::new(),
    })
}

/// Releases for every supported database; unsupported ones are skipped with a warning.
#[must_use]
pub fn database_releases(databases: &[Database]) -> Vec<BundleHelmRelease> {
    databases
        .iter()
        .filter_map(|database| {
            let release = database_release(database);
            if release.is_none() {
                warn!("Database {} not supported", database.name);
            }
            release
        })
        .collect()
}
