//! Fetching from a template repository on the local filesystem.

use std::path::{Path, PathBuf};
use tracing::debug;

use super::{StencilFetcher, write_destination};
use crate::core::BundleError;
use crate::utils::path::file_url_to_path;

/// Copies files out of a local template directory.
///
/// Sources are plain paths or `file://` URLs. The branch is ignored; a local
/// directory is whatever is checked out.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFetcher;

impl StencilFetcher for LocalFetcher {
    async fn fetch(
        &self,
        source: &str,
        destination_folder: &Path,
        destination_name: &str,
        branch: &str,
    ) -> Result<PathBuf, BundleError> {
        let path = file_url_to_path(source);
        debug!(target: "fetch", "Copying {} (branch '{branch}' ignored)", path.display());

        let content = tokio::fs::read(&path).await.map_err(|e| BundleError::FetchFailure {
            path: source.to_string(),
            reason: e.to_string(),
        })?;

        write_destination(destination_folder, destination_name, &content).await
    }
}
