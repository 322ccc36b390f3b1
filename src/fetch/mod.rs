//! Retrieval of template repository files into the bundle.
//!
//! Bundle generation never talks to the network or the template directory
//! itself. It hands a source location, a destination folder, a destination
//! file name and a branch to a [`StencilFetcher`] and gets back the path of
//! the written file. Implementations:
//!
//! - [`HttpFetcher`] - HTTP(S) repositories, with per-request timeout and
//!   exponential-backoff retries
//! - [`LocalFetcher`] - local directories and `file://` URLs
//! - [`RepositoryFetcher`] - picks one of the above from a repository location
//!
//! Tests use `test_utils::RecordingFetcher`, which records every request.

mod http;
mod local;

use std::future::Future;
use std::path::{Path, PathBuf};

use crate::config::FetchSettings;
use crate::core::BundleError;
use crate::utils::path::is_remote;

pub use http::HttpFetcher;
pub use local::LocalFetcher;

/// Copies one file from a template repository to a local destination.
pub trait StencilFetcher {
    /// Fetch `source` into `destination_folder/destination_name`.
    ///
    /// `branch` names the repository branch for sources that are branch
    /// aware. Returns the path of the written file, or
    /// [`BundleError::FetchFailure`] naming `source`.
    fn fetch(
        &self,
        source: &str,
        destination_folder: &Path,
        destination_name: &str,
        branch: &str,
    ) -> impl Future<Output = Result<PathBuf, BundleError>> + Send;
}

/// Fetcher chosen from the form of a repository location.
#[derive(Debug, Clone)]
pub enum RepositoryFetcher {
    /// HTTP(S) repository
    Http(HttpFetcher),
    /// Local directory or `file://` repository
    Local(LocalFetcher),
}

impl RepositoryFetcher {
    /// Pick the fetcher for `repository`.
    pub fn for_repository(repository: &str, settings: &FetchSettings) -> Result<Self, BundleError> {
        if is_remote(repository) {
            Ok(Self::Http(HttpFetcher::new(settings)?))
        } else {
            Ok(Self::Local(LocalFetcher))
        }
    }
}

impl StencilFetcher for RepositoryFetcher {
    async fn fetch(
        &self,
        source: &str,
        destination_folder: &Path,
        destination_name: &str,
        branch: &str,
    ) -> Result<PathBuf, BundleError> {
        match self {
            Self::Http(fetcher) => {
                fetcher.fetch(source, destination_folder, destination_name, branch).await
            }
            Self::Local(fetcher) => {
                fetcher.fetch(source, destination_folder, destination_name, branch).await
            }
        }
    }
}

/// Write fetched bytes to their destination, creating the folder.
async fn write_destination(
    destination_folder: &Path,
    destination_name: &str,
    content: &[u8],
) -> Result<PathBuf, BundleError> {
    let destination = destination_folder.join(destination_name);
    let persistence_failure = |e: std::io::Error| BundleError::PersistenceFailure {
        path: destination.display().to_string(),
        reason: e.to_string(),
    };

    tokio::fs::create_dir_all(destination_folder).await.map_err(persistence_failure)?;
    tokio::fs::write(&destination, content).await.map_err(persistence_failure)?;

    Ok(destination)
}
