//! In-memory [`StencilFetcher`] that records requests.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::core::BundleError;
use crate::fetch::StencilFetcher;

/// One recorded fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    /// Source location as passed to the fetcher.
    pub source: String,
    /// `destination_folder/destination_name`.
    pub destination: PathBuf,
    /// Branch as passed to the fetcher.
    pub branch: String,
}

/// Fetcher that records every request and writes canned content.
///
/// A source registered with [`with_file`](Self::with_file) gets that
/// content; any other source gets its own location as content. Sources
/// containing the [`failing_on`](Self::failing_on) fragment fail with
/// [`BundleError::FetchFailure`] and write nothing.
#[derive(Debug, Default)]
pub struct RecordingFetcher {
    files: HashMap<String, String>,
    failing_fragment: Option<String>,
    requests: Mutex<Vec<FetchRequest>>,
}

impl RecordingFetcher {
    /// A fetcher that succeeds for every source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `content` for `source`.
    pub fn with_file(mut self, source: &str, content: impl Into<String>) -> Self {
        self.files.insert(source.to_string(), content.into());
        self
    }

    /// Fail every source containing `fragment`.
    pub fn failing_on(mut self, fragment: &str) -> Self {
        self.failing_fragment = Some(fragment.to_string());
        self
    }

    /// Requests seen so far, in order.
    pub fn requests(&self) -> Vec<FetchRequest> {
        self.requests.lock().map(|requests| requests.clone()).unwrap_or_default()
    }
}

impl StencilFetcher for RecordingFetcher {
    async fn fetch(
        &self,
        source: &str,
        destination_folder: &Path,
        destination_name: &str,
        branch: &str,
    ) -> Result<PathBuf, BundleError> {
        let destination = destination_folder.join(destination_name);
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(FetchRequest {
                source: source.to_string(),
                destination: destination.clone(),
                branch: branch.to_string(),
            });
        }

        if self.failing_fragment.as_deref().is_some_and(|fragment| source.contains(fragment)) {
            return Err(BundleError::FetchFailure {
                path: source.to_string(),
                reason: "simulated failure".to_string(),
            });
        }

        let content = self.files.get(source).map_or(source, String::as_str);
        std::fs::create_dir_all(destination_folder)
            .and_then(|()| std::fs::write(&destination, content))
            .map_err(|e| BundleError::PersistenceFailure {
                path: destination.display().to_string(),
                reason: e.to_string(),
            })?;

        Ok(destination)
    }
}
