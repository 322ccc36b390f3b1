//! Fetching from a template repository served over HTTP(S).

use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio_retry::RetryIf;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{debug, warn};

use super::{StencilFetcher, write_destination};
use crate::config::FetchSettings;
use crate::constants::BRANCH_PLACEHOLDER;
use crate::core::BundleError;

/// Downloads files with `reqwest`.
///
/// `{branch}` in a source URL is replaced by the requested branch. Connection
/// errors, timeouts and 5xx responses are retried with exponential backoff;
/// other HTTP errors fail at once.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    settings: FetchSettings,
}

#[derive(Debug)]
enum AttemptError {
    Transient(String),
    Permanent(String),
}

impl AttemptError {
    const fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }

    fn into_reason(self) -> String {
        match self {
            Self::Transient(reason) | Self::Permanent(reason) => reason,
        }
    }
}

impl HttpFetcher {
    /// Build a client with the configured timeout.
    pub fn new(settings: &FetchSettings) -> Result<Self, BundleError> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout())
            .user_agent(concat!("starter/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| BundleError::Other {
                message: format!("Failed to create HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            settings: settings.clone(),
        })
    }

    /// The URL actually requested for `source` on `branch`.
    #[must_use]
    pub fn resolve_url(source: &str, branch: &str) -> String {
        source.replace(BRANCH_PLACEHOLDER, branch)
    }

    /// Delays before each retry: the initial delay, doubling, capped, jittered.
    fn retry_strategy(&self) -> impl Iterator<Item = Duration> + use<> {
        ExponentialBackoff::from_millis(2)
            .factor((self.settings.initial_delay_ms / 2).max(1))
            .max_delay(self.settings.max_delay())
            .map(jitter)
            .take(self.settings.max_attempts.saturating_sub(1))
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>, AttemptError> {
        let response = self.client.get(url).send().await.map_err(|e| {
            warn!(target: "fetch", "Request to {url} failed: {e}");
            AttemptError::Transient(e.to_string())
        })?;

        let status = response.status();
        if status.is_server_error() {
            warn!(target: "fetch", "Request to {url} returned HTTP {status}");
            return Err(AttemptError::Transient(format!("HTTP {status}")));
        }
        if !status.is_success() {
            return Err(AttemptError::Permanent(format!("HTTP {status}")));
        }

        let body = response.bytes().await.map_err(|e| AttemptError::Transient(e.to_string()))?;
        Ok(body.to_vec())
    }
}

impl StencilFetcher for HttpFetcher {
    async fn fetch(
        &self,
        source: &str,
        destination_folder: &Path,
        destination_name: &str,
        branch: &str,
    ) -> Result<PathBuf, BundleError> {
        let url = Self::resolve_url(source, branch);
        debug!(target: "fetch", "Downloading {url}");

        let content = RetryIf::spawn(
            self.retry_strategy(),
            || self.download(&url),
            AttemptError::is_transient,
        )
        .await
        .map_err(|e| BundleError::FetchFailure {
            path: url.clone(),
            reason: e.into_reason(),
        })?;

        write_destination(destination_folder, destination_name, &content).await
    }
}
