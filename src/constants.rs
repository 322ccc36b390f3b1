//! Global constants used throughout the starter codebase.
//!
//! Manifest field values that form part of the bundle compatibility
//! contract live here alongside fetch defaults, so the strings consumers
//! rely on are defined exactly once.

use std::time::Duration;

/// Format version written to every `manifest.json`.
pub const MANIFEST_VERSION: &str = "1";

/// Lifecycle status of a stencil entry that still needs to be deployed.
pub const STENCIL_STATUS_PENDING_DEPLOY: i32 = 2;

/// Provenance tag attached to generated stencil entries and to the bundle.
pub const PROVENANCE_TAG: &str = "starter";

/// Stencil `context_type` that triggers one instantiation per service.
pub const SERVICE_CONTEXT_TYPE: &str = "service";

/// Catalog file name at the root of every template repository.
pub const CATALOG_FILENAME: &str = "templates.json";

/// Manifest file name at the root of the bundle folder.
pub const MANIFEST_FILENAME: &str = "manifest.json";

/// Directory name of the generated bundle inside the output directory.
pub const BUNDLE_DIR_NAME: &str = "starter.bundle";

/// Folder inside the bundle that receives fetched stencil files.
pub const STENCILS_FOLDER: &str = "stencils";

/// Folder inside the bundle that receives configuration files.
pub const CONFIGURATIONS_FOLDER: &str = "configurations";

/// Every folder created under a fresh bundle directory.
pub const BUNDLE_SUBFOLDERS: [&str; 6] = [
    STENCILS_FOLDER,
    "policies",
    "transformations",
    "stencil_groups",
    "helm_releases",
    CONFIGURATIONS_FOLDER,
];

/// `metadata.app` value of generated manifests.
pub const BUNDLE_APP_NAME: &str = "starter";

/// `name` value of generated manifests.
pub const BUNDLE_NAME: &str = "starter-formation";

/// Annotation recorded in `metadata.annotations`.
pub const BUNDLE_ANNOTATION: &str = "Generated by starter";

/// Chart repository used for database Helm releases.
pub const HELM_CHART_REPOSITORY: &str = "https://kubernetes-charts.storage.googleapis.com/";

/// Default branch when a template source does not name one.
pub const DEFAULT_BRANCH: &str = "master";

/// Placeholder replaced by the branch name inside repository URLs.
pub const BRANCH_PLACEHOLDER: &str = "{branch}";

/// Default number of attempts for a single remote fetch.
pub const DEFAULT_FETCH_ATTEMPTS: usize = 3;

/// Starting delay for fetch retry backoff (200ms).
pub const DEFAULT_FETCH_INITIAL_DELAY_MS: u64 = 200;

/// Maximum delay between fetch retries (2s).
pub const DEFAULT_FETCH_MAX_DELAY_MS: u64 = 2_000;

/// Timeout for a single HTTP request (30 seconds).
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum Levenshtein distance, as a percentage of the target length,
/// for "did you mean" suggestions on unresolved references.
pub const SIMILARITY_THRESHOLD_PERCENT: usize = 50;
