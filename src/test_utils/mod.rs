//! Test utilities for starter-bundle
//!
//! Available to unit tests and, through the `test-utils` feature, to
//! integration tests:
//! - [`CatalogFixture`] builds catalogs and local template repositories
//! - [`RecordingFetcher`] stands in for the network and records requests
//! - [`init_test_logging`] wires `tracing` output into the test harness
//!
//! # Example
//!
//! ```rust,no_run
//! use starter_bundle::resolver::resolve_catalog;
//! use starter_bundle::test_utils::{CatalogFixture, init_test_logging};
//!
//! init_test_logging(None);
//! let catalog = CatalogFixture::new().stencil("web", 1, &["stencils/web"]).build();
//! let closure = resolve_catalog(&catalog).unwrap();
//! assert_eq!(closure.cycles.len(), 1);
//! ```

pub mod fetcher;
pub mod fixtures;

pub use fetcher::{FetchRequest, RecordingFetcher};
pub use fixtures::CatalogFixture;

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests, once per process.
///
/// Uses `level` when given, otherwise `RUST_LOG`. With neither, logging
/// stays off.
///
/// ```bash
/// RUST_LOG=resolver=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_ansi(true)
            .try_init();
    });
}
