//! starter-bundle - deployment bundle generation from stencil templates
//!
//! A project pack (Rails, Node, ...) has a template repository whose
//! `templates.json` catalog declares stencils, policies, transformations and
//! Helm charts, each with a list of dependencies on the others. Generating
//! a bundle means finding every unit the project needs, fetching the
//! required stencils and writing a manifest that records them.
//!
//! # Architecture Overview
//!
//! ```text
//! templates.json ──► catalog ──► resolver ──► bundle::assembler ──► manifest.json
//!                                  │               │
//!                          required closure   fetch (HTTP / local)
//! ```
//!
//! - The catalog is read-only input, addressed by qualified names such as
//!   `stencils/dockerfile` or `helm_charts/redis`.
//! - The resolver walks dependencies from every stencil with a positive
//!   `min_usage`. Cycles are reported, not fatal; unknown references are.
//! - The assembler instantiates per-service stencils once per service and
//!   records every other required unit once.
//! - The bundle is written to a staging directory and moved into place only
//!   when complete.
//!
//! # Core Modules
//!
//! - [`catalog`] - `templates.json` model and unit lookup
//! - [`resolver`] - required-closure computation, filtering and graph views
//! - [`bundle`] - manifest model, project context, assembly and generation
//! - [`fetch`] - HTTP and local retrieval of repository files
//! - [`config`] - configuration file with per-pack template sources
//! - [`core`] - error types and qualified names
//! - [`cli`] - the `starter` command line
//! - [`utils`] - filesystem and path helpers
//!
//! # Example
//!
//! ```rust,no_run
//! use starter_bundle::bundle::{BundleRequest, ProjectContext, generate_bundle};
//! use starter_bundle::config::{FetchSettings, TemplateSource};
//! use starter_bundle::fetch::RepositoryFetcher;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let source = TemplateSource::new("/srv/templates/rails");
//! let fetcher =
//!     RepositoryFetcher::for_repository(&source.resolved_repository()?, &FetchSettings::default())?;
//!
//! let request = BundleRequest {
//!     pack: "rails".to_string(),
//!     source: Some(source),
//!     context: ProjectContext::from_service_names(["web", "worker"]),
//!     output_dir: "./out".into(),
//!     overwrite: true,
//!     deny_cycles: false,
//! };
//! let outcome = generate_bundle(&request, &fetcher).await?;
//! println!("{outcome:?}");
//! # Ok(())
//! # }
//! ```

pub mod bundle;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod fetch;
pub mod resolver;
pub mod utils;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
