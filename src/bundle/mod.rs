//! Bundle assembly and persistence.
//!
//! A bundle is a folder holding `manifest.json` plus the files it
//! references:
//!
//! ```text
//! starter.bundle/
//! ├── manifest.json
//! ├── stencils/            fetched stencil instances
//! ├── policies/
//! ├── transformations/
//! ├── stencil_groups/
//! ├── helm_releases/
//! └── configurations/      <pack>-config
//! ```
//!
//! - [`manifest`] - the manifest document and its serialization
//! - [`context`] - services and databases of the project
//! - [`assembler`] - resolved units to manifest entries
//! - [`helm`] - database Helm releases
//! - [`generator`] - the end-to-end pipeline

pub mod assembler;
pub mod context;
pub mod generator;
pub mod helm;
pub mod manifest;

pub use assembler::{AssemblyTarget, assemble, stencil_entries};
pub use context::{Database, ProjectContext, Service};
pub use generator::{BundleOutcome, BundleRequest, generate_bundle};
pub use manifest::{
    BundleBaseTemplate, BundleHelmRelease, BundlePolicy, BundleStencil, BundleStencilGroup,
    BundleTransformation, ManifestBundle, Metadata,
};
