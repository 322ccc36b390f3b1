//! Core types for starter
//!
//! This module provides the foundation the rest of the crate builds on:
//!
//! - [`BundleError`] - enumerated failure modes of bundle generation
//! - [`ErrorContext`] / [`user_friendly_error`] - CLI-facing error presentation
//! - [`file_error`] - I/O errors annotated with operation, path and caller
//! - [`UnitKind`] / [`QualifiedName`] - the `<type>/<name>` addressing scheme
//!   every catalog dependency uses

pub mod error;
pub mod file_error;
mod unit;

pub use error::{BundleError, ErrorContext, user_friendly_error};
pub use file_error::{FileOperation, FileOperationError, FileResultExt};
pub use unit::{QualifiedName, UnitKind};
