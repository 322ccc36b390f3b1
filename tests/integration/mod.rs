//! Integration test suite for starter
//!
//! End-to-end tests that run the `starter` binary against local template
//! repositories, plus library-level checks of closure behaviour on larger
//! catalogs.
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! - **bundle_command**: bundle generation, overwrite and failure handling
//! - **closure_properties**: resolver behaviour across whole catalogs
//! - **config_command**: config file location, init and show
//! - **resolve_command**: closure listing, trees and JSON output

#[path = "../common/mod.rs"]
mod common;

mod bundle_command;
mod closure_properties;
mod config_command;
mod resolve_command;
