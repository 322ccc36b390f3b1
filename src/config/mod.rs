//! Configuration for starter.
//!
//! Only one layer exists: the global [`StarterConfig`] mapping project packs
//! to template sources. Every value can be overridden per run on the command
//! line (`--repository`, `--branch`, `--github-url`).

mod global;

pub use global::{CONFIG_PATH_ENV, FetchSettings, StarterConfig, TemplateSource};
