//! Utility modules for starter
//!
//! - [`fs`] - directory creation and atomic file writes
//! - [`path`] - path expansion and repository location handling

pub mod fs;
pub mod path;

pub use fs::{atomic_write, ensure_dir, safe_write};
pub use path::resolve_path;
