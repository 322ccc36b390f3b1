//! File system helpers for bundle output.
//!
//! Bundle files are written with [`atomic_write`] so an interrupted run never
//! leaves a half-written `manifest.json` behind.

use anyhow::Result;
use std::fs;
use std::io::Write;
use std::path::Path;

use crate::core::file_error::{FileOperation, FileResultExt};

/// Create `path` and all of its parents if missing.
///
/// Fails if `path` exists but is not a directory.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path).with_file_context(
            FileOperation::CreateDir,
            path,
            "creating bundle folder",
            "utils::fs::ensure_dir",
        )?;
    } else if !path.is_dir() {
        return Err(anyhow::anyhow!("Path exists but is not a directory: {}", path.display()));
    }
    Ok(())
}

/// Create the parent directory of a file path if missing.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    Ok(())
}

/// Write a string to a file atomically.
///
/// See [`atomic_write`].
pub fn safe_write(path: &Path, content: &str) -> Result<()> {
    atomic_write(path, content.as_bytes())
}

/// Write bytes to `path` through a sibling temp file and a rename.
///
/// Readers see either the old content or the new content, never a partial
/// write. Parent directories are created as needed.
pub fn atomic_write(path: &Path, content: &[u8]) -> Result<()> {
    ensure_parent_dir(path)?;

    let temp_path = path.with_extension("tmp");
    {
        let mut file = fs::File::create(&temp_path).with_file_context(
            FileOperation::Write,
            &temp_path,
            "creating temp file",
            "utils::fs::atomic_write",
        )?;

        file.write_all(content).and_then(|()| file.sync_all()).with_file_context(
            FileOperation::Write,
            &temp_path,
            "writing temp file",
            "utils::fs::atomic_write",
        )?;
    }

    fs::rename(&temp_path, path).with_file_context(
        FileOperation::Write,
        path,
        "replacing file with temp file",
        "utils::fs::atomic_write",
    )?;

    Ok(())
}

/// Remove a directory tree, succeeding if it is already gone.
pub fn remove_dir_all(path: &Path) -> Result<()> {
    match fs::remove_dir_all(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e)
            .with_file_context(
                FileOperation::Remove,
                path,
                "removing directory tree",
                "utils::fs::remove_dir_all",
            )
            .map_err(Into::into),
    }
}
