//! Path and location helpers.
//!
//! Template repositories are addressed by a base location that is either an
//! HTTP(S) URL, a `file://` URL or a plain filesystem path. Files inside a
//! repository are addressed by appending a relative path to that base, the
//! same way for every form.

use anyhow::{Context, Result};
use std::path::{Component, Path, PathBuf};

/// Expand `~` and environment variables in a user-supplied path.
///
/// ```rust
/// use starter_bundle::utils::path::resolve_path;
///
/// let path = resolve_path("relative/dir").unwrap();
/// assert_eq!(path, std::path::PathBuf::from("relative/dir"));
/// ```
pub fn resolve_path(path: &str) -> Result<PathBuf> {
    let expanded = shellexpand::full(path)
        .with_context(|| format!("Failed to expand path: {path}"))?;
    Ok(PathBuf::from(expanded.as_ref()))
}

/// Whether `location` is fetched over HTTP.
#[must_use]
pub fn is_remote(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

/// Strip a `file://` prefix, leaving other locations unchanged.
#[must_use]
pub fn file_url_to_path(location: &str) -> PathBuf {
    PathBuf::from(location.strip_prefix("file://").unwrap_or(location))
}

/// Ensure a repository base location ends with exactly one `/`.
#[must_use]
pub fn with_trailing_slash(location: &str) -> String {
    format!("{}/", location.trim_end_matches('/'))
}

/// Join a repository base location and a relative file path.
///
/// ```rust
/// use starter_bundle::utils::path::join_location;
///
/// assert_eq!(
///     join_location("https://example.com/templates/", "stencils/web.yml"),
///     "https://example.com/templates/stencils/web.yml"
/// );
/// assert_eq!(join_location("/srv/templates", "templates.json"), "/srv/templates/templates.json");
/// ```
#[must_use]
pub fn join_location(base: &str, relative: &str) -> String {
    format!("{}{}", with_trailing_slash(base), relative.trim_start_matches('/'))
}

/// Whether `name` is a plain file name that stays inside the folder it is
/// joined onto.
///
/// Rejects empty names, `.` and `..`, absolute paths and anything with a
/// separator.
#[must_use]
pub fn is_plain_file_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(first)), None) if first == name
    )
}
