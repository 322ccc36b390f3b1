//! Error handling for starter
//!
//! The error system follows two principles:
//! 1. **Strongly-typed errors** ([`BundleError`]) for precise handling in code
//! 2. **User-friendly messages** ([`ErrorContext`]) with actionable suggestions for CLI users
//!
//! # Error Categories
//!
//! - **Resolution**: [`BundleError::UnresolvedDependency`], [`BundleError::CycleDetected`]
//! - **Sources**: [`BundleError::CatalogUnavailable`], [`BundleError::FetchFailure`],
//!   [`BundleError::CatalogParseError`]
//! - **Output**: [`BundleError::PersistenceFailure`]
//! - **Input**: [`BundleError::ContextParseError`], [`BundleError::ConfigError`]
//!
//! Cycle detection is the only condition the resolver recovers from on its
//! own. [`BundleError::CycleDetected`] exists so that callers who opt into
//! strict resolution can surface a cycle the same way as every other error.
//!
//! # Examples
//!
//! ```rust,no_run
//! use starter_bundle::core::{BundleError, user_friendly_error};
//!
//! let error = BundleError::FetchFailure {
//!     path: "https://example.com/stencils/Dockerfile".to_string(),
//!     reason: "HTTP 404 Not Found".to_string(),
//! };
//!
//! let context = user_friendly_error(anyhow::Error::from(error));
//! context.display(); // Shows colored error with suggestions
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

use super::file_error::FileOperationError;

/// The main error type for bundle generation.
#[derive(Error, Debug)]
pub enum BundleError {
    /// A dependency reference is malformed or names a unit absent from the catalog.
    ///
    /// Fatal to the whole resolution, not just the root that reached it.
    #[error("Unresolved dependency '{name}': {reason}")]
    UnresolvedDependency {
        /// The reference exactly as written in the catalog
        name: String,
        /// Why the reference could not be resolved
        reason: String,
    },

    /// A back-edge in the dependency graph.
    ///
    /// The resolver logs and records these instead of returning them; this
    /// variant is produced only when a caller asks for strict resolution.
    #[error(
        "Circular dependency for '{name}' detected while processing dependency list of '{root}'"
    )]
    CycleDetected {
        /// The root whose traversal found the cycle
        root: String,
        /// The in-progress unit that was reached again
        name: String,
    },

    /// No template repository is configured for the project pack.
    #[error("No stencil template is defined for '{pack}'")]
    CatalogUnavailable {
        /// The pack (language/framework) that has no template source
        pack: String,
    },

    /// Downloading or copying a required file failed.
    #[error("Failed to fetch '{path}': {reason}")]
    FetchFailure {
        /// The source location that could not be fetched
        path: String,
        /// Reason for the failure
        reason: String,
    },

    /// Writing the manifest or a bundle file failed.
    #[error("Failed to write '{path}': {reason}")]
    PersistenceFailure {
        /// The destination that could not be written
        path: String,
        /// Reason for the failure
        reason: String,
    },

    /// The template catalog could not be parsed.
    #[error("Invalid template catalog in {file}")]
    CatalogParseError {
        /// Catalog location
        file: String,
        /// Parser message
        reason: String,
    },

    /// The project context file could not be parsed.
    #[error("Invalid project context in {file}")]
    ContextParseError {
        /// Context file location
        file: String,
        /// Parser message
        reason: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the configuration error
        message: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Other error
    #[error("{message}")]
    Other {
        /// Generic error message
        message: String,
    },
}

impl Clone for BundleError {
    fn clone(&self) -> Self {
        match self {
            Self::UnresolvedDependency {
                name,
                reason,
            } => Self::UnresolvedDependency {
                name: name.clone(),
                reason: reason.clone(),
            },
            Self::CycleDetected {
                root,
                name,
            } => Self::CycleDetected {
                root: root.clone(),
                name: name.clone(),
            },
            Self::CatalogUnavailable {
                pack,
            } => Self::CatalogUnavailable {
                pack: pack.clone(),
            },
            Self::FetchFailure {
                path,
                reason,
            } => Self::FetchFailure {
                path: path.clone(),
                reason: reason.clone(),
            },
            Self::PersistenceFailure {
                path,
                reason,
            } => Self::PersistenceFailure {
                path: path.clone(),
                reason: reason.clone(),
            },
            Self::CatalogParseError {
                file,
                reason,
            } => Self::CatalogParseError {
                file: file.clone(),
                reason: reason.clone(),
            },
            Self::ContextParseError {
                file,
                reason,
            } => Self::ContextParseError {
                file: file.clone(),
                reason: reason.clone(),
            },
            Self::ConfigError {
                message,
            } => Self::ConfigError {
                message: message.clone(),
            },
            // For errors that don't implement Clone, convert to Other
            Self::IoError(e) => Self::Other {
                message: format!("IO error: {e}"),
            },
            Self::JsonError(e) => Self::Other {
                message: format!("JSON error: {e}"),
            },
            Self::Other {
                message,
            } => Self::Other {
                message: message.clone(),
            },
        }
    }
}

/// Error context wrapper that provides user-friendly error information.
///
/// When displayed, errors show:
/// 1. **Error**: the main error message in red
/// 2. **Details**: additional context in yellow (optional)
/// 3. **Suggestion**: actionable steps in green (optional)
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: BundleError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with no suggestion or details.
    #[must_use]
    pub const fn new(error: BundleError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Display the error context to stderr with terminal colors.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error to a user-friendly [`ErrorContext`] with actionable suggestions.
///
/// Recognizes [`BundleError`], [`FileOperationError`], [`std::io::Error`] and
/// [`serde_json::Error`]; anything else is reported with its full cause chain.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(bundle_error) = error.downcast_ref::<BundleError>() {
        let context = create_error_context(bundle_error.clone());
        return match chain_message(&error) {
            Some(chain) if context.details.is_none() => context.with_details(chain),
            _ => context,
        };
    }

    if let Some(file_error) = error.downcast_ref::<FileOperationError>() {
        return ErrorContext::new(BundleError::Other {
            message: file_error.to_string(),
        })
        .with_details(file_error.user_message());
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        match io_error.kind() {
            std::io::ErrorKind::PermissionDenied => {
                return ErrorContext::new(BundleError::PersistenceFailure {
                    path: "unknown".to_string(),
                    reason: io_error.to_string(),
                })
                .with_suggestion("Check that the output directory is writable by the current user")
                .with_details("This error occurs when starter cannot read or write bundle files");
            }
            std::io::ErrorKind::NotFound => {
                return ErrorContext::new(BundleError::Other {
                    message: io_error.to_string(),
                })
                .with_suggestion("Check that the file or directory exists and the path is correct");
            }
            _ => {}
        }
    }

    if let Some(json_error) = error.downcast_ref::<serde_json::Error>() {
        return ErrorContext::new(BundleError::CatalogParseError {
            file: "templates.json".to_string(),
            reason: json_error.to_string(),
        })
        .with_suggestion("Check the JSON syntax of the template catalog")
        .with_details(json_error.to_string());
    }

    let mut message = error.to_string();
    if let Some(chain) = chain_message(&error) {
        message.push_str("\n\n");
        message.push_str(&chain);
    }

    ErrorContext::new(BundleError::Other {
        message,
    })
}

fn chain_message(error: &anyhow::Error) -> Option<String> {
    let chain: Vec<String> = error.chain().skip(1).map(std::string::ToString::to_string).collect();
    if chain.is_empty() {
        return None;
    }

    let mut message = String::from("Caused by:");
    for (i, cause) in chain.iter().enumerate() {
        message.push_str(&format!("\n  {}: {}", i + 1, cause));
    }
    Some(message)
}

/// Map each [`BundleError`] variant to tailored suggestions and details.
fn create_error_context(error: BundleError) -> ErrorContext {
    let (suggestion, details): (Option<String>, Option<String>) = match &error {
        BundleError::UnresolvedDependency { name, .. } => (
            Some(format!(
                "Fix the reference '{name}' in templates.json so it names an existing unit, e.g. 'stencils/<name>'"
            )),
            Some("Every dependency must be 'TEMPLATE_TYPE/TEMPLATE_NAME' and resolve to exactly one unit of that type".to_string()),
        ),

        BundleError::CycleDetected { .. } => (
            Some("Remove one edge of the cycle from the catalog, or run without --deny-cycles to continue with a warning".to_string()),
            Some("Units must not depend on themselves directly or indirectly when strict resolution is requested".to_string()),
        ),

        BundleError::CatalogUnavailable { pack } => (
            Some(format!(
                "Add a [packs.{pack}] entry with a repository to your starter config, or pass --repository"
            )),
            None,
        ),

        BundleError::FetchFailure { path, .. } => {
            let suggestion = if path.starts_with("http://") || path.starts_with("https://") {
                "Check your internet connection, the repository URL and the branch name"
            } else {
                "Check that the template repository path exists and contains the file"
            };
            (
                Some(suggestion.to_string()),
                Some("A required template file could not be retrieved; no partial bundle was written".to_string()),
            )
        }

        BundleError::PersistenceFailure { .. } => (
            Some("Check free disk space and permissions on the output directory, or pass --force to replace an existing bundle".to_string()),
            None,
        ),

        BundleError::CatalogParseError { reason, .. } => (
            Some("Validate templates.json with a JSON linter; field names must match the catalog format".to_string()),
            Some(reason.clone()),
        ),

        BundleError::ContextParseError { reason, .. } => (
            Some("The project context is YAML with 'services' (name, env_vars) and 'databases' lists".to_string()),
            Some(reason.clone()),
        ),

        BundleError::ConfigError { .. } => (
            Some("Run 'starter config show' to inspect the active configuration, or 'starter config init' to create one".to_string()),
            None,
        ),

        _ => (None, None),
    };

    let mut context = ErrorContext::new(error);
    if let Some(suggestion) = suggestion {
        context = context.with_suggestion(suggestion);
    }
    if let Some(details) = details {
        context = context.with_details(details);
    }
    context
}
