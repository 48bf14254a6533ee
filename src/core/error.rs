//! Error handling for Loft.
//!
//! The error system follows two principles:
//! 1. **Strongly-typed errors** ([`UpgradeError`]) for precise handling in code
//! 2. **User-friendly messages** ([`ErrorContext`]) with actionable suggestions
//!    for CLI users
//!
//! Every failure mode of the upgrade subsystem has its own variant. Components
//! return `Result<T, UpgradeError>`; the CLI layer wraps with [`anyhow`] for
//! context and converts to an [`ErrorContext`] via [`user_friendly_error`]
//! right before display.

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for Loft upgrade operations.
///
/// Each variant represents one specific failure mode and carries the details
/// a user (or test) needs to understand it. Errors from steps prior to binary
/// installation have no on-disk side effects; only [`UpgradeError::InstallFailed`]
/// implies a compensating rollback, which has already been performed by the
/// time the error is surfaced.
#[derive(Error, Debug)]
pub enum UpgradeError {
    /// Transport-level failure reaching the release endpoint or asset host.
    #[error("network error while contacting {url}")]
    Network {
        /// The URL that could not be reached
        url: String,
        /// The underlying transport error
        #[source]
        source: reqwest::Error,
    },

    /// The server responded, but not with HTTP 200.
    #[error("release server returned HTTP {status}")]
    UnexpectedStatus {
        /// The HTTP status code that was received
        status: u16,
    },

    /// The release endpoint returned a body that does not decode into the
    /// expected release shape.
    #[error("release metadata could not be parsed")]
    MalformedResponse {
        /// The underlying JSON decode error
        #[source]
        source: serde_json::Error,
    },

    /// The latest release has no asset published for the running platform.
    #[error("no compatible release found for {os}/{arch}")]
    NoCompatibleAsset {
        /// Operating system name of the running binary
        os: String,
        /// Architecture name of the running binary
        arch: String,
    },

    /// The downloaded asset has an extension the extractor does not handle.
    #[error("unsupported archive format: {name}")]
    UnsupportedFormat {
        /// File name of the offending archive
        name: String,
    },

    /// The archive could not be opened or an entry could not be read.
    #[error("archive is corrupt or unreadable: {reason}")]
    ArchiveCorrupt {
        /// Description of what failed while reading the archive
        reason: String,
    },

    /// The archive extracted cleanly but contained no entry matching the
    /// expected executable name.
    #[error("executable '{name}' not found in archive")]
    BinaryNotFound {
        /// The executable base name that was expected
        name: String,
    },

    /// The install directory is not writable and elevation cannot be
    /// performed automatically.
    #[error("insufficient permissions to upgrade: {reason}")]
    ElevationUnavailable {
        /// Why elevation could not be attempted
        reason: String,
    },

    /// Another upgrade invocation already holds the install lock.
    #[error("another upgrade appears to be in progress (lock file: {lock_path})")]
    AlreadyInProgress {
        /// Path of the contended lock file
        lock_path: String,
    },

    /// Copying the new binary into place failed. The original binary has
    /// been restored from its backup before this error is returned.
    #[error("failed to install new binary (original restored)")]
    InstallFailed {
        /// The I/O error from the failed copy step
        #[source]
        source: std::io::Error,
    },

    /// I/O error outside the install step (temp files, extraction writes).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Rich error context with user-friendly messaging and suggestions.
///
/// Wraps any error with an optional suggestion and details, displayed with
/// colored formatting on stderr. This is the last stop before the process
/// exits with a non-zero status.
pub struct ErrorContext {
    /// The underlying error
    pub error: anyhow::Error,
    /// A suggested action the user can take
    pub suggestion: Option<String>,
    /// Additional details about the failure
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context from any error.
    pub fn new(error: impl Into<anyhow::Error>) -> Self {
        Self { error: error.into(), suggestion: None, details: None }
    }

    /// Attach a suggested remedy shown below the error message.
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Attach extra detail shown below the error message.
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error, details, and suggestion to stderr with colors.
    pub fn display(&self) {
        eprintln!("{} {}", "Error:".red().bold(), self.error);

        for cause in self.error.chain().skip(1) {
            eprintln!("  {} {}", "Caused by:".dimmed(), cause);
        }

        if let Some(details) = &self.details {
            eprintln!("\n{details}");
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("\n{} {}", "Suggestion:".yellow(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;
        if let Some(details) = &self.details {
            write!(f, "\n{details}")?;
        }
        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }
        Ok(())
    }
}

/// Convert any error into a user-friendly [`ErrorContext`] with a suggestion
/// matched to the failure mode.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    let (suggestion, details) = match error.downcast_ref::<UpgradeError>() {
        Some(UpgradeError::Network { .. }) => {
            (Some("Check your internet connection and try again".to_string()), None)
        }
        Some(UpgradeError::UnexpectedStatus { status }) => (
            Some("The release server may be temporarily unavailable; try again later".to_string()),
            Some(format!("The server responded with HTTP {status}")),
        ),
        Some(UpgradeError::MalformedResponse { .. }) => (
            Some("This usually indicates a transient server problem; try again later".to_string()),
            None,
        ),
        Some(UpgradeError::NoCompatibleAsset { os, arch }) => (
            Some("Check the project's releases page for supported platforms".to_string()),
            Some(format!("No published release asset matches {os}/{arch}")),
        ),
        Some(UpgradeError::ElevationUnavailable { .. }) => (
            Some(if cfg!(windows) {
                "Re-run this command from an Administrator terminal".to_string()
            } else {
                "Re-run with elevated privileges: sudo loft upgrade".to_string()
            }),
            None,
        ),
        Some(UpgradeError::AlreadyInProgress { lock_path }) => (
            Some("Wait for the other upgrade to finish, then retry".to_string()),
            Some(format!("Lock file: {lock_path}")),
        ),
        Some(UpgradeError::InstallFailed { .. }) => (
            Some(
                "The previous binary was restored; check disk space and permissions, then retry"
                    .to_string(),
            ),
            None,
        ),
        Some(
            UpgradeError::UnsupportedFormat { .. }
            | UpgradeError::ArchiveCorrupt { .. }
            | UpgradeError::BinaryNotFound { .. },
        ) => (
            Some("The downloaded release may be corrupted; try the upgrade again".to_string()),
            None,
        ),
        _ => (None, None),
    };

    let mut ctx = ErrorContext::new(error);
    if let Some(s) = suggestion {
        ctx = ctx.with_suggestion(s);
    }
    if let Some(d) = details {
        ctx = ctx.with_details(d);
    }
    ctx
}
