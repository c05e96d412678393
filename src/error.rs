//! Error types for dirmap
//!
//! This module defines all error types used throughout the crate,
//! separating scan-level failures (the whole request fails) from
//! entry-level failures (recorded in the tree, scan continues).

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for dirmap operations
#[derive(Error, Debug)]
pub enum DirmapError {
    /// Root path does not exist
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// Root path exists but is not a directory
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// Root directory cannot be read at all
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// I/O error during traversal or path resolution
    #[error("I/O error at '{path}': {source}")]
    Io {
        /// Path the operation failed on
        path: PathBuf,
        /// Underlying OS error
        #[source]
        source: std::io::Error,
    },

    /// An exclusion pattern could not be compiled
    #[error("Invalid exclusion pattern '{pattern}': {message}")]
    InvalidPattern {
        /// The offending pattern
        pattern: String,
        /// Compiler diagnostic
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A caller-imposed deadline elapsed before the scan finished
    #[error("Scan timed out after {0} seconds")]
    ScanTimeout(u64),

    /// Scan was abandoned by the caller
    #[error("Scan cancelled")]
    Cancelled,

    /// The result cache could not be consulted or updated
    #[error("Result cache unavailable")]
    CacheUnavailable,

    /// Worker pool failure (queue closed, spawn failed)
    #[error("Worker pool error: {0}")]
    WorkerPool(String),
}

impl DirmapError {
    /// Create an I/O error with path context
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError(message.into())
    }

    /// Create an invalid-pattern error
    pub fn pattern(pattern: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            message: message.into(),
        }
    }

    /// Classify a root-level read failure for `path`
    ///
    /// Maps the underlying `io::ErrorKind` onto the scan-level taxonomy so
    /// callers get `PathNotFound`/`PermissionDenied` instead of a bare I/O
    /// error when the root itself is unreadable.
    pub fn from_root_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::NotFound => Self::PathNotFound(path),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path),
            _ => Self::Io { path, source },
        }
    }

    /// Check if this error is a permission issue
    pub fn is_permission_error(&self) -> bool {
        match self {
            Self::PermissionDenied(_) => true,
            Self::Io { source, .. } => source.kind() == std::io::ErrorKind::PermissionDenied,
            _ => false,
        }
    }

    /// Check if this error leaves the scan usable without the cache
    ///
    /// `CacheUnavailable` must never fail a scan; the acquisition service
    /// falls back to uncached operation when it sees it.
    pub fn is_cache_error(&self) -> bool {
        matches!(self, Self::CacheUnavailable)
    }

    /// Get the path associated with this error, if any
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::PathNotFound(path)
            | Self::NotADirectory(path)
            | Self::PermissionDenied(path)
            | Self::Io { path, .. } => Some(path),
            _ => None,
        }
    }
}

/// Result type alias for dirmap operations
pub type Result<T> = std::result::Result<T, DirmapError>;

/// Extension trait for adding path context to std::io::Result
pub trait IoResultExt<T> {
    /// Add path context to an I/O error
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|e| DirmapError::io(path, e))
    }
}
