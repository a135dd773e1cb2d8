//! Error types for the photo dedup tool
//!
//! This module defines the error taxonomy used throughout the application.
//! Only `ScopeNotFound` is fatal, and then only for the affected scope;
//! everything else is logged and the run continues.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the photo dedup tool
#[derive(Error, Debug)]
pub enum DedupError {
    /// The image could not be opened or decoded. Files failing with this
    /// error are routed to the quarantine folder.
    #[error("Unreadable image '{}': {reason}", .path.display())]
    Unreadable { path: PathBuf, reason: String },

    /// A rename or move failed (permission, path length, cross-device,
    /// collision probing exhausted). The file is left where it was.
    #[error("Filesystem error for '{}': {message}", .path.display())]
    Filesystem { path: PathBuf, message: String },

    /// The configured scope root does not exist or is not a directory.
    /// Fatal for that scope; a batch driver logs it and moves on.
    #[error("Scope root not found: {}", .0.display())]
    ScopeNotFound(PathBuf),

    /// General I/O error
    #[error("IO error: {0}")]
    Io(String),
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, DedupError>;

impl From<std::io::Error> for DedupError {
    fn from(err: std::io::Error) -> Self {
        DedupError::Io(err.to_string())
    }
}

impl DedupError {
    /// Short kind tag used in structured log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            DedupError::Unreadable { .. } => "unreadable",
            DedupError::Filesystem { .. } => "filesystem",
            DedupError::ScopeNotFound(_) => "scope-not-found",
            DedupError::Io(_) => "io",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DedupError::Unreadable {
            path: PathBuf::from("/photos/bad.jpg"),
            reason: "invalid JPEG".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("bad.jpg"));
        assert!(msg.contains("invalid JPEG"));
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            DedupError::ScopeNotFound(PathBuf::from("/missing")).kind(),
            "scope-not-found"
        );
        assert_eq!(
            DedupError::Filesystem {
                path: PathBuf::from("/photos/a.jpg"),
                message: "permission denied".to_string(),
            }
            .kind(),
            "filesystem"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: DedupError = io_err.into();
        assert_eq!(err.kind(), "io");
    }
}
