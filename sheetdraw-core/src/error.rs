//! Error types for sheetdraw-core

use std::io;
use thiserror::Error;

/// Result type alias for rendering operations.
pub type Result<T> = std::result::Result<T, RenderError>;

/// Fatal errors. Everything else is recovered locally and reported as a
/// [`Diagnostic`](crate::diagnostic::Diagnostic).
#[derive(Error, Debug)]
pub enum RenderError {
    /// The mandatory content entry is missing or is not well-formed XML.
    #[error("Document unreadable: {entry}: {reason}")]
    DocumentUnreadable { entry: String, reason: String },

    /// The package could not be opened as a zip archive.
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// I/O error when opening the package.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The configuration could not be loaded or is invalid.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl RenderError {
    pub fn unreadable(entry: &str, reason: impl std::fmt::Display) -> Self {
        RenderError::DocumentUnreadable {
            entry: entry.to_string(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RenderError::unreadable("content.xml", "entry not found");
        assert_eq!(
            err.to_string(),
            "Document unreadable: content.xml: entry not found"
        );

        let err = RenderError::Config("resolution_dpi must be positive".to_string());
        assert_eq!(
            err.to_string(),
            "Configuration error: resolution_dpi must be positive"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: RenderError = io_err.into();
        assert!(matches!(err, RenderError::Io(_)));
    }
}
