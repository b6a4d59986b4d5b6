//! Error types for backlog operations.

use std::path::PathBuf;

use thiserror::Error;

/// The main error type for backlog operations.
///
/// Variants fall into two families. Structural errors are always attributed
/// to a single file and callers that work on a whole directory log and skip
/// them. Everything else is an I/O level failure that aborts the enclosing
/// operation.
#[derive(Error, Debug)]
pub enum Error {
    /// The front matter markers are missing or out of order.
    #[error("invalid document format: {}", path.display())]
    InvalidDocumentFormat { path: PathBuf },

    /// A filename does not follow `{id}_{O|C}_{title}.md`.
    #[error("invalid filename format: {name}")]
    InvalidFilenameFormat { name: String },

    /// A header field holds a value outside its domain.
    #[error("invalid field `{field}`: {message}")]
    InvalidField { field: &'static str, message: String },

    /// The header block could not be decoded.
    #[error("invalid header: {0}")]
    Header(#[from] serde_yaml::Error),

    /// I/O error on a specific path.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The priority list could not be read or written.
    #[error("priority list error: {0}")]
    Csv(#[from] csv::Error),
}

impl Error {
    /// Create an I/O error bound to a path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create an invalid field error.
    pub fn invalid_field(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            message: message.into(),
        }
    }

    /// Attach a path to a document format error.
    pub fn invalid_document(path: impl Into<PathBuf>) -> Self {
        Self::InvalidDocumentFormat { path: path.into() }
    }

    /// Attribute a document format error to the file it was read from.
    pub fn in_file(self, path: impl Into<PathBuf>) -> Self {
        match self {
            Self::InvalidDocumentFormat { .. } => Self::InvalidDocumentFormat { path: path.into() },
            other => other,
        }
    }

    /// Is this a per-file problem that batch operations should skip?
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::InvalidDocumentFormat { .. }
                | Self::InvalidFilenameFormat { .. }
                | Self::InvalidField { .. }
                | Self::Header(_)
        )
    }
}

/// Result type alias using the backlog error.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structural_classification() {
        assert!(Error::invalid_document("a.md").is_structural());
        assert!(Error::InvalidFilenameFormat { name: "x".into() }.is_structural());
        assert!(Error::invalid_field("id", "must be positive").is_structural());

        let io = Error::io("dir", std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert!(!io.is_structural());
    }

    #[test]
    fn test_in_file_attributes_document_errors_only() {
        let err = Error::invalid_document("").in_file("/tmp/epic/2_O_x.md");
        assert!(err.to_string().ends_with("2_O_x.md"));

        let err = Error::invalid_field("id", "must be positive").in_file("/tmp/a.md");
        assert!(matches!(err, Error::InvalidField { field: "id", .. }));
    }

    #[test]
    fn test_messages_name_the_file() {
        let err = Error::invalid_document("/tmp/issues/1_O_x.md");
        assert!(err.to_string().contains("1_O_x.md"));

        let err = Error::invalid_field("title", "must not be empty");
        assert_eq!(err.to_string(), "invalid field `title`: must not be empty");
    }
}
