//! Package inspection error types

use thiserror::Error;

/// Package inspection errors
#[derive(Debug, Error)]
pub enum PackageError {
    /// The archive is structurally invalid: not a zip, no single payload
    /// root, missing `Info.plist`, or a property list of the wrong shape
    #[error("Malformed package: {0}")]
    Malformed(String),

    /// IO error while reading the package from disk
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PackageError {
    /// Create a malformed-package error with a message
    pub fn malformed<S: Into<String>>(msg: S) -> Self {
        Self::Malformed(msg.into())
    }

    /// Whether this error describes a structural defect in the archive
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Malformed(_))
    }
}

impl From<zip::result::ZipError> for PackageError {
    fn from(err: zip::result::ZipError) -> Self {
        PackageError::Malformed(format!("invalid archive: {}", err))
    }
}

impl From<plist::Error> for PackageError {
    fn from(err: plist::Error) -> Self {
        PackageError::Malformed(format!("invalid property list: {}", err))
    }
}

/// Result type for package inspection
pub type Result<T> = std::result::Result<T, PackageError>;
