//! Error types for altsource

use std::path::PathBuf;
use thiserror::Error;

pub use altsource_package::PackageError;

/// Result type alias using AltSourceError
pub type Result<T> = std::result::Result<T, AltSourceError>;

/// Main error type for altsource operations
#[derive(Debug, Error)]
pub enum AltSourceError {
    /// Configuration-related errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Catalog document errors
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Package inspection errors
    #[error(transparent)]
    Package(#[from] PackageError),

    /// Build source errors
    #[error(transparent)]
    Source(#[from] SourceError),

    /// Persistence errors
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl AltSourceError {
    /// Create a new "other" error with a message
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Self::Other(msg.into())
    }

    /// Whether a refresh run should skip the affected app and carry on.
    ///
    /// Build source failures and malformed packages only affect one app;
    /// everything else aborts the run.
    pub fn is_skippable(&self) -> bool {
        match self {
            Self::Source(_) => true,
            Self::Package(err) => err.is_malformed(),
            _ => false,
        }
    }
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found at {0}")]
    NotFound(PathBuf),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Invalid configuration value
    #[error("Invalid configuration: {field} - {message}")]
    InvalidValue { field: String, message: String },

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// IO error
    #[error("IO error reading config: {0}")]
    Io(#[from] std::io::Error),
}

/// Catalog document errors. All of them are fatal for a run.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Catalog file does not exist
    #[error("Catalog not found at {0}")]
    NotFound(PathBuf),

    /// Catalog file exists but holds no document
    #[error("Catalog at {0} is empty")]
    Empty(PathBuf),

    /// Document is not a valid catalog
    #[error("Invalid catalog document: {0}")]
    Invalid(String),

    /// Two records share an identity key
    #[error("Duplicate catalog entry for {name} ({bundle_identifier})")]
    DuplicateKey {
        name: String,
        bundle_identifier: String,
    },
}

/// Build source errors. These skip the affected app for the run.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Request could not be sent or the body could not be read
    #[error("Request to {url} failed: {reason}")]
    Request { url: String, reason: String },

    /// Remote answered with a non-success status
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// No successful run exists for the project
    #[error("No successful build found for {0}")]
    NoSuccessfulBuild(String),

    /// The run has no downloadable artifact
    #[error("No artifact found for {project} run {run_id}")]
    NoArtifact { project: String, run_id: u64 },

    /// The artifact does not contain an application archive
    #[error("No .ipa file in artifact {0}")]
    NoArchive(String),
}

/// Persistence errors. Fatal; the previous file content stays in place.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Writing or renaming a file failed
    #[error("Failed to write {path}: {reason}")]
    WriteFailed { path: PathBuf, reason: String },

    /// A public URL could not be formed for a stored file
    #[error("Invalid public URL for {0}")]
    InvalidUrl(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skippable_classification() {
        let source: AltSourceError = SourceError::NoSuccessfulBuild("owner/repo".into()).into();
        assert!(source.is_skippable());

        let malformed: AltSourceError = PackageError::malformed("missing Info.plist").into();
        assert!(malformed.is_skippable());

        let catalog: AltSourceError = CatalogError::Empty(PathBuf::from("apps.json")).into();
        assert!(!catalog.is_skippable());

        let storage: AltSourceError = StorageError::WriteFailed {
            path: PathBuf::from("apps.json"),
            reason: "disk full".into(),
        }
        .into();
        assert!(!storage.is_skippable());
    }
}
