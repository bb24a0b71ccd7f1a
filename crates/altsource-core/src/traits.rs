//! Collaborator traits
//!
//! The refresh workflow only talks to the outside world through these:
//! a build source that hands out package bytes, stores that publish icons
//! and packages, and the catalog store that owns the persisted document.

use std::path::Path;

use chrono::{DateTime, Utc};

use crate::catalog::Catalog;
use crate::config::AppConfig;
use crate::error::Result;

/// The latest successful build of a tracked project
#[derive(Debug, Clone)]
pub struct Build {
    /// Full source revision hash
    pub commit_id: String,
    /// Head commit message
    pub commit_message: String,
    /// When the build run was created
    pub created_at: DateTime<Utc>,
    /// Raw `.ipa` bytes
    pub archive_bytes: Vec<u8>,
}

/// Source of built application packages
#[async_trait::async_trait]
pub trait BuildSource: Send + Sync {
    /// Get the source name
    fn name(&self) -> &str;

    /// Fetch the newest successful build of an app's project.
    ///
    /// Failures are [`crate::error::SourceError`]s; the app is skipped for
    /// the run.
    async fn fetch_latest_successful_build(&self, app: &AppConfig) -> Result<Build>;
}

/// Publishes app icons
pub trait IconStore: Send + Sync {
    /// Store an app's icon and return its public URL
    fn save_icon(&self, app_name: &str, bytes: &[u8]) -> Result<String>;
}

/// Publishes application packages
pub trait ArchiveStore: Send + Sync {
    /// Store a package and return its public download URL
    fn save_archive(&self, app_name: &str, version: &str, bytes: &[u8]) -> Result<String>;
}

/// Owns the persisted catalog document
pub trait CatalogStore: Send + Sync {
    /// Where the catalog lives, for diagnostics
    fn location(&self) -> &Path;

    /// Load the catalog. An absent or empty document is an error.
    fn load(&self) -> Result<Catalog>;

    /// Replace the persisted catalog atomically
    fn save(&self, catalog: &Catalog) -> Result<()>;
}
