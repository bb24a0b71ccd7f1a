//! altsource core - catalog model and refresh workflow
//!
//! This crate holds the source catalog document and its merge rules, the
//! screenshot and record builders, the status document, configuration, and
//! the refresh workflow that ties a build source and asset stores together.

pub mod assets;
pub mod catalog;
pub mod config;
pub mod error;
pub mod persist;
pub mod record;
pub mod screenshots;
pub mod status;
pub mod traits;
pub mod types;
pub mod workflow;

pub use catalog::{Catalog, CatalogMerger, MergeOutcome};
pub use config::{load_config, load_config_from_dir, AppConfig, Config};
pub use error::{AltSourceError, CatalogError, ConfigError, Result, SourceError, StorageError};
pub use record::{build_record, BuildFacts, DisplayFields};
pub use screenshots::{parse_screenshot_name, ScreenshotCataloger, ScreenshotName};
pub use status::{RunStatus, StatusDocument};
pub use traits::{ArchiveStore, Build, BuildSource, CatalogStore, IconStore};
pub use types::{AppPermissions, ApplicationRecord, IdentityKey, Screenshot};
pub use workflow::{AppOutcome, RefreshOptions, RefreshReport, Refresher};
