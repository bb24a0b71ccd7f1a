//! Build sources and storage backends for altsource
//!
//! - [`GitHubActionsSource`] fetches the newest successful build artifact of
//!   a GitHub repository through the Actions REST API.
//! - [`FsCatalogStore`] and [`FsAssetStore`] persist the catalog, packages
//!   and icons inside a local checkout of the source repository.
//!
//! ## Usage
//!
//! ```ignore
//! use altsource_stores::{FsAssetStore, FsCatalogStore, GitHubActionsSource};
//!
//! let source = GitHubActionsSource::new(&config.source, token)?;
//! let catalog = FsCatalogStore::new(&config.catalog.path);
//! let assets = FsAssetStore::new(config.assets.clone());
//! ```

pub mod fs;
pub mod github;

pub use fs::{FsAssetStore, FsCatalogStore};
pub use github::{extract_ipa, GitHubActionsSource};
