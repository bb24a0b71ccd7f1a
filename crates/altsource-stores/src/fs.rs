//! Filesystem stores
//!
//! The source repository is a plain checkout: the catalog is a JSON file at
//! its root, packages and icons live in subdirectories and are served from
//! `assets.base_url`.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use altsource_core::assets::{archive_file_name, icon_file_name, public_url};
use altsource_core::config::AssetsConfig;
use altsource_core::persist::atomic_write;
use altsource_core::{ArchiveStore, Catalog, CatalogError, CatalogStore, IconStore, Result};

/// Catalog document stored as a JSON file
#[derive(Debug, Clone)]
pub struct FsCatalogStore {
    path: PathBuf,
}

impl FsCatalogStore {
    /// Create a store for the catalog at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CatalogStore for FsCatalogStore {
    fn location(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Catalog> {
        if !self.path.exists() {
            return Err(CatalogError::NotFound(self.path.clone()).into());
        }

        let content = std::fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Err(CatalogError::Empty(self.path.clone()).into());
        }

        let catalog = Catalog::from_json_str(&content)?;
        debug!(path = %self.path.display(), records = catalog.len(), "loaded catalog");
        Ok(catalog)
    }

    fn save(&self, catalog: &Catalog) -> Result<()> {
        let json = catalog.to_json_string()?;
        atomic_write(&self.path, json.as_bytes())?;
        info!(path = %self.path.display(), records = catalog.len(), "saved catalog");
        Ok(())
    }
}

/// Icons and packages stored below the repository root
#[derive(Debug, Clone)]
pub struct FsAssetStore {
    assets: AssetsConfig,
    dry_run: bool,
}

impl FsAssetStore {
    /// Create a store writing below `assets.root`
    pub fn new(assets: AssetsConfig) -> Self {
        Self {
            assets,
            dry_run: false,
        }
    }

    /// Only compute URLs, never touch the filesystem
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    fn store(&self, relative: PathBuf, bytes: &[u8]) -> Result<String> {
        let url = public_url(&self.assets.base_url, &relative)?;

        if self.dry_run {
            info!(path = %relative.display(), bytes = bytes.len(), "dry run, would write");
        } else {
            let path = self.assets.root.join(&relative);
            atomic_write(&path, bytes)?;
            debug!(path = %path.display(), bytes = bytes.len(), "stored asset");
        }

        Ok(url)
    }
}

impl IconStore for FsAssetStore {
    fn save_icon(&self, app_name: &str, bytes: &[u8]) -> Result<String> {
        let relative = self.assets.icons_dir.join(icon_file_name(app_name));
        self.store(relative, bytes)
    }
}

impl ArchiveStore for FsAssetStore {
    fn save_archive(&self, app_name: &str, version: &str, bytes: &[u8]) -> Result<String> {
        let relative = self
            .assets
            .downloads_dir
            .join(archive_file_name(app_name, version));
        self.store(relative, bytes)
    }
}
