//! Configuration types

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::defaults::*;

/// Main configuration for altsource
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Catalog document configuration
    pub catalog: CatalogConfig,

    /// Repository status document configuration
    pub status: StatusConfig,

    /// Where icons, packages and screenshots live and are published
    pub assets: AssetsConfig,

    /// Build source configuration
    pub source: SourceConfig,

    /// Refresh run configuration
    pub refresh: RefreshConfig,

    /// Tracked applications, in catalog order for new entries
    pub apps: Vec<AppConfig>,
}

impl Config {
    /// Resolve relative paths against `root` (usually the config file's
    /// directory)
    pub fn with_root(mut self, root: &Path) -> Self {
        self.assets.root = root.to_path_buf();
        self.catalog.path = resolve(root, &self.catalog.path);
        self.status.path = resolve(root, &self.status.path);
        self
    }

    /// Find a tracked app by name
    pub fn app(&self, name: &str) -> Option<&AppConfig> {
        self.apps.iter().find(|app| app.name == name)
    }
}

fn resolve(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

/// Catalog document configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Path of the catalog JSON document
    pub path: PathBuf,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_CATALOG_PATH),
        }
    }
}

/// Repository status document configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusConfig {
    /// Whether to write the status document after a refresh
    pub enabled: bool,

    /// Path of the status document
    pub path: PathBuf,

    /// Tint color of the status news item
    pub tint_color: String,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: PathBuf::from(DEFAULT_STATUS_PATH),
            tint_color: DEFAULT_STATUS_TINT.to_string(),
        }
    }
}

/// Asset storage configuration.
///
/// Directories are relative to the repository root; `base_url` is the public
/// URL that root is served from (e.g. a raw.githubusercontent.com prefix).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetsConfig {
    /// Public URL of the repository root
    pub base_url: String,

    /// Icon directory
    pub icons_dir: PathBuf,

    /// Package download directory
    pub downloads_dir: PathBuf,

    /// Screenshot directory, one subdirectory per app name
    pub screenshots_dir: PathBuf,

    /// Local repository root, set by [`Config::with_root`]
    #[serde(skip)]
    pub root: PathBuf,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            icons_dir: PathBuf::from(DEFAULT_ICONS_DIR),
            downloads_dir: PathBuf::from(DEFAULT_DOWNLOADS_DIR),
            screenshots_dir: PathBuf::from(DEFAULT_SCREENSHOTS_DIR),
            root: PathBuf::new(),
        }
    }
}

impl AssetsConfig {
    /// Local screenshot directory of an app
    pub fn screenshots_path(&self, app_name: &str) -> PathBuf {
        self.root.join(&self.screenshots_dir).join(app_name)
    }
}

/// Build source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// GitHub API endpoint
    pub api_url: String,

    /// User agent for API requests
    pub user_agent: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            user_agent: default_user_agent(),
        }
    }
}

/// Refresh run configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RefreshConfig {
    /// Maximum apps fetched and inspected at once
    pub concurrency: usize,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

/// One tracked application
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Display name, half of the identity key
    pub name: String,

    /// Bundle identifier, the other half of the identity key
    pub bundle_identifier: String,

    /// Developer shown in the catalog
    pub developer_name: String,

    /// Source repository as `owner/repo`
    pub repository: String,

    /// Workflow file to take runs from (all workflows when unset)
    pub workflow: Option<String>,

    /// Branch to take runs from (all branches when unset)
    pub branch: Option<String>,

    /// Whether the app is marked beta
    pub beta: bool,

    /// Accent color
    pub tint_color: String,

    /// Catalog category
    pub category: String,

    /// Long description
    pub localized_description: String,
}
