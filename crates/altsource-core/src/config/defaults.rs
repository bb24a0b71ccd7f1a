//! Default configuration values

/// Default configuration file name (TOML)
pub const DEFAULT_CONFIG_TOML: &str = "altsource.toml";

/// Default configuration file name (YAML)
pub const DEFAULT_CONFIG_YAML: &str = "altsource.yaml";

/// Repository directory that may hold the config file
pub const GITHUB_DIR: &str = ".github";

/// Default catalog document
pub const DEFAULT_CATALOG_PATH: &str = "apps.json";

/// Default repository status document
pub const DEFAULT_STATUS_PATH: &str = "repo_status.json";

/// Tint color of the status news item
pub const DEFAULT_STATUS_TINT: &str = "#F54F32";

/// Default icon directory
pub const DEFAULT_ICONS_DIR: &str = "icons";

/// Default package download directory
pub const DEFAULT_DOWNLOADS_DIR: &str = "downloads";

/// Default screenshot directory
pub const DEFAULT_SCREENSHOTS_DIR: &str = "screenshots";

/// Default GitHub API endpoint
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Default number of apps processed at once
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Get list of config file names to search for
pub fn config_file_names() -> Vec<&'static str> {
    vec![
        DEFAULT_CONFIG_TOML,
        DEFAULT_CONFIG_YAML,
        ".altsource.toml",
        ".altsource.yaml",
    ]
}

/// User agent sent to the build API
pub fn default_user_agent() -> String {
    format!("altsource/{}", env!("CARGO_PKG_VERSION"))
}
