//! Configuration loading

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{ConfigError, Result};

use super::defaults::{config_file_names, GITHUB_DIR};
use super::types::Config;
use super::validation::validate_config;

/// Load configuration from a file.
///
/// Relative paths in the file are resolved against the repository root:
/// the file's directory, or its parent for a file kept in `.github/`.
pub fn load_config(path: &Path) -> Result<Config> {
    let format = if path.extension().is_some_and(|e| e == "toml") {
        "TOML"
    } else {
        "YAML"
    };
    info!(path = %path.display(), format, "loading config");

    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()).into());
    }

    let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;

    let config: Config = if format == "TOML" {
        toml::from_str(&content).map_err(ConfigError::TomlError)?
    } else {
        serde_yaml::from_str(&content).map_err(ConfigError::YamlError)?
    };

    validate_config(&config)?;

    let root = repository_root(path);
    debug!(path = %path.display(), root = %root.display(), "config loaded and validated");
    Ok(config.with_root(&root))
}

/// Directory that relative config paths are resolved against
fn repository_root(config_path: &Path) -> PathBuf {
    let dir = match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => return PathBuf::from("."),
    };

    if dir.file_name().is_some_and(|name| name == GITHUB_DIR) {
        match dir.parent() {
            Some(repo) if !repo.as_os_str().is_empty() => repo.to_path_buf(),
            _ => PathBuf::from("."),
        }
    } else {
        dir.to_path_buf()
    }
}

/// Config files that may exist for the repository checked out at `dir`,
/// in lookup order: plain names first, then the same names under `.github/`.
fn candidates(dir: &Path) -> impl Iterator<Item = PathBuf> + '_ {
    let names = config_file_names();
    let direct: Vec<PathBuf> = names.iter().map(|name| dir.join(name)).collect();
    let github: Vec<PathBuf> = names
        .iter()
        .map(|name| dir.join(GITHUB_DIR).join(name))
        .collect();
    direct.into_iter().chain(github)
}

/// Find the config file for `start_dir`, walking up through its ancestors.
///
/// The nearest directory with any candidate wins, so a nested checkout is
/// never shadowed by a config further up.
pub fn find_config(start_dir: &Path) -> Option<PathBuf> {
    debug!(start_dir = %start_dir.display(), "searching for config file");

    let found = start_dir
        .ancestors()
        .find_map(|dir| candidates(dir).find(|path| path.is_file()));

    match &found {
        Some(path) => info!(path = %path.display(), "found config file"),
        None => debug!("no config file found"),
    }
    found
}

/// Find and load the config for `dir`, returning it with the file it came from
pub fn load_config_from_dir(dir: &Path) -> Result<(Config, PathBuf)> {
    let path = find_config(dir).ok_or_else(|| ConfigError::NotFound(dir.to_path_buf()))?;
    load_config(&path).map(|config| (config, path))
}
