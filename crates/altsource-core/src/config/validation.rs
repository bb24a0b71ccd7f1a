//! Configuration validation

use std::collections::HashSet;

use tracing::debug;

use crate::error::{ConfigError, Result};

use super::types::Config;

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    debug!("validating configuration");
    validate_catalog(config)?;
    validate_assets(config)?;
    validate_refresh(config)?;
    validate_apps(config)?;
    debug!("configuration validation passed");
    Ok(())
}

fn invalid(field: impl Into<String>, message: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.into(),
        message: message.into(),
    }
}

fn validate_catalog(config: &Config) -> Result<()> {
    if config.catalog.path.as_os_str().is_empty() {
        return Err(invalid("catalog.path", "path cannot be empty").into());
    }
    if config.status.enabled && config.status.path.as_os_str().is_empty() {
        return Err(invalid("status.path", "path cannot be empty").into());
    }
    Ok(())
}

fn validate_assets(config: &Config) -> Result<()> {
    let base_url = &config.assets.base_url;
    if base_url.is_empty() {
        return Err(invalid("assets.base_url", "base URL is required").into());
    }

    match url::Url::parse(base_url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(_) => return Err(invalid("assets.base_url", "must be an http(s) URL").into()),
        Err(e) => return Err(invalid("assets.base_url", e.to_string()).into()),
    }

    for (field, dir) in [
        ("assets.icons_dir", &config.assets.icons_dir),
        ("assets.downloads_dir", &config.assets.downloads_dir),
        ("assets.screenshots_dir", &config.assets.screenshots_dir),
    ] {
        if dir.is_absolute() {
            return Err(invalid(field, "must be relative to the repository root").into());
        }
    }

    Ok(())
}

fn validate_refresh(config: &Config) -> Result<()> {
    if config.refresh.concurrency == 0 {
        return Err(invalid("refresh.concurrency", "must be at least 1").into());
    }
    Ok(())
}

fn validate_apps(config: &Config) -> Result<()> {
    if !config.apps.is_empty() {
        debug!(count = config.apps.len(), "validating apps");
    }

    let mut names = HashSet::new();
    for (i, app) in config.apps.iter().enumerate() {
        if app.name.trim().is_empty() {
            return Err(invalid(format!("apps[{}].name", i), "app name cannot be empty").into());
        }

        if app.bundle_identifier.trim().is_empty() {
            return Err(invalid(
                format!("apps[{}].bundle_identifier", i),
                "bundle identifier cannot be empty",
            )
            .into());
        }

        if !names.insert(app.name.as_str()) {
            return Err(invalid(
                format!("apps[{}].name", i),
                format!("duplicate app name '{}'", app.name),
            )
            .into());
        }

        if !is_repository_slug(&app.repository) {
            return Err(invalid(
                format!("apps[{}].repository", i),
                "must be in the form owner/repo",
            )
            .into());
        }
    }

    Ok(())
}

fn is_repository_slug(repository: &str) -> bool {
    match repository.split_once('/') {
        Some((owner, repo)) => !owner.is_empty() && !repo.is_empty() && !repo.contains('/'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    fn valid_config() -> Config {
        let mut config = Config::default();
        config.assets.base_url = "https://raw.githubusercontent.com/owner/source/main".into();
        config.apps.push(AppConfig {
            name: "Demo".into(),
            bundle_identifier: "com.example.demo".into(),
            repository: "owner/demo".into(),
            ..Default::default()
        });
        config
    }

    #[test]
    fn test_valid_config() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn test_base_url_required() {
        let mut config = valid_config();
        config.assets.base_url.clear();
        assert!(validate_config(&config).is_err());

        config.assets.base_url = "ftp://example.com".into();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_concurrency_must_be_positive() {
        let mut config = valid_config();
        config.refresh.concurrency = 0;
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("refresh.concurrency"));
    }

    #[test]
    fn test_duplicate_app_names() {
        let mut config = valid_config();
        let dup = config.apps[0].clone();
        config.apps.push(dup);
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("duplicate app name"));
    }

    #[test]
    fn test_repository_slug() {
        assert!(is_repository_slug("owner/repo"));
        assert!(!is_repository_slug("owner"));
        assert!(!is_repository_slug("owner/"));
        assert!(!is_repository_slug("a/b/c"));
    }

    #[test]
    fn test_missing_bundle_identifier() {
        let mut config = valid_config();
        config.apps[0].bundle_identifier.clear();
        assert!(validate_config(&config).is_err());
    }
}
