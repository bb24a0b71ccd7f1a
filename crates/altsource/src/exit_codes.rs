//! Exit codes for the CLI

use altsource_core::AltSourceError;

/// General error
pub const ERROR: u8 = 1;

/// Configuration error
pub const CONFIG_ERROR: u8 = 2;

/// Catalog missing, empty or corrupt
pub const CATALOG_ERROR: u8 = 3;

/// Writing the catalog or an asset failed
pub const STORAGE_ERROR: u8 = 4;

/// Package could not be inspected
pub const PACKAGE_ERROR: u8 = 5;

/// Exit code for a failed command
pub fn for_error(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<AltSourceError>() {
        Some(AltSourceError::Config(_)) => CONFIG_ERROR,
        Some(AltSourceError::Catalog(_)) => CATALOG_ERROR,
        Some(AltSourceError::Storage(_)) => STORAGE_ERROR,
        Some(AltSourceError::Package(_)) => PACKAGE_ERROR,
        _ => ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use altsource_core::{CatalogError, ConfigError};
    use std::path::PathBuf;

    #[test]
    fn test_exit_codes() {
        let err = anyhow::Error::new(AltSourceError::from(CatalogError::Empty(PathBuf::from(
            "apps.json",
        ))));
        assert_eq!(for_error(&err), CATALOG_ERROR);

        let err = anyhow::Error::new(AltSourceError::from(ConfigError::NotFound(PathBuf::from(
            ".",
        ))));
        assert_eq!(for_error(&err), CONFIG_ERROR);

        assert_eq!(for_error(&anyhow::anyhow!("boom")), ERROR);
    }

    #[test]
    fn test_failure_codes_are_distinct_and_nonzero() {
        let codes = [ERROR, CONFIG_ERROR, CATALOG_ERROR, STORAGE_ERROR, PACKAGE_ERROR];
        let unique: std::collections::HashSet<u8> = codes.iter().copied().collect();
        assert_eq!(unique.len(), codes.len());
        assert!(codes.iter().all(|&code| code != 0));
    }
}
