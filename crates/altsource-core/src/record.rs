//! Application record assembly

use chrono::NaiveDate;

use altsource_package::PackageMetadata;

use crate::config::AppConfig;
use crate::traits::Build;
use crate::types::{AppPermissions, ApplicationRecord, Screenshot};

/// Length of the revision hash prefix used as the catalog version
pub const SHORT_VERSION_LEN: usize = 7;

/// Descriptive fields copied into the record unchanged
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayFields {
    pub beta: bool,
    pub tint_color: String,
    pub category: String,
    pub localized_description: String,
}

/// Facts about one build, supplied by the caller
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildFacts {
    pub name: String,
    pub bundle_identifier: String,
    pub developer_name: String,
    pub version: String,
    pub version_date: NaiveDate,
    pub version_description: String,
    pub download_url: String,
    pub size: u64,
    pub display: DisplayFields,
}

impl BuildFacts {
    /// Derive build facts from a tracked app and its fetched build
    pub fn from_build(app: &AppConfig, build: &Build, download_url: impl Into<String>) -> Self {
        Self {
            name: app.name.clone(),
            bundle_identifier: app.bundle_identifier.clone(),
            developer_name: app.developer_name.clone(),
            version: short_version(&build.commit_id),
            version_date: build.created_at.date_naive(),
            version_description: build.commit_message.clone(),
            download_url: download_url.into(),
            size: build.archive_bytes.len() as u64,
            display: DisplayFields::from(app),
        }
    }
}

impl From<&AppConfig> for DisplayFields {
    fn from(app: &AppConfig) -> Self {
        Self {
            beta: app.beta,
            tint_color: app.tint_color.clone(),
            category: app.category.clone(),
            localized_description: app.localized_description.clone(),
        }
    }
}

/// The first characters of a revision hash
pub fn short_version(commit_id: &str) -> String {
    commit_id.chars().take(SHORT_VERSION_LEN).collect()
}

/// Combine build facts, package metadata, screenshots and the stored icon's
/// URL into a complete record.
pub fn build_record(
    facts: BuildFacts,
    metadata: &PackageMetadata,
    screenshots: Vec<Screenshot>,
    icon_url: Option<String>,
) -> ApplicationRecord {
    ApplicationRecord {
        name: facts.name,
        bundle_identifier: facts.bundle_identifier,
        developer_name: facts.developer_name,
        version: facts.version,
        version_date: facts.version_date,
        version_description: facts.version_description,
        download_url: facts.download_url,
        localized_description: facts.display.localized_description,
        icon_url: icon_url.unwrap_or_default(),
        tint_color: facts.display.tint_color,
        category: facts.display.category,
        size: facts.size,
        beta: facts.display.beta,
        screenshots,
        app_permissions: AppPermissions {
            entitlements: metadata.entitlements.clone(),
            privacy: metadata.privacy.clone(),
        },
        extra: serde_json::Map::new(),
    }
}
