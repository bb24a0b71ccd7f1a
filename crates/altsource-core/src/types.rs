//! Catalog record types

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One application entry in the catalog.
///
/// Serialized with the key names and order installers expect. Every field is
/// always written, with empty defaults rather than missing keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ApplicationRecord {
    pub name: String,
    #[serde(rename = "bundleIdentifier")]
    pub bundle_identifier: String,
    #[serde(rename = "developerName")]
    pub developer_name: String,
    pub version: String,
    #[serde(rename = "versionDate", with = "version_date")]
    pub version_date: NaiveDate,
    #[serde(rename = "versionDescription")]
    pub version_description: String,
    #[serde(rename = "downloadURL")]
    pub download_url: String,
    #[serde(rename = "localizedDescription")]
    pub localized_description: String,
    #[serde(rename = "iconURL")]
    pub icon_url: String,
    #[serde(rename = "tintColor")]
    pub tint_color: String,
    pub category: String,
    pub size: u64,
    pub beta: bool,
    pub screenshots: Vec<Screenshot>,
    #[serde(rename = "appPermissions")]
    pub app_permissions: AppPermissions,
    /// Keys this tool does not manage, kept for records a run leaves alone
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ApplicationRecord {
    /// The identity key of this record
    pub fn identity(&self) -> IdentityKey {
        IdentityKey::new(&self.name, &self.bundle_identifier)
    }
}

/// Capabilities and privacy declarations of an application
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppPermissions {
    /// Entitlement names in declaration order
    pub entitlements: Vec<String>,
    /// Usage description key to justification text
    pub privacy: BTreeMap<String, String>,
}

/// One screenshot of an application
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Screenshot {
    #[serde(rename = "imageURL", default)]
    pub image_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

/// The `(name, bundleIdentifier)` pair that identifies a catalog entry
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IdentityKey {
    pub name: String,
    pub bundle_identifier: String,
}

impl IdentityKey {
    /// Create an identity key
    pub fn new(name: impl Into<String>, bundle_identifier: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bundle_identifier: bundle_identifier.into(),
        }
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.bundle_identifier)
    }
}

/// `versionDate` is written as `YYYY-MM-DD`. Hand-edited catalogs sometimes
/// carry a full RFC 3339 timestamp, which is read back as its date part.
mod version_date {
    use chrono::{DateTime, NaiveDate};
    use serde::{de, Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d";

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&date.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if let Ok(date) = NaiveDate::parse_from_str(&raw, FORMAT) {
            return Ok(date);
        }
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.date_naive())
            .map_err(|_| de::Error::custom(format!("invalid versionDate '{}'", raw)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> ApplicationRecord {
        ApplicationRecord {
            name: "Demo".to_string(),
            bundle_identifier: "com.example.demo".to_string(),
            version: "abc1234".to_string(),
            version_date: NaiveDate::from_ymd_opt(2024, 5, 17).unwrap(),
            screenshots: vec![
                Screenshot {
                    image_url: "https://example.com/a.png".to_string(),
                    width: Some(1170),
                    height: Some(2532),
                },
                Screenshot {
                    image_url: "https://example.com/b.png".to_string(),
                    width: None,
                    height: None,
                },
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_all_fields_are_written() {
        let value = serde_json::to_value(record()).unwrap();
        let object = value.as_object().unwrap();

        for key in [
            "name",
            "bundleIdentifier",
            "developerName",
            "version",
            "versionDate",
            "versionDescription",
            "downloadURL",
            "localizedDescription",
            "iconURL",
            "tintColor",
            "category",
            "size",
            "beta",
            "screenshots",
            "appPermissions",
        ] {
            assert!(object.contains_key(key), "missing {}", key);
        }
        assert_eq!(object["versionDate"], "2024-05-17");
        assert_eq!(object["appPermissions"]["entitlements"], serde_json::json!([]));
        assert_eq!(object["appPermissions"]["privacy"], serde_json::json!({}));
    }

    #[test]
    fn test_screenshot_dimensions_omitted_when_absent() {
        let value = serde_json::to_value(record()).unwrap();
        let second = value["screenshots"][1].as_object().unwrap();
        assert!(!second.contains_key("width"));
        assert!(!second.contains_key("height"));
        assert_eq!(value["screenshots"][0]["width"], 1170);
    }

    #[test]
    fn test_reads_sparse_and_timestamped_records() {
        let json = r#"{
            "name": "Legacy",
            "bundleIdentifier": "com.example.legacy",
            "versionDate": "2023-02-01T12:30:00Z",
            "sourceURL": "https://example.com/legacy"
        }"#;
        let record: ApplicationRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.version_date, NaiveDate::from_ymd_opt(2023, 2, 1).unwrap());
        assert_eq!(record.icon_url, "");
        assert_eq!(record.extra["sourceURL"], "https://example.com/legacy");
    }

    #[test]
    fn test_identity_display() {
        assert_eq!(record().identity().to_string(), "Demo (com.example.demo)");
    }
}
