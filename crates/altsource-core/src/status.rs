//! Repository status document
//!
//! After a refresh the source repository carries a small JSON document with
//! a single news item describing the last run, so installers show when the
//! source was last refreshed and what changed.

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use tracing::info;

use crate::error::Result;
use crate::persist::atomic_write;

/// Identifier of the status news item
pub const STATUS_IDENTIFIER: &str = "repo_status";

/// Overall result of a run as shown in the status caption
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Success,
    Failure,
}

impl RunStatus {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::Failure => "Failure",
        }
    }
}

/// The status document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusDocument {
    pub news: Vec<NewsItem>,
}

/// One news entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewsItem {
    pub title: String,
    pub identifier: String,
    pub caption: String,
    pub date: String,
    #[serde(rename = "tintColor")]
    pub tint_color: String,
}

impl StatusDocument {
    /// Describe a run that finished at `now`
    pub fn new(
        status: RunStatus,
        modified_files: &[String],
        tint_color: &str,
        now: DateTime<Utc>,
    ) -> Self {
        let timestamp = now.to_rfc3339_opts(SecondsFormat::Secs, true);
        let files = if modified_files.is_empty() {
            "none".to_string()
        } else {
            modified_files.join(", ")
        };

        Self {
            news: vec![NewsItem {
                title: format!("Last repo refresh: {}", timestamp),
                identifier: STATUS_IDENTIFIER.to_string(),
                caption: format!(
                    "Workflow: {}\nList of files modified by last action: {}",
                    status.as_str(),
                    files
                ),
                date: timestamp,
                tint_color: tint_color.to_string(),
            }],
        }
    }

    /// Write the document atomically
    pub fn write(&self, path: &Path) -> Result<()> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        atomic_write(path, json.as_bytes())?;
        info!(path = %path.display(), "wrote status document");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 17, 8, 30, 0).unwrap()
    }

    #[test]
    fn test_status_document() {
        let doc = StatusDocument::new(
            RunStatus::Success,
            &["apps.json".to_string(), "icons/Demo.png".to_string()],
            "#F54F32",
            now(),
        );

        let item = &doc.news[0];
        assert_eq!(item.title, "Last repo refresh: 2024-05-17T08:30:00Z");
        assert_eq!(item.identifier, "repo_status");
        assert_eq!(
            item.caption,
            "Workflow: Success\nList of files modified by last action: apps.json, icons/Demo.png"
        );
        assert_eq!(item.date, "2024-05-17T08:30:00Z");
    }

    #[test]
    fn test_failure_without_files() {
        let doc = StatusDocument::new(RunStatus::Failure, &[], "#000000", now());
        assert!(doc.news[0].caption.starts_with("Workflow: Failure\n"));
        assert!(doc.news[0].caption.ends_with("none"));
    }

    #[test]
    fn test_write_status_document() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("repo_status.json");

        StatusDocument::new(RunStatus::Success, &[], "#F54F32", now())
            .write(&path)
            .unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["news"][0]["tintColor"], "#F54F32");
    }
}
