//! GitHub Actions build source
//!
//! Builds are the artifacts of successful workflow runs. The newest
//! successful run of the app's repository (optionally narrowed to one
//! workflow file and branch) is used; its first unexpired artifact is
//! downloaded and the first `.ipa` inside it becomes the build.

use std::io::{Cursor, Read};

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info};

use altsource_core::config::{AppConfig, SourceConfig};
use altsource_core::{Build, BuildSource, Result, SourceError};

const ACCEPT: &str = "application/vnd.github+json";
const API_VERSION: &str = "2022-11-28";
const RUNS_PER_PAGE: &str = "20";
const ARCHIVE_EXTENSION: &str = ".ipa";

/// Fetches builds from GitHub Actions
pub struct GitHubActionsSource {
    client: Client,
    api_url: String,
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RunList {
    #[serde(default)]
    workflow_runs: Vec<WorkflowRun>,
}

/// A workflow run as returned by the runs endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowRun {
    pub id: u64,
    pub head_sha: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub head_commit: Option<HeadCommit>,
}

/// The commit a run was triggered for
#[derive(Debug, Clone, Deserialize)]
pub struct HeadCommit {
    pub id: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Deserialize)]
struct ArtifactList {
    #[serde(default)]
    artifacts: Vec<Artifact>,
}

/// An uploaded run artifact
#[derive(Debug, Clone, Deserialize)]
pub struct Artifact {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub expired: bool,
    pub archive_download_url: String,
}

impl GitHubActionsSource {
    /// Create a source. Without a token only public repositories work, and
    /// artifact downloads usually require one.
    pub fn new(config: &SourceConfig, token: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| SourceError::Request {
                url: config.api_url.clone(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.is_empty()),
        })
    }

    fn runs_url(&self, app: &AppConfig) -> String {
        match &app.workflow {
            Some(workflow) => format!(
                "{}/repos/{}/actions/workflows/{}/runs",
                self.api_url, app.repository, workflow
            ),
            None => format!("{}/repos/{}/actions/runs", self.api_url, app.repository),
        }
    }

    fn artifacts_url(&self, app: &AppConfig, run_id: u64) -> String {
        format!(
            "{}/repos/{}/actions/runs/{}/artifacts",
            self.api_url, app.repository, run_id
        )
    }

    async fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<reqwest::Response> {
        debug!(url, "GitHub API request");

        let mut request = self
            .client
            .get(url)
            .query(query)
            .header("Accept", ACCEPT)
            .header("X-GitHub-Api-Version", API_VERSION);
        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }

        let response = request.send().await.map_err(|e| SourceError::Request {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SourceError::Api {
                status: status.as_u16(),
                message,
            }
            .into());
        }

        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, query: &[(&str, &str)]) -> Result<T> {
        let body = self
            .get(url, query)
            .await?
            .text()
            .await
            .map_err(|e| SourceError::Request {
                url: url.to_string(),
                reason: e.to_string(),
            })?;
        decode(url, &body)
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>> {
        let bytes = self
            .get(url, &[])
            .await?
            .bytes()
            .await
            .map_err(|e| SourceError::Request {
                url: url.to_string(),
                reason: e.to_string(),
            })?;
        Ok(bytes.to_vec())
    }
}

#[async_trait::async_trait]
impl BuildSource for GitHubActionsSource {
    fn name(&self) -> &str {
        "github-actions"
    }

    async fn fetch_latest_successful_build(&self, app: &AppConfig) -> Result<Build> {
        let mut query = vec![("status", "success"), ("per_page", RUNS_PER_PAGE)];
        if let Some(branch) = &app.branch {
            query.push(("branch", branch.as_str()));
        }

        let runs: RunList = self.get_json(&self.runs_url(app), &query).await?;
        let run = latest_run(&runs.workflow_runs)
            .ok_or_else(|| SourceError::NoSuccessfulBuild(app.repository.clone()))?;
        debug!(app = %app.name, run_id = run.id, created_at = %run.created_at, "latest successful run");

        let artifacts: ArtifactList = self.get_json(&self.artifacts_url(app, run.id), &[]).await?;
        let artifact = first_available(&artifacts.artifacts).ok_or_else(|| SourceError::NoArtifact {
            project: app.repository.clone(),
            run_id: run.id,
        })?;

        info!(app = %app.name, run_id = run.id, artifact = %artifact.name, "downloading artifact");
        let zip_bytes = self.download(&artifact.archive_download_url).await?;
        let archive_bytes = extract_ipa(&artifact.name, &zip_bytes)?;

        let (commit_id, commit_message) = match &run.head_commit {
            Some(commit) => (commit.id.clone(), commit.message.clone()),
            None => (run.head_sha.clone(), String::new()),
        };

        Ok(Build {
            commit_id,
            commit_message,
            created_at: run.created_at,
            archive_bytes,
        })
    }
}

fn decode<T: DeserializeOwned>(url: &str, body: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|e| {
        SourceError::Request {
            url: url.to_string(),
            reason: format!("unexpected response: {}", e),
        }
        .into()
    })
}

/// Newest run by creation time
fn latest_run(runs: &[WorkflowRun]) -> Option<&WorkflowRun> {
    runs.iter().max_by_key(|run| run.created_at)
}

fn first_available(artifacts: &[Artifact]) -> Option<&Artifact> {
    artifacts.iter().find(|artifact| !artifact.expired)
}

/// Pull the first `.ipa` entry out of a downloaded artifact zip
pub fn extract_ipa(artifact_name: &str, zip_bytes: &[u8]) -> Result<Vec<u8>> {
    let no_archive = || SourceError::NoArchive(artifact_name.to_string());

    let mut archive = zip::ZipArchive::new(Cursor::new(zip_bytes)).map_err(|_| no_archive())?;
    let mut found = None;
    for i in 0..archive.len() {
        let entry = archive.by_index_raw(i).map_err(|_| no_archive())?;
        if entry.is_file() && entry.name().ends_with(ARCHIVE_EXTENSION) {
            found = Some(i);
            break;
        }
    }
    let index = found.ok_or_else(no_archive)?;

    let mut entry = archive.by_index(index).map_err(|_| no_archive())?;
    let mut bytes = Vec::with_capacity(entry.size() as usize);
    entry.read_to_end(&mut bytes).map_err(|_| no_archive())?;
    debug!(artifact = artifact_name, entry = entry.name(), bytes = bytes.len(), "extracted package");
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use altsource_core::AltSourceError;
    use std::io::Write;

    const RUNS: &str = r#"{
  "total_count": 2,
  "workflow_runs": [
    {
      "id": 101,
      "head_sha": "1111111aaaaaaa",
      "created_at": "2024-05-16T10:00:00Z",
      "status": "completed",
      "head_commit": {"id": "1111111aaaaaaa", "message": "Older build"}
    },
    {
      "id": 102,
      "head_sha": "2222222bbbbbbb",
      "created_at": "2024-05-17T09:15:00Z",
      "head_commit": {"id": "2222222bbbbbbb", "message": "Fix crash on launch"}
    }
  ]
}"#;

    const ARTIFACTS: &str = r#"{
  "total_count": 2,
  "artifacts": [
    {"id": 1, "name": "old", "expired": true, "archive_download_url": "https://api.github.com/a/1/zip"},
    {"id": 2, "name": "Demo", "expired": false, "archive_download_url": "https://api.github.com/a/2/zip"}
  ]
}"#;

    fn source() -> GitHubActionsSource {
        let config = SourceConfig {
            api_url: "https://api.github.com/".into(),
            user_agent: "altsource-test".into(),
        };
        GitHubActionsSource::new(&config, Some(String::new())).unwrap()
    }

    fn app(workflow: Option<&str>) -> AppConfig {
        AppConfig {
            name: "Demo".into(),
            bundle_identifier: "com.example.demo".into(),
            repository: "owner/demo".into(),
            workflow: workflow.map(String::from),
            ..Default::default()
        }
    }

    fn artifact_zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = zip::write::SimpleFileOptions::default();
        for (name, data) in entries {
            writer.start_file(*name, options).unwrap();
            writer.write_all(data).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_runs_url() {
        let source = source();
        assert!(source.token.is_none());
        assert_eq!(
            source.runs_url(&app(None)),
            "https://api.github.com/repos/owner/demo/actions/runs"
        );
        assert_eq!(
            source.runs_url(&app(Some("build.yml"))),
            "https://api.github.com/repos/owner/demo/actions/workflows/build.yml/runs"
        );
        assert_eq!(
            source.artifacts_url(&app(None), 7),
            "https://api.github.com/repos/owner/demo/actions/runs/7/artifacts"
        );
    }

    #[test]
    fn test_latest_run() {
        let runs: RunList = decode("runs", RUNS).unwrap();
        let run = latest_run(&runs.workflow_runs).unwrap();
        assert_eq!(run.id, 102);
        assert_eq!(run.head_commit.as_ref().unwrap().message, "Fix crash on launch");

        let empty: RunList = decode("runs", r#"{"total_count": 0, "workflow_runs": []}"#).unwrap();
        assert!(latest_run(&empty.workflow_runs).is_none());
    }

    #[test]
    fn test_first_available_artifact() {
        let list: ArtifactList = decode("artifacts", ARTIFACTS).unwrap();
        assert_eq!(first_available(&list.artifacts).unwrap().name, "Demo");

        let expired = vec![list.artifacts[0].clone()];
        assert!(first_available(&expired).is_none());
    }

    #[test]
    fn test_decode_error() {
        let err = decode::<RunList>("https://api.github.com/x", "not json").unwrap_err();
        assert!(err.is_skippable());
    }

    #[test]
    fn test_extract_ipa() {
        let zip = artifact_zip(&[("build.log", b"log"), ("Demo.ipa", b"package")]);
        assert_eq!(extract_ipa("Demo", &zip).unwrap(), b"package");
    }

    #[test]
    fn test_extract_ipa_missing() {
        let zip = artifact_zip(&[("build.log", b"log")]);
        let err = extract_ipa("Demo", &zip).unwrap_err();
        assert!(matches!(err, AltSourceError::Source(SourceError::NoArchive(_))));

        let err = extract_ipa("Demo", b"not a zip").unwrap_err();
        assert!(err.is_skippable());
    }
}
