//! Catalog refresh workflow
//!
//! Every tracked app is processed on its own task (fetch, inspect, publish
//! assets, build the record) with at most `concurrency` in flight. Records
//! are then merged into the catalog one at a time, in configuration order,
//! and the catalog is saved once.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

use altsource_package::inspect_package;

use crate::assets::{archive_file_name, icon_file_name, public_url};
use crate::catalog::{CatalogMerger, MergeOutcome};
use crate::config::{AppConfig, AssetsConfig};
use crate::error::{AltSourceError, ConfigError, Result};
use crate::record::{build_record, short_version, BuildFacts};
use crate::screenshots::ScreenshotCataloger;
use crate::traits::{ArchiveStore, BuildSource, CatalogStore, IconStore};
use crate::types::ApplicationRecord;

/// Options for a refresh run
#[derive(Debug, Clone)]
pub struct RefreshOptions {
    /// Maximum apps processed at once
    pub concurrency: usize,
    /// Do everything except saving the catalog
    pub dry_run: bool,
    /// Restrict the run to these app names (all apps when empty)
    pub only: Vec<String>,
}

impl Default for RefreshOptions {
    fn default() -> Self {
        Self {
            concurrency: crate::config::DEFAULT_CONCURRENCY,
            dry_run: false,
            only: Vec::new(),
        }
    }
}

/// What happened to one app during a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppOutcome {
    /// A new record was merged
    Updated {
        name: String,
        version: String,
        merge: MergeOutcome,
    },
    /// The app was left untouched
    Skipped { name: String, reason: String },
}

impl AppOutcome {
    /// App name
    pub fn name(&self) -> &str {
        match self {
            Self::Updated { name, .. } | Self::Skipped { name, .. } => name,
        }
    }
}

/// Summary of a refresh run
#[derive(Debug, Clone, Default)]
pub struct RefreshReport {
    /// One outcome per processed app, in configuration order
    pub outcomes: Vec<AppOutcome>,
    /// Files written (or, in a dry run, that would have been written)
    pub modified_files: Vec<String>,
    /// Whether the catalog was saved
    pub catalog_saved: bool,
}

impl RefreshReport {
    /// Number of apps merged
    pub fn updated(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, AppOutcome::Updated { .. }))
            .count()
    }

    /// Number of apps skipped
    pub fn skipped(&self) -> usize {
        self.outcomes.len() - self.updated()
    }
}

/// A finished unit of per-app work
struct Processed {
    record: ApplicationRecord,
    files: Vec<String>,
}

struct Collaborators {
    source: Arc<dyn BuildSource>,
    icons: Arc<dyn IconStore>,
    archives: Arc<dyn ArchiveStore>,
    assets: AssetsConfig,
}

/// Runs refreshes against a set of collaborators
pub struct Refresher {
    inner: Arc<Collaborators>,
    catalog: Arc<dyn CatalogStore>,
}

impl Refresher {
    /// Create a refresher
    pub fn new(
        source: Arc<dyn BuildSource>,
        icons: Arc<dyn IconStore>,
        archives: Arc<dyn ArchiveStore>,
        catalog: Arc<dyn CatalogStore>,
        assets: AssetsConfig,
    ) -> Self {
        Self {
            inner: Arc::new(Collaborators {
                source,
                icons,
                archives,
                assets,
            }),
            catalog,
        }
    }

    /// Refresh the catalog for the given apps.
    ///
    /// The catalog is loaded before any app is fetched; a missing or corrupt
    /// catalog aborts the run. Apps whose build cannot be fetched or whose
    /// package is malformed are skipped and keep their current entry. Any
    /// other failure aborts the run without saving.
    pub async fn run(&self, apps: &[AppConfig], options: &RefreshOptions) -> Result<RefreshReport> {
        let selected = select_apps(apps, &options.only)?;
        info!(
            apps = selected.len(),
            concurrency = options.concurrency,
            dry_run = options.dry_run,
            source = self.inner.source.name(),
            "starting refresh"
        );

        let mut catalog = self.catalog.load()?;
        debug!(records = catalog.len(), "catalog loaded");

        let results = self.process_all(&selected, options.concurrency.max(1)).await;

        let mut report = RefreshReport::default();
        let mut records = Vec::new();
        let mut fatal: Option<AltSourceError> = None;

        for (app, result) in selected.iter().zip(results) {
            match result {
                Ok(processed) => {
                    report.modified_files.extend(processed.files);
                    records.push(processed.record);
                }
                Err(err) if err.is_skippable() => {
                    warn!(app = %app.name, error = %err, "skipping app");
                    report.outcomes.push(AppOutcome::Skipped {
                        name: app.name.clone(),
                        reason: err.to_string(),
                    });
                }
                Err(err) => {
                    error!(app = %app.name, error = %err, "refresh failed");
                    fatal.get_or_insert(err);
                }
            }
        }

        if let Some(err) = fatal {
            return Err(err);
        }

        let mut merger = CatalogMerger::new(&mut catalog);
        for record in records {
            let name = record.name.clone();
            let version = record.version.clone();
            let merge = merger.merge(record);
            report.outcomes.push(AppOutcome::Updated {
                name,
                version,
                merge,
            });
        }

        // Keep outcomes in configuration order regardless of skip/update
        report.outcomes.sort_by_key(|outcome| {
            selected
                .iter()
                .position(|app| app.name == outcome.name())
                .unwrap_or(usize::MAX)
        });

        if report.updated() > 0 {
            report
                .modified_files
                .insert(0, self.catalog.location().display().to_string());

            if options.dry_run {
                info!("dry run, catalog not saved");
            } else {
                self.catalog.save(&catalog)?;
                report.catalog_saved = true;
            }
        }

        info!(
            updated = report.updated(),
            skipped = report.skipped(),
            records = catalog.len(),
            "refresh finished"
        );
        Ok(report)
    }

    /// Process apps concurrently; results come back in input order
    async fn process_all(&self, apps: &[AppConfig], concurrency: usize) -> Vec<Result<Processed>> {
        let semaphore = Arc::new(Semaphore::new(concurrency));
        let mut handles = Vec::with_capacity(apps.len());

        for app in apps {
            let inner = Arc::clone(&self.inner);
            let semaphore = Arc::clone(&semaphore);
            let app = app.clone();

            handles.push(tokio::spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|e| AltSourceError::other(format!("worker pool closed: {}", e)))?;
                process_app(&inner, app).await
            }));
        }

        let mut results = Vec::with_capacity(handles.len());
        for handle in handles {
            let result = match handle.await {
                Ok(result) => result,
                Err(e) => Err(AltSourceError::other(format!("app task failed: {}", e))),
            };
            results.push(result);
        }
        results
    }
}

fn select_apps(apps: &[AppConfig], only: &[String]) -> Result<Vec<AppConfig>> {
    if only.is_empty() {
        return Ok(apps.to_vec());
    }

    if let Some(unknown) = only.iter().find(|name| !apps.iter().any(|a| &a.name == *name)) {
        return Err(ConfigError::InvalidValue {
            field: "only".to_string(),
            message: format!("unknown app '{}'", unknown),
        }
        .into());
    }

    Ok(apps
        .iter()
        .filter(|app| only.contains(&app.name))
        .cloned()
        .collect())
}

async fn process_app(ctx: &Collaborators, app: AppConfig) -> Result<Processed> {
    let build = ctx.source.fetch_latest_successful_build(&app).await?;
    let version = short_version(&build.commit_id);
    debug!(app = %app.name, version = %version, bytes = build.archive_bytes.len(), "fetched build");

    let name = app.name.clone();
    let (metadata, build) = tokio::task::spawn_blocking(move || {
        let metadata = inspect_package(&build.archive_bytes, &name);
        (metadata, build)
    })
    .await
    .map_err(|e| AltSourceError::other(format!("inspection task failed: {}", e)))?;
    let metadata = metadata?;

    if let Some(found) = &metadata.bundle_identifier {
        if found != &app.bundle_identifier {
            warn!(
                app = %app.name,
                configured = %app.bundle_identifier,
                package = %found,
                "bundle identifier differs from package"
            );
        }
    }

    let mut files = Vec::new();

    let download_url = ctx
        .archives
        .save_archive(&app.name, &version, &build.archive_bytes)?;
    files.push(relative_display(&ctx.assets.downloads_dir, archive_file_name(&app.name, &version)));

    let icon_url = match &metadata.icon {
        Some(icon) => {
            let url = ctx.icons.save_icon(&app.name, &icon.bytes)?;
            files.push(relative_display(&ctx.assets.icons_dir, icon_file_name(&app.name)));
            Some(url)
        }
        None => None,
    };

    let screenshots = catalog_screenshots(&ctx.assets, &app.name);
    let facts = BuildFacts::from_build(&app, &build, download_url);
    let record = build_record(facts, &metadata, screenshots, icon_url);

    info!(app = %app.name, version = %record.version, "built record");
    Ok(Processed { record, files })
}

fn catalog_screenshots(assets: &AssetsConfig, app_name: &str) -> Vec<crate::types::Screenshot> {
    let relative = assets.screenshots_dir.join(app_name);
    let base_url = match public_url(&assets.base_url, &relative) {
        Ok(url) => url,
        Err(e) => {
            warn!(app = %app_name, error = %e, "cannot form screenshot URL");
            return Vec::new();
        }
    };

    ScreenshotCataloger::new(base_url)
        .catalog_dir(&assets.screenshots_path(app_name))
        .unwrap_or_else(|e| {
            warn!(app = %app_name, error = %e, "failed to list screenshots");
            Vec::new()
        })
}

fn relative_display(dir: &std::path::Path, file_name: String) -> String {
    let path: PathBuf = dir.join(file_name);
    path.display().to_string()
}
