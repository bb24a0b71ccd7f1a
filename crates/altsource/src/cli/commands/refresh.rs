//! Refresh command

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use clap::Args;
use console::style;
use tracing::{info, warn};

use altsource_core::config::Config;
use altsource_core::{
    AppOutcome, MergeOutcome, RefreshOptions, RefreshReport, Refresher, RunStatus, StatusDocument,
};
use altsource_stores::{FsAssetStore, FsCatalogStore, GitHubActionsSource};

use crate::cli::output;
use crate::cli::{display_path, Cli, OutputFormat};

/// Fetch the latest builds and update the catalog
#[derive(Debug, Args)]
pub struct RefreshCommand {
    /// Process everything but write no files
    #[arg(long)]
    pub dry_run: bool,

    /// Only refresh the named app (repeatable)
    #[arg(long, value_name = "NAME")]
    pub only: Vec<String>,

    /// GitHub token used for the Actions API
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Maximum apps processed at once (overrides refresh.concurrency)
    #[arg(long)]
    pub concurrency: Option<usize>,
}

impl RefreshCommand {
    /// Execute the refresh command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        let runtime = tokio::runtime::Runtime::new()?;
        runtime.block_on(self.execute_async(cli))
    }

    async fn execute_async(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(
            dry_run = self.dry_run,
            only = ?self.only,
            authenticated = self.token.is_some(),
            "executing refresh command"
        );
        let (config, config_path) = cli.load_config()?;

        if cli.is_text() {
            output::info(&format!(
                "Refreshing {} from {}",
                style(config.catalog.path.display()).cyan(),
                style(config_path.display()).dim()
            ));
        }

        let source = Arc::new(GitHubActionsSource::new(&config.source, self.token.clone())?);
        let assets = Arc::new(FsAssetStore::new(config.assets.clone()).with_dry_run(self.dry_run));
        let catalog = Arc::new(FsCatalogStore::new(&config.catalog.path));
        let refresher = Refresher::new(
            source,
            assets.clone(),
            assets,
            catalog,
            config.assets.clone(),
        );

        let options = RefreshOptions {
            concurrency: self.concurrency.unwrap_or(config.refresh.concurrency),
            dry_run: self.dry_run,
            only: self.only.clone(),
        };

        let result = refresher.run(&config.apps, &options).await;

        let modified_files: Vec<String> = match &result {
            Ok(report) => report
                .modified_files
                .iter()
                .map(|file| display_path(Path::new(file), &config.assets.root))
                .collect(),
            Err(_) => Vec::new(),
        };
        self.write_status(&config, &result, &modified_files);

        let report = result?;
        match cli.format {
            OutputFormat::Json => print_json(&report, &modified_files)?,
            OutputFormat::Text if !cli.quiet => print_text(&report, &modified_files, self.dry_run),
            OutputFormat::Text => {}
        }

        Ok(())
    }

    /// Best effort; a write failure is only logged
    fn write_status(
        &self,
        config: &Config,
        result: &altsource_core::Result<RefreshReport>,
        modified_files: &[String],
    ) {
        if !config.status.enabled || self.dry_run {
            return;
        }

        let status = if result.is_ok() {
            RunStatus::Success
        } else {
            RunStatus::Failure
        };
        let document =
            StatusDocument::new(status, modified_files, &config.status.tint_color, Utc::now());
        if let Err(e) = document.write(&config.status.path) {
            warn!(path = %config.status.path.display(), error = %e, "failed to write status document");
        }
    }
}

fn print_json(report: &RefreshReport, modified_files: &[String]) -> anyhow::Result<()> {
    let outcomes: Vec<serde_json::Value> = report
        .outcomes
        .iter()
        .map(|outcome| match outcome {
            AppOutcome::Updated {
                name,
                version,
                merge,
            } => serde_json::json!({
                "name": name,
                "status": "updated",
                "version": version,
                "merge": merge_label(merge),
                "position": merge.position(),
            }),
            AppOutcome::Skipped { name, reason } => serde_json::json!({
                "name": name,
                "status": "skipped",
                "reason": reason,
            }),
        })
        .collect();

    let output = serde_json::json!({
        "updated": report.updated(),
        "skipped": report.skipped(),
        "catalog_saved": report.catalog_saved,
        "modified_files": modified_files,
        "apps": outcomes,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_text(report: &RefreshReport, modified_files: &[String], dry_run: bool) {
    for outcome in &report.outcomes {
        match outcome {
            AppOutcome::Updated {
                name,
                version,
                merge,
            } => output::success(&format!(
                "{} {} ({})",
                style(name).cyan(),
                output::version_style().apply_to(version),
                merge_label(merge)
            )),
            AppOutcome::Skipped { name, reason } => {
                output::warning(&format!("{} skipped: {}", style(name).cyan(), reason))
            }
        }
    }

    if !modified_files.is_empty() {
        println!();
        println!("{}", output::header("Modified files"));
        for file in modified_files {
            println!("  {}", output::path_style().apply_to(file));
        }
    }

    println!();
    if dry_run {
        output::info("Dry run, nothing was written");
    } else if report.catalog_saved {
        output::success(&format!(
            "{} updated, {} skipped",
            report.updated(),
            report.skipped()
        ));
    } else {
        output::info("No app was updated, catalog left unchanged");
    }
}

fn merge_label(merge: &MergeOutcome) -> &'static str {
    match merge {
        MergeOutcome::Replaced(_) => "replaced",
        MergeOutcome::Appended(_) => "added",
    }
}
