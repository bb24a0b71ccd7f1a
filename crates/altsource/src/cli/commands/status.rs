//! Status command

use clap::Args;
use console::style;
use tracing::info;

use altsource_core::{CatalogStore, IdentityKey};
use altsource_stores::FsCatalogStore;

use crate::cli::output;
use crate::cli::{Cli, OutputFormat};

/// Summarize the catalog and tracked apps
#[derive(Debug, Args)]
pub struct StatusCommand {}

impl StatusCommand {
    /// Execute the status command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!("executing status command");
        let (config, config_path) = cli.load_config()?;
        let catalog = FsCatalogStore::new(&config.catalog.path).load()?;

        let tracked: Vec<(&str, Option<&altsource_core::ApplicationRecord>)> = config
            .apps
            .iter()
            .map(|app| {
                let key = IdentityKey::new(app.name.as_str(), app.bundle_identifier.as_str());
                (app.name.as_str(), catalog.get(&key))
            })
            .collect();

        match cli.format {
            OutputFormat::Json => {
                let output = serde_json::json!({
                    "config_path": config_path.to_string_lossy(),
                    "catalog_path": config.catalog.path.to_string_lossy(),
                    "records": catalog.len(),
                    "tracked": tracked.iter().map(|(name, record)| serde_json::json!({
                        "name": name,
                        "in_catalog": record.is_some(),
                        "version": record.map(|r| r.version.as_str()),
                        "versionDate": record.map(|r| r.version_date.format("%Y-%m-%d").to_string()),
                    })).collect::<Vec<_>>(),
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Text => {
                if cli.quiet {
                    return Ok(());
                }

                println!("{}", style("altsource status").bold());
                println!();
                println!(
                    "{}",
                    output::key_value("Config", &config_path.display().to_string())
                );
                println!(
                    "{}",
                    output::key_value("Catalog", &config.catalog.path.display().to_string())
                );
                println!("{}", output::key_value("Records", &catalog.len().to_string()));
                println!();

                println!("{}", output::header("Tracked apps"));
                for (name, record) in &tracked {
                    match record {
                        Some(record) => println!(
                            "  {} {} ({})",
                            style(name).cyan(),
                            output::version_style().apply_to(&record.version),
                            record.version_date.format("%Y-%m-%d")
                        ),
                        None => println!(
                            "  {} {}",
                            style(name).cyan(),
                            style("not in catalog").yellow()
                        ),
                    }
                }

                let untracked: Vec<&str> = catalog
                    .apps()
                    .iter()
                    .filter(|record| config.app(&record.name).is_none())
                    .map(|record| record.name.as_str())
                    .collect();
                if !untracked.is_empty() {
                    println!();
                    println!("{}", output::header("Untracked records"));
                    for name in untracked {
                        println!("  {}", style(name).dim());
                    }
                }
            }
        }

        Ok(())
    }
}
