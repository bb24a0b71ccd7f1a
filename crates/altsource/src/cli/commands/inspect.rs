//! Inspect command

use std::path::PathBuf;

use clap::Args;
use console::style;
use tracing::info;

use altsource_core::ScreenshotCataloger;
use altsource_package::inspect_package_file;

use crate::cli::output;
use crate::cli::{Cli, OutputFormat};

/// Print the metadata extracted from a package
#[derive(Debug, Args)]
pub struct InspectCommand {
    /// Path to the .ipa file
    pub package: PathBuf,

    /// App name used in diagnostics (defaults to the file name)
    #[arg(long)]
    pub name: Option<String>,

    /// Screenshot directory to catalog alongside the package
    #[arg(long, value_name = "DIR")]
    pub screenshots: Option<PathBuf>,

    /// Base URL for screenshot descriptors
    #[arg(long, default_value = "")]
    pub base_url: String,
}

impl InspectCommand {
    /// Execute the inspect command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        let name = self.name.clone().unwrap_or_else(|| {
            self.package
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_default()
        });
        info!(path = %self.package.display(), app = %name, "executing inspect command");

        let metadata = inspect_package_file(&self.package, &name)?;
        let screenshots = match &self.screenshots {
            Some(dir) => ScreenshotCataloger::new(self.base_url.as_str()).catalog_dir(dir)?,
            None => Vec::new(),
        };

        match cli.format {
            OutputFormat::Json => {
                let output = serde_json::json!({
                    "name": name,
                    "payload": metadata.payload_root,
                    "bundleIdentifier": metadata.bundle_identifier,
                    "bundleVersion": metadata.bundle_version,
                    "icon": metadata.icon.as_ref().map(|icon| serde_json::json!({
                        "path": icon.path,
                        "scale": icon.scale,
                        "size": icon.bytes.len(),
                    })),
                    "appPermissions": {
                        "entitlements": metadata.entitlements,
                        "privacy": metadata.privacy,
                    },
                    "screenshots": screenshots,
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Text => {
                if cli.quiet {
                    return Ok(());
                }

                println!("{}", style(&name).bold());
                println!("{}", output::key_value("Payload", &metadata.payload_root));
                if let Some(id) = &metadata.bundle_identifier {
                    println!("{}", output::key_value("Bundle ID", id));
                }
                if let Some(version) = &metadata.bundle_version {
                    println!("{}", output::key_value("Version", version));
                }
                match &metadata.icon {
                    Some(icon) => println!(
                        "{}",
                        output::key_value(
                            "Icon",
                            &format!("{} (@{}x, {} bytes)", icon.path, icon.scale, icon.bytes.len())
                        )
                    ),
                    None => println!("{}", output::key_value("Icon", "none")),
                }
                println!();

                println!("{}", output::header("Entitlements"));
                if metadata.entitlements.is_empty() {
                    println!("  {}", style("none").dim());
                }
                for entitlement in &metadata.entitlements {
                    println!("  {}", entitlement);
                }
                println!();

                println!("{}", output::header("Privacy"));
                if metadata.privacy.is_empty() {
                    println!("  {}", style("none").dim());
                }
                for (key, description) in &metadata.privacy {
                    println!("{}", output::key_value(key, description));
                }

                if self.screenshots.is_some() {
                    println!();
                    println!("{}", output::header("Screenshots"));
                    for shot in &screenshots {
                        match (shot.width, shot.height) {
                            (Some(w), Some(h)) => println!("  {} ({}x{})", shot.image_url, w, h),
                            _ => println!("  {}", shot.image_url),
                        }
                    }
                }
            }
        }

        Ok(())
    }
}
