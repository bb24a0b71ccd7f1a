//! Screenshot descriptors from file name conventions.
//!
//! Screenshot files are named `<deviceClass>-<width>x<height>-<index>.<ext>`,
//! e.g. `iphone-1170x2532-01.png`. Names that do not follow the convention
//! are skipped; screenshots are cosmetic and never fail a refresh.
//!
//! Only the first descriptor of an invocation carries `width` and `height`.
//! Installers size the whole gallery from that first entry.

use std::path::Path;

use tracing::debug;

use crate::error::Result;
use crate::types::Screenshot;

/// Field separator in screenshot file names
pub const SEPARATOR: char = '-';

/// A screenshot file name split into its parts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenshotName {
    pub device_class: String,
    pub width: u32,
    pub height: u32,
    pub index: String,
}

/// Parse a file name following the screenshot convention
pub fn parse_screenshot_name(file_name: &str) -> Option<ScreenshotName> {
    let fields: Vec<&str> = file_name.split(SEPARATOR).collect();
    let [device_class, size, index] = fields.as_slice() else {
        return None;
    };

    let (width, height) = size.split_once('x')?;
    let width = width.parse().ok()?;
    let height = height.parse().ok()?;

    Some(ScreenshotName {
        device_class: device_class.to_string(),
        width,
        height,
        index: index.to_string(),
    })
}

/// Builds screenshot descriptors for images published under a base URL
#[derive(Debug, Clone)]
pub struct ScreenshotCataloger {
    base_url: String,
}

impl ScreenshotCataloger {
    /// `base_url` is the public location of the screenshot files
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Catalog file names in the order given
    pub fn catalog<S: AsRef<str>>(&self, file_names: &[S]) -> Vec<Screenshot> {
        let mut screenshots = Vec::new();

        for file_name in file_names {
            let file_name = file_name.as_ref();
            let Some(parsed) = parse_screenshot_name(file_name) else {
                debug!(file = %file_name, "skipping screenshot with unexpected name");
                continue;
            };

            let first = screenshots.is_empty();
            screenshots.push(Screenshot {
                image_url: format!("{}/{}", self.base_url, file_name),
                width: first.then_some(parsed.width),
                height: first.then_some(parsed.height),
            });
        }

        screenshots
    }

    /// Catalog the files of a directory, sorted by name.
    ///
    /// Hidden files and subdirectories are ignored; a missing directory has
    /// no screenshots.
    pub fn catalog_dir(&self, dir: &Path) -> Result<Vec<Screenshot>> {
        if !dir.is_dir() {
            debug!(dir = %dir.display(), "no screenshot directory");
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            if !name.starts_with('.') {
                names.push(name);
            }
        }
        names.sort();

        Ok(self.catalog(&names))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_screenshot_name() {
        let parsed = parse_screenshot_name("iphone-1170x2532-01.png").unwrap();
        assert_eq!(parsed.device_class, "iphone");
        assert_eq!(parsed.width, 1170);
        assert_eq!(parsed.height, 2532);
        assert_eq!(parsed.index, "01.png");
    }

    #[test]
    fn test_parse_rejects_unexpected_names() {
        assert!(parse_screenshot_name("screenshot.png").is_none());
        assert!(parse_screenshot_name("iphone-1170x2532.png").is_none());
        assert!(parse_screenshot_name("ipad-pro-2048x2732-01.png").is_none());
        assert!(parse_screenshot_name("iphone-widexhigh-01.png").is_none());
    }

    #[test]
    fn test_only_first_descriptor_has_dimensions() {
        let cataloger = ScreenshotCataloger::new("https://example.com/screenshots/Demo/");
        let shots = cataloger.catalog(&["iphone-1170x2532-01.png", "iphone-1170x2532-02.png"]);

        assert_eq!(shots.len(), 2);
        assert_eq!(
            shots[0].image_url,
            "https://example.com/screenshots/Demo/iphone-1170x2532-01.png"
        );
        assert_eq!(shots[0].width, Some(1170));
        assert_eq!(shots[0].height, Some(2532));
        assert_eq!(shots[1].width, None);
        assert_eq!(shots[1].height, None);
    }

    #[test]
    fn test_skipped_names_do_not_take_first_slot() {
        let cataloger = ScreenshotCataloger::new("https://example.com");
        let shots = cataloger.catalog(&["notes.txt", "ipad-2048x2732-01.png"]);

        assert_eq!(shots.len(), 1);
        assert_eq!(shots[0].width, Some(2048));
    }

    #[test]
    fn test_catalog_dir_sorted() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("iphone-1170x2532-02.png"), b"").unwrap();
        std::fs::write(temp.path().join("iphone-1170x2532-01.png"), b"").unwrap();
        std::fs::write(temp.path().join(".DS_Store"), b"").unwrap();
        std::fs::create_dir(temp.path().join("raw")).unwrap();

        let cataloger = ScreenshotCataloger::new("https://example.com");
        let shots = cataloger.catalog_dir(temp.path()).unwrap();

        assert_eq!(shots.len(), 2);
        assert!(shots[0].image_url.ends_with("-01.png"));
        assert!(shots[0].width.is_some());
    }

    #[test]
    fn test_catalog_missing_dir() {
        let temp = TempDir::new().unwrap();
        let cataloger = ScreenshotCataloger::new("https://example.com");
        let shots = cataloger.catalog_dir(&temp.path().join("missing")).unwrap();
        assert!(shots.is_empty());
    }
}
