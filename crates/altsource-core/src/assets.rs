//! Public URLs and file names of published assets

use std::path::{Component, Path};

use url::Url;

use crate::error::{Result, StorageError};

/// Public URL of a file below the repository root.
///
/// Each path component becomes one percent-encoded URL segment, so app
/// names with spaces stay valid.
pub fn public_url(base_url: &str, relative: &Path) -> Result<String> {
    let invalid = || StorageError::InvalidUrl(format!("{} + {}", base_url, relative.display()));

    let mut url = Url::parse(base_url).map_err(|_| invalid())?;
    {
        let mut segments = url.path_segments_mut().map_err(|_| invalid())?;
        segments.pop_if_empty();
        for component in relative.components() {
            match component {
                Component::Normal(part) => {
                    segments.push(&part.to_string_lossy());
                }
                Component::CurDir => {}
                _ => return Err(invalid().into()),
            }
        }
    }

    Ok(url.to_string())
}

/// File name of a stored icon
pub fn icon_file_name(app_name: &str) -> String {
    format!("{}.png", app_name)
}

/// File name of a stored package
pub fn archive_file_name(app_name: &str, version: &str) -> String {
    format!("{}-{}.ipa", app_name, version)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_url_joins_segments() {
        let url = public_url(
            "https://raw.githubusercontent.com/owner/source/main/",
            Path::new("icons/Demo.png"),
        )
        .unwrap();
        assert_eq!(url, "https://raw.githubusercontent.com/owner/source/main/icons/Demo.png");
    }

    #[test]
    fn test_public_url_encodes_spaces() {
        let url = public_url("https://example.com/src", Path::new("downloads/My App-abc1234.ipa"))
            .unwrap();
        assert_eq!(url, "https://example.com/src/downloads/My%20App-abc1234.ipa");
    }

    #[test]
    fn test_public_url_rejects_parent_components() {
        assert!(public_url("https://example.com", Path::new("../secret")).is_err());
        assert!(public_url("not a url", Path::new("icons/a.png")).is_err());
    }

    #[test]
    fn test_file_names() {
        assert_eq!(icon_file_name("Demo"), "Demo.png");
        assert_eq!(archive_file_name("Demo", "abc1234"), "Demo-abc1234.ipa");
    }
}
