//! App icon candidate selection

use regex::Regex;
use std::sync::LazyLock;

/// File name marker shared by every compiled app icon
pub const ICON_MARKER: &str = "AppIcon";

/// Image extension of compiled app icons
pub const ICON_EXTENSION: &str = ".png";

/// The icon picked out of a package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconImage {
    /// Archive path of the selected icon
    pub path: String,
    /// Resolution scale parsed from the `@<n>x` marker (1 when absent)
    pub scale: u32,
    /// Raw image bytes
    pub bytes: Vec<u8>,
}

/// Regex for the `@<n>x` resolution marker
static SCALE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@(\d+)x").expect("Invalid regex"));

/// Whether a file name is an app icon candidate
pub fn is_icon_candidate(file_name: &str) -> bool {
    file_name.contains(ICON_MARKER) && file_name.ends_with(ICON_EXTENSION)
}

/// Resolution scale encoded in an icon file name.
///
/// `AppIcon60x60@3x.png` is scale 3; a name without an `@<n>x` marker is
/// scale 1.
pub fn icon_scale(file_name: &str) -> u32 {
    SCALE_REGEX
        .captures(file_name)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(1)
}

/// Pick the candidate with the largest scale.
///
/// Candidates are given in archive listing order; on a tie the earlier one
/// wins. Returns the position within `candidates` together with its scale.
pub fn select_icon<S: AsRef<str>>(candidates: &[S]) -> Option<(usize, u32)> {
    let mut best: Option<(usize, u32)> = None;

    for (position, path) in candidates.iter().enumerate() {
        let file_name = path.as_ref().rsplit('/').next().unwrap_or_default();
        let scale = icon_scale(file_name);
        match best {
            Some((_, best_scale)) if best_scale >= scale => {}
            _ => best = Some((position, scale)),
        }
    }

    best
}
