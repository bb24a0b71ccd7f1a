//! `.ipa` archive inspection

use std::collections::BTreeMap;
use std::io::{Cursor, Read};
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info, warn};

use crate::error::{PackageError, Result};
use crate::icon::{is_icon_candidate, select_icon, IconImage};

/// Directory every `.ipa` keeps its bundle under
pub const PAYLOAD_PREFIX: &str = "Payload/";

/// Suffix of the application bundle directory
pub const BUNDLE_SUFFIX: &str = ".app";

/// Package descriptor file name, directly under the bundle
pub const DESCRIPTOR_FILE: &str = "Info.plist";

/// File name suffixes of entitlement declarations
pub const ENTITLEMENT_SUFFIXES: &[&str] = &[".xcent", ".entitlements"];

/// Metadata extracted from one application package
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageMetadata {
    /// Bundle directory inside the archive, e.g. `Payload/Demo.app/`
    pub payload_root: String,
    /// Highest resolution app icon, if the bundle ships one
    pub icon: Option<IconImage>,
    /// Top-level entitlement keys in declaration order
    pub entitlements: Vec<String>,
    /// Usage description keys and their justification text
    pub privacy: BTreeMap<String, String>,
    /// `CFBundleIdentifier` from the descriptor
    pub bundle_identifier: Option<String>,
    /// `CFBundleShortVersionString` from the descriptor
    pub bundle_version: Option<String>,
}

/// Regex for privacy usage description keys
static USAGE_DESCRIPTION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^NS[A-Za-z0-9]*UsageDescription$").expect("Invalid regex")
});

/// Whether a descriptor key documents a privacy-sensitive capability
pub fn is_usage_description_key(key: &str) -> bool {
    USAGE_DESCRIPTION_REGEX.is_match(key)
}

/// Read a package from disk and inspect it
pub fn inspect_package_file(path: &Path, app_name: &str) -> Result<PackageMetadata> {
    let bytes = std::fs::read(path)?;
    inspect_package(&bytes, app_name)
}

/// Inspect the raw bytes of an `.ipa` archive.
///
/// Fails with [`PackageError::Malformed`] when the archive is unreadable,
/// does not contain exactly one `Payload/<Name>.app/` bundle, lacks an
/// `Info.plist`, or carries property lists of an unexpected shape. A
/// missing icon or entitlements file is not an error.
pub fn inspect_package(bytes: &[u8], app_name: &str) -> Result<PackageMetadata> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;

    let names = entry_names(&mut archive)?;
    let root = payload_root(&names)?;
    debug!(app = %app_name, root = %root, entries = names.len(), "located payload root");

    let icon = extract_icon(&mut archive, &names, &root)?;
    if icon.is_none() {
        warn!(app = %app_name, "no app icon found in package");
    }

    let entitlements = extract_entitlements(&mut archive, &names, &root)?;
    let descriptor = read_descriptor(&mut archive, &names, &root)?;
    let privacy = extract_privacy(&descriptor)?;

    let bundle_identifier = descriptor
        .get("CFBundleIdentifier")
        .and_then(|v| v.as_string())
        .map(|s| s.to_string());

    let bundle_version = descriptor
        .get("CFBundleShortVersionString")
        .and_then(|v| v.as_string())
        .map(|s| s.to_string());

    info!(
        app = %app_name,
        icon = icon.as_ref().map(|i| i.path.as_str()).unwrap_or("none"),
        entitlements = entitlements.len(),
        privacy = privacy.len(),
        "inspected package"
    );

    Ok(PackageMetadata {
        payload_root: root,
        icon,
        entitlements,
        privacy,
        bundle_identifier,
        bundle_version,
    })
}

/// Entry names in archive listing order
fn entry_names<R: Read + std::io::Seek>(archive: &mut zip::ZipArchive<R>) -> Result<Vec<String>> {
    let mut names = Vec::with_capacity(archive.len());
    for i in 0..archive.len() {
        let file = archive.by_index_raw(i)?;
        names.push(file.name().to_string());
    }
    Ok(names)
}

/// Find the single `Payload/<Name>.app/` directory.
///
/// Zip writers do not always emit directory entries, so roots are derived
/// from the first path component below `Payload/` of every entry.
fn payload_root(names: &[String]) -> Result<String> {
    let mut roots: Vec<String> = Vec::new();

    for name in names {
        let Some(rest) = name.strip_prefix(PAYLOAD_PREFIX) else {
            continue;
        };
        let Some((bundle, _)) = rest.split_once('/') else {
            continue;
        };
        if bundle.len() > BUNDLE_SUFFIX.len() && bundle.ends_with(BUNDLE_SUFFIX) {
            let root = format!("{}{}/", PAYLOAD_PREFIX, bundle);
            if !roots.contains(&root) {
                roots.push(root);
            }
        }
    }

    match roots.len() {
        1 => Ok(roots.remove(0)),
        0 => Err(PackageError::malformed(format!(
            "no {}*{} bundle in archive",
            PAYLOAD_PREFIX, BUNDLE_SUFFIX
        ))),
        n => Err(PackageError::malformed(format!(
            "{} payload bundles in archive ({}), expected one",
            n,
            roots.join(", ")
        ))),
    }
}

fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Whether `name` is a file directly inside `root`
fn is_direct_child(name: &str, root: &str) -> bool {
    name.strip_prefix(root)
        .map(|rest| !rest.is_empty() && !rest.contains('/'))
        .unwrap_or(false)
}

fn read_entry<R: Read + std::io::Seek>(
    archive: &mut zip::ZipArchive<R>,
    name: &str,
) -> Result<Vec<u8>> {
    let mut file = archive.by_name(name)?;
    let mut contents = Vec::new();
    file.read_to_end(&mut contents)
        .map_err(|e| PackageError::malformed(format!("failed to read {}: {}", name, e)))?;
    Ok(contents)
}

fn read_dictionary<R: Read + std::io::Seek>(
    archive: &mut zip::ZipArchive<R>,
    name: &str,
) -> Result<plist::Dictionary> {
    let contents = read_entry(archive, name)?;
    let value = plist::Value::from_reader(Cursor::new(contents))?;
    value
        .into_dictionary()
        .ok_or_else(|| PackageError::malformed(format!("{} is not a dictionary", name)))
}

fn extract_icon<R: Read + std::io::Seek>(
    archive: &mut zip::ZipArchive<R>,
    names: &[String],
    root: &str,
) -> Result<Option<IconImage>> {
    let candidates: Vec<&String> = names
        .iter()
        .filter(|name| name.starts_with(root) && is_icon_candidate(file_name(name)))
        .collect();

    let Some((position, scale)) = select_icon(&candidates) else {
        return Ok(None);
    };

    let path = candidates[position].clone();
    debug!(path = %path, scale, candidates = candidates.len(), "selected icon");
    let bytes = read_entry(archive, &path)?;

    Ok(Some(IconImage { path, scale, bytes }))
}

fn extract_entitlements<R: Read + std::io::Seek>(
    archive: &mut zip::ZipArchive<R>,
    names: &[String],
    root: &str,
) -> Result<Vec<String>> {
    let declarations: Vec<&String> = names
        .iter()
        .filter(|name| is_direct_child(name, root))
        .filter(|name| {
            ENTITLEMENT_SUFFIXES
                .iter()
                .any(|suffix| file_name(name).ends_with(suffix))
        })
        .collect();

    let path = match declarations.as_slice() {
        [] => return Ok(Vec::new()),
        [path] => (*path).clone(),
        many => {
            return Err(PackageError::malformed(format!(
                "{} entitlement declarations under {}, expected at most one",
                many.len(),
                root
            )))
        }
    };

    let dict = read_dictionary(archive, &path)?;
    Ok(dict.keys().cloned().collect())
}

fn read_descriptor<R: Read + std::io::Seek>(
    archive: &mut zip::ZipArchive<R>,
    names: &[String],
    root: &str,
) -> Result<plist::Dictionary> {
    let path = format!("{}{}", root, DESCRIPTOR_FILE);
    if !names.iter().any(|name| name == &path) {
        return Err(PackageError::malformed(format!("missing {}", path)));
    }
    read_dictionary(archive, &path)
}

fn extract_privacy(descriptor: &plist::Dictionary) -> Result<BTreeMap<String, String>> {
    let mut privacy = BTreeMap::new();

    for (key, value) in descriptor.iter() {
        if !is_usage_description_key(key) {
            continue;
        }
        let text = value.as_string().ok_or_else(|| {
            PackageError::malformed(format!("{} is not a string", key))
        })?;
        privacy.insert(key.clone(), text.to_string());
    }

    Ok(privacy)
}
