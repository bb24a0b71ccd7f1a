//! The catalog document and record merging

use std::collections::{HashMap, HashSet};

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::error::{CatalogError, Result};
use crate::types::{ApplicationRecord, IdentityKey};

/// Key of the record array inside the catalog document
pub const APPS_KEY: &str = "apps";

/// An ordered collection of application records.
///
/// The rest of the source document (name, identifier, news, ...) is kept
/// as-is, in its original key order, and written back around the records.
/// Records loaded from a document keep their original JSON until a merge
/// replaces them, so untouched entries are written back unchanged.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Catalog {
    apps: Vec<ApplicationRecord>,
    /// Loaded JSON per slot; `None` once merged
    originals: Vec<Option<Value>>,
    document: Map<String, Value>,
}

/// What a merge did to the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// An existing record at this position was replaced
    Replaced(usize),
    /// The record was appended at this position
    Appended(usize),
}

impl MergeOutcome {
    /// Position of the merged record
    pub fn position(&self) -> usize {
        match self {
            Self::Replaced(pos) | Self::Appended(pos) => *pos,
        }
    }
}

impl Catalog {
    /// Create a catalog holding only the given records
    pub fn new(apps: Vec<ApplicationRecord>) -> Result<Self> {
        ensure_unique(&apps)?;
        Ok(Self {
            originals: vec![None; apps.len()],
            apps,
            document: Map::new(),
        })
    }

    /// Parse a catalog document.
    ///
    /// The document must be a JSON object with an `apps` array whose records
    /// have unique identity keys. Blank input is rejected; callers that know
    /// the file path report that as [`CatalogError::Empty`] first.
    pub fn from_json_str(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Err(CatalogError::Invalid("document is empty".to_string()).into());
        }

        let value: Value = serde_json::from_str(content)
            .map_err(|e| CatalogError::Invalid(e.to_string()))?;

        let Value::Object(mut document) = value else {
            return Err(CatalogError::Invalid("document is not an object".to_string()).into());
        };

        let items = match document.get_mut(APPS_KEY).map(Value::take) {
            Some(Value::Array(items)) => items,
            Some(_) => {
                return Err(CatalogError::Invalid(format!("'{}' is not an array", APPS_KEY)).into())
            }
            None => {
                return Err(CatalogError::Invalid(format!("missing '{}' array", APPS_KEY)).into())
            }
        };

        let apps = items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                ApplicationRecord::deserialize(item)
                    .map_err(|e| CatalogError::Invalid(format!("apps[{}]: {}", i, e)))
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        ensure_unique(&apps)?;
        debug!(records = apps.len(), "parsed catalog");
        Ok(Self {
            apps,
            originals: items.into_iter().map(Some).collect(),
            document,
        })
    }

    /// Serialize the catalog as pretty-printed JSON with a trailing newline
    pub fn to_json_string(&self) -> Result<String> {
        let mut document = self.document.clone();
        let apps = self
            .apps
            .iter()
            .zip(&self.originals)
            .map(|(record, original)| match original {
                Some(value) => Ok(value.clone()),
                None => serde_json::to_value(record),
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let apps = Value::Array(apps);
        match document.get_mut(APPS_KEY) {
            Some(slot) => *slot = apps,
            None => {
                document.insert(APPS_KEY.to_string(), apps);
            }
        }

        let mut out = serde_json::to_string_pretty(&Value::Object(document))?;
        out.push('\n');
        Ok(out)
    }

    /// Records in catalog order
    pub fn apps(&self) -> &[ApplicationRecord] {
        &self.apps
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.apps.len()
    }

    /// Whether the catalog has no records
    pub fn is_empty(&self) -> bool {
        self.apps.is_empty()
    }

    /// Look up a record by identity key
    pub fn get(&self, key: &IdentityKey) -> Option<&ApplicationRecord> {
        self.apps
            .iter()
            .find(|app| app.name == key.name && app.bundle_identifier == key.bundle_identifier)
    }

    /// Top-level document value other than the records
    pub fn document_value(&self, key: &str) -> Option<&Value> {
        if key == APPS_KEY {
            return None;
        }
        self.document.get(key)
    }

    /// Merge one record. See [`CatalogMerger`] for applying many.
    pub fn merge(&mut self, record: ApplicationRecord) -> MergeOutcome {
        CatalogMerger::new(self).merge(record)
    }
}

fn ensure_unique(apps: &[ApplicationRecord]) -> Result<()> {
    let mut seen = HashSet::with_capacity(apps.len());
    for app in apps {
        if !seen.insert(app.identity()) {
            return Err(CatalogError::DuplicateKey {
                name: app.name.clone(),
                bundle_identifier: app.bundle_identifier.clone(),
            }
            .into());
        }
    }
    Ok(())
}

/// Applies records to a catalog one at a time.
///
/// The identity-key index is built once, so each merge is a single lookup.
/// A record whose key exists replaces the old record in place; any other
/// record is appended. Records not named by a merge keep their position.
pub struct CatalogMerger<'a> {
    catalog: &'a mut Catalog,
    index: HashMap<IdentityKey, usize>,
}

impl<'a> CatalogMerger<'a> {
    /// Index the catalog for merging
    pub fn new(catalog: &'a mut Catalog) -> Self {
        let index = catalog
            .apps
            .iter()
            .enumerate()
            .map(|(pos, app)| (app.identity(), pos))
            .collect();
        Self { catalog, index }
    }

    /// Replace or append a record
    pub fn merge(&mut self, record: ApplicationRecord) -> MergeOutcome {
        let key = record.identity();

        if let Some(&pos) = self.index.get(&key) {
            debug!(app = %key, position = pos, "replacing catalog record");
            self.catalog.apps[pos] = record;
            self.catalog.originals[pos] = None;
            return MergeOutcome::Replaced(pos);
        }

        let pos = self.catalog.apps.len();
        info!(app = %key, position = pos, "appending catalog record");
        self.catalog.apps.push(record);
        self.catalog.originals.push(None);
        self.index.insert(key, pos);
        MergeOutcome::Appended(pos)
    }

    /// Merge records in order
    pub fn merge_all<I>(&mut self, records: I) -> Vec<MergeOutcome>
    where
        I: IntoIterator<Item = ApplicationRecord>,
    {
        records.into_iter().map(|r| self.merge(r)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, bundle: &str, version: &str) -> ApplicationRecord {
        ApplicationRecord {
            name: name.to_string(),
            bundle_identifier: bundle.to_string(),
            version: version.to_string(),
            ..Default::default()
        }
    }

    fn seeded() -> Catalog {
        Catalog::new(vec![
            record("Alpha", "com.example.alpha", "1111111"),
            record("Beta", "com.example.beta", "2222222"),
            record("Gamma", "com.example.gamma", "3333333"),
        ])
        .unwrap()
    }

    fn keys(catalog: &Catalog) -> Vec<IdentityKey> {
        catalog.apps().iter().map(|a| a.identity()).collect()
    }

    #[test]
    fn test_merge_existing_key_replaces_in_place() {
        let mut catalog = seeded();
        let before = keys(&catalog);

        let outcome = catalog.merge(record("Beta", "com.example.beta", "9999999"));

        assert_eq!(outcome, MergeOutcome::Replaced(1));
        assert_eq!(catalog.len(), 3);
        assert_eq!(keys(&catalog), before);
        assert_eq!(catalog.apps()[1].version, "9999999");
        assert_eq!(catalog.apps()[0].version, "1111111");
        assert_eq!(catalog.apps()[2].version, "3333333");
    }

    #[test]
    fn test_merge_new_key_appends() {
        let mut catalog = seeded();
        let before = catalog.apps().to_vec();

        let outcome = catalog.merge(record("Delta", "com.example.delta", "4444444"));

        assert_eq!(outcome, MergeOutcome::Appended(3));
        assert_eq!(catalog.len(), 4);
        assert_eq!(&catalog.apps()[..3], before.as_slice());
    }

    #[test]
    fn test_same_name_different_bundle_is_new_entry() {
        let mut catalog = seeded();
        let outcome = catalog.merge(record("Alpha", "com.example.alpha.beta", "5555555"));
        assert_eq!(outcome, MergeOutcome::Appended(3));
    }

    #[test]
    fn test_merge_is_idempotent() {
        let update = record("Gamma", "com.example.gamma", "7777777");
        let fresh = record("Omega", "com.example.omega", "0000000");

        let mut once = seeded();
        once.merge(update.clone());
        once.merge(fresh.clone());

        let mut twice = once.clone();
        twice.merge(update);
        twice.merge(fresh);

        assert_eq!(once, twice);
    }

    #[test]
    fn test_merge_all_keeps_keys_unique() {
        let mut catalog = seeded();
        let outcomes = CatalogMerger::new(&mut catalog).merge_all(vec![
            record("Delta", "com.example.delta", "1"),
            record("Delta", "com.example.delta", "2"),
            record("Alpha", "com.example.alpha", "3"),
        ]);

        assert_eq!(
            outcomes,
            vec![
                MergeOutcome::Appended(3),
                MergeOutcome::Replaced(3),
                MergeOutcome::Replaced(0)
            ]
        );
        assert_eq!(catalog.len(), 4);
        assert_eq!(catalog.apps()[3].version, "2");

        let mut unique = keys(&catalog);
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), catalog.len());
    }

    #[test]
    fn test_parse_preserves_document() {
        let json = r#"{
  "name": "Example Source",
  "identifier": "com.example.source",
  "apps": [
    {"name": "Alpha", "bundleIdentifier": "com.example.alpha", "versionDate": "2024-01-02"}
  ],
  "news": []
}"#;
        let mut catalog = Catalog::from_json_str(json).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(
            catalog.document_value("identifier"),
            Some(&Value::String("com.example.source".into()))
        );

        catalog.merge(record("Beta", "com.example.beta", "2222222"));
        let out = catalog.to_json_string().unwrap();
        assert!(out.ends_with('\n'));

        let name_pos = out.find("\"name\": \"Example Source\"").unwrap();
        let apps_pos = out.find("\"apps\"").unwrap();
        let news_pos = out.find("\"news\"").unwrap();
        assert!(name_pos < apps_pos && apps_pos < news_pos);

        let reparsed = Catalog::from_json_str(&out).unwrap();
        assert_eq!(reparsed.apps(), catalog.apps());
        assert_eq!(reparsed.to_json_string().unwrap(), out);
    }

    #[test]
    fn test_untouched_records_are_written_back_verbatim() {
        let legacy = r#"{"name":"Legacy","bundleIdentifier":"com.example.legacy","versionDate":"2023-02-01T12:30:00Z","version":"1.0","customKey":[1,2]}"#;
        let json = format!(
            r#"{{"apps": [{}, {{"name": "Alpha", "bundleIdentifier": "com.example.alpha"}}]}}"#,
            legacy
        );
        let mut catalog = Catalog::from_json_str(&json).unwrap();

        catalog.merge(record("Alpha", "com.example.alpha", "2222222"));
        catalog.merge(record("Delta", "com.example.delta", "4444444"));

        let out: Value = serde_json::from_str(&catalog.to_json_string().unwrap()).unwrap();
        let expected: Value = serde_json::from_str(legacy).unwrap();
        assert_eq!(out["apps"][0], expected);
        let keys: Vec<&String> = out["apps"][0].as_object().unwrap().keys().collect();
        assert_eq!(
            keys,
            vec!["name", "bundleIdentifier", "versionDate", "version", "customKey"]
        );

        assert_eq!(out["apps"][1]["version"], "2222222");
        assert_eq!(out["apps"][1]["size"], 0);
        assert_eq!(out["apps"][2]["name"], "Delta");
    }

    #[test]
    fn test_empty_document_is_rejected() {
        assert!(Catalog::from_json_str("").is_err());
        assert!(Catalog::from_json_str("  \n").is_err());
    }

    #[test]
    fn test_document_without_apps_is_rejected() {
        assert!(Catalog::from_json_str(r#"{"name": "x"}"#).is_err());
        assert!(Catalog::from_json_str(r#"{"apps": {}}"#).is_err());
        assert!(Catalog::from_json_str("[]").is_err());
    }

    #[test]
    fn test_duplicate_keys_are_rejected() {
        let json = r#"{"apps": [
            {"name": "Alpha", "bundleIdentifier": "com.example.alpha", "versionDate": "2024-01-02"},
            {"name": "Alpha", "bundleIdentifier": "com.example.alpha", "versionDate": "2024-01-03"}
        ]}"#;
        let err = Catalog::from_json_str(json).unwrap_err();
        assert!(err.to_string().contains("Duplicate catalog entry"));
    }

    #[test]
    fn test_skeleton_document() {
        let catalog = Catalog::from_json_str(r#"{"apps": []}"#).unwrap();
        assert!(catalog.is_empty());
    }
}
