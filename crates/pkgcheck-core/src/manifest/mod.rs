//! Manifest parser: flattens a task manifest into a `key -> remote URL` mapping.
//!
//! Keys are `<mesh_id>_<resource id>`, plain concatenation so they stay readable
//! and stable across runs. Duplicate keys are resolved by [`DuplicatePolicy`].

mod parse;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use parse::{ident, is_safe_key, RawManifest, RawUnit};

/// Manifest text did not have the expected shape.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("manifest JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("mesh {mesh_id}: refer_url.{field} is not a list")]
    SelectorNotList { mesh_id: String, field: String },
    #[error("duplicate manifest key: {key}")]
    DuplicateKey { key: String },
}

/// Which nested group under `refer_url` contributes resources, and which field
/// inside each reference holds its identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSelector {
    pub field: String,
    pub id_field: String,
}

impl Default for ResourceSelector {
    fn default() -> Self {
        Self {
            field: "exto_pano".to_string(),
            id_field: "pano_id".to_string(),
        }
    }
}

/// What to do when two references produce the same key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Later reference replaces the earlier one.
    #[default]
    LastWins,
    /// Fail decoding with [`DecodeError::DuplicateKey`].
    Reject,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub key: String,
    pub remote_url: String,
}

/// Deduplicated manifest; iteration is ordered by key.
#[derive(Debug, Clone, Default)]
pub struct Manifest {
    entries: BTreeMap<String, String>,
    references: usize,
}

impl Manifest {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Number of usable references seen before deduplication.
    pub fn references(&self) -> usize {
        self.references
    }

    /// References dropped because a later one reused their key.
    pub fn duplicates_collapsed(&self) -> usize {
        self.references - self.entries.len()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn entries(&self) -> impl Iterator<Item = ManifestEntry> + '_ {
        self.entries.iter().map(|(k, u)| ManifestEntry {
            key: k.clone(),
            remote_url: u.clone(),
        })
    }

    fn insert(&mut self, key: String, url: String, policy: DuplicatePolicy) -> Result<(), DecodeError> {
        self.references += 1;
        if let Some(previous) = self.entries.get(&key) {
            if policy == DuplicatePolicy::Reject {
                return Err(DecodeError::DuplicateKey { key });
            }
            tracing::debug!(key = %key, previous = %previous, url = %url, "duplicate key, keeping later url");
        }
        self.entries.insert(key, url);
        Ok(())
    }
}

/// Parses raw manifest JSON into a deduplicated mapping.
///
/// A reference missing its URL or identifier, or whose key would not be a plain file
/// name, is skipped. A unit that is not an object, or lacks `mesh_id`, contributes
/// nothing. A missing `list` or a non-list selected group fails with [`DecodeError`].
pub fn parse_manifest(
    raw: &str,
    selector: &ResourceSelector,
    policy: DuplicatePolicy,
) -> Result<Manifest, DecodeError> {
    let doc: RawManifest = serde_json::from_str(raw)?;
    if let Some(global) = &doc.global {
        tracing::debug!(fields = global.len(), "manifest global section");
    }

    let mut manifest = Manifest::default();
    for value in doc.list {
        let unit: RawUnit = match serde_json::from_value(value) {
            Ok(unit) => unit,
            Err(e) => {
                tracing::debug!("skipping malformed unit: {}", e);
                continue;
            }
        };
        let Some(mesh_id) = unit.mesh_id.as_ref().and_then(ident) else {
            tracing::debug!("skipping unit without mesh_id");
            continue;
        };
        let Some(group) = unit.refer_url.as_ref().and_then(|r| r.get(&selector.field)) else {
            continue;
        };
        let refs = match group {
            serde_json::Value::Null => continue,
            serde_json::Value::Array(refs) => refs,
            _ => {
                return Err(DecodeError::SelectorNotList {
                    mesh_id,
                    field: selector.field.clone(),
                })
            }
        };
        for reference in refs {
            let id = reference.get(&selector.id_field).and_then(ident);
            let url = reference.get("url").and_then(ident);
            match (id, url) {
                (Some(id), Some(url)) => {
                    let key = format!("{}_{}", mesh_id, id);
                    if !is_safe_key(&key) {
                        tracing::warn!(key = %key, "skipping reference whose key is not a plain file name");
                        continue;
                    }
                    manifest.insert(key, url, policy)?;
                }
                _ => tracing::debug!(mesh_id = %mesh_id, "skipping reference without id or url"),
            }
        }
    }
    Ok(manifest)
}
