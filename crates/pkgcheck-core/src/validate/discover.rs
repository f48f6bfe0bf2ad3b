//! Find already-downloaded packages of one kind in a directory.

use anyhow::{Context, Result};
use std::path::Path;

use super::Artifact;
use crate::container::ContainerKind;

/// Lists regular files in `dir` (non-recursive) with `kind`'s extension.
/// Key is the file stem; result is sorted by key.
pub fn discover_artifacts(dir: &Path, kind: ContainerKind) -> Result<Vec<Artifact>> {
    let entries = std::fs::read_dir(dir).with_context(|| format!("read dir {}", dir.display()))?;
    let mut found = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("read dir {}", dir.display()))?;
        let path = entry.path();
        if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            continue;
        }
        let matches = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case(kind.extension()))
            .unwrap_or(false);
        if !matches {
            continue;
        }
        let Some(key) = path.file_stem().and_then(|s| s.to_str()) else {
            tracing::debug!("skipping non-UTF-8 file name {}", path.display());
            continue;
        };
        found.push(Artifact {
            key: key.to_string(),
            path: path.clone(),
            kind,
        });
    }
    found.sort_by(|a, b| a.key.cmp(&b.key));
    tracing::debug!(dir = %dir.display(), count = found.len(), "discovered {} artifacts", kind);
    Ok(found)
}
