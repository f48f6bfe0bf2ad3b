//! Integrity validator: opens a downloaded package as its container type and
//! checks structural consistency, optionally scanning its record table.
//!
//! Validation is read-only and idempotent: the artifact is never created or
//! modified, so re-running it on an unchanged file gives the same outcome.

mod discover;
mod error;
mod sqlite;

use std::future::Future;
use std::path::{Path, PathBuf};

use crate::container::ContainerKind;
use crate::report::ValidationOutcome;

pub use discover::discover_artifacts;
pub use error::ValidateError;

#[derive(Debug, Clone, Copy, Default)]
pub struct ValidateOptions {
    /// Run the record-table scan after a passing integrity check.
    pub scan_records: bool,
}

/// Something that can be validated and reported by key.
pub trait Validator {
    fn identifier(&self) -> &str;

    fn validate(&self, opts: ValidateOptions) -> impl Future<Output = ValidationOutcome> + Send;
}

/// A package on local disk, tagged with its container kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub key: String,
    pub path: PathBuf,
    pub kind: ContainerKind,
}

impl Artifact {
    /// Artifact at `<dir>/<key>.<ext>`.
    pub fn in_dir(dir: &Path, key: &str, kind: ContainerKind) -> Self {
        Self {
            key: key.to_string(),
            path: dir.join(kind.file_name(key)),
            kind,
        }
    }
}

impl Validator for Artifact {
    fn identifier(&self) -> &str {
        &self.key
    }

    async fn validate(&self, opts: ValidateOptions) -> ValidationOutcome {
        match check_container(&self.path, self.kind, opts).await {
            Ok(()) => ValidationOutcome::ok(&self.key),
            Err(e) => {
                let status = e.status();
                ValidationOutcome {
                    key: self.key.clone(),
                    status,
                    detail: Some(e.to_string()),
                }
            }
        }
    }
}

/// Checks one container file. All current kinds are SQLite; the kind selects the record table.
pub async fn check_container(
    path: &Path,
    kind: ContainerKind,
    opts: ValidateOptions,
) -> Result<(), ValidateError> {
    let records = if opts.scan_records {
        kind.record_table()
    } else {
        None
    };
    match kind {
        ContainerKind::Exto | ContainerKind::Ttfa | ContainerKind::Ttfb => {
            sqlite::check_sqlite(path, records).await
        }
    }
}
